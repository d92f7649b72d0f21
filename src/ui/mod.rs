pub mod app;
pub mod checklist_panel;
pub mod codex_window;
pub mod hub;
pub mod map_panel;
pub mod settings;
pub mod settings_io;
