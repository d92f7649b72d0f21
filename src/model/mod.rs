pub mod advice;
pub mod catalog;
pub mod codex;
pub mod expansion;
pub mod filter;
pub mod map_focus;
pub mod progress;
pub mod session;
