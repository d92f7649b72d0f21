use eframe::egui;
use egui::RichText;
use std::time::Duration;

use crate::config::{AdviceProvider, AppConfig};
use crate::engine::engine::EngineHandle;
use crate::engine::protocol::EngineResponse;
use crate::engine::storage::{export_progress, import_progress, JsonFileStorage};
use crate::model::catalog::Category;
use crate::model::map_focus::{wiki_search_url, RegionImages};
use crate::model::session::ChecklistSession;
use crate::ui::checklist_panel::{draw_checklist, draw_top_bar, ChecklistAction};
use crate::ui::codex_window::draw_codex_window;
use crate::ui::hub::draw_hub;
use crate::ui::map_panel::{MapAction, MapView};
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::{load_settings, save_settings};

/* =========================
   Routes
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Route {
    #[default]
    Hub,
    Checklist,
}

/* =========================
   UI State
   ========================= */

#[derive(Default)]
struct UiState {
    route: Route,
    search_text: String,
    confirm_reset: bool,
    show_settings: bool,
    status: Option<String>,
    settings: UiSettings,
}

/* =========================
   App
   ========================= */

pub struct HubApp {
    ui: UiState,
    session: ChecklistSession<JsonFileStorage>,
    engine: EngineHandle,
    map: MapView,
    advice_label: String,
}

impl HubApp {
    pub fn new(
        session: ChecklistSession<JsonFileStorage>,
        engine: EngineHandle,
        config: &AppConfig,
    ) -> Self {
        let provider = match config.advice.provider {
            AdviceProvider::Gemini => "Gemini",
            AdviceProvider::OpenAiCompatible => "OpenAI-compatible",
        };
        let key = if config.advice.api_key().is_some() {
            "key set"
        } else {
            "no key"
        };

        Self {
            ui: UiState {
                settings: load_settings(),
                ..Default::default()
            },
            session,
            engine,
            map: MapView::new(RegionImages::with_overrides(&config.map_images)),
            advice_label: format!("{provider} · {} · {key}", config.advice.model()),
        }
    }

    fn drain_engine(&mut self, ctx: &egui::Context) {
        while let Some(resp) = self.engine.try_recv() {
            match resp {
                EngineResponse::AdviceReady { target, outcome } => {
                    self.session.apply_advice(target, outcome);
                }
                EngineResponse::MapImageLoaded {
                    region,
                    source,
                    image,
                } => self.map.on_image_loaded(ctx, region, source, image),
            }
        }
    }

    fn busy(&self) -> bool {
        self.session.advice().any_loading()
            || self.session.codex.is_loading()
            || self.map.is_loading()
    }

    fn apply(&mut self, ctx: &egui::Context, action: ChecklistAction) {
        match action {
            ChecklistAction::Back => self.ui.route = Route::Hub,
            ChecklistAction::OpenCodex => self.session.codex.open = true,
            ChecklistAction::ToggleMap => self.session.toggle_map(),
            ChecklistAction::ToggleSettings => self.ui.show_settings = !self.ui.show_settings,
            ChecklistAction::Search(query) => self.session.set_query(query),
            ChecklistAction::TogglePhase(id) => self.session.toggle_phase(&id),
            ChecklistAction::ShowOnMap(id) => self.session.show_phase_on_map(&id),
            ChecklistAction::ToggleItem(id) => self.session.toggle_item(&id),
            ChecklistAction::ToggleDetails(id) => self.session.toggle_item_details(&id),
            ChecklistAction::Locate { item_id, region } => {
                self.session.locate(&item_id, region);
            }
            ChecklistAction::OpenWiki(term) => match wiki_search_url(&term) {
                Ok(url) => ctx.open_url(egui::OpenUrl::new_tab(url)),
                Err(e) => log::warn!("Could not build wiki link for '{term}': {e}"),
            },
            ChecklistAction::Consult(id) => {
                self.session.request_advice(&id, &self.engine);
            }
            ChecklistAction::Export => self.export(),
            ChecklistAction::Import => self.import(),
            ChecklistAction::RequestReset => self.ui.confirm_reset = true,
        }
    }

    fn apply_map(&mut self, ctx: &egui::Context, action: MapAction) {
        match action {
            MapAction::Close => self.session.toggle_map(),
            MapAction::ClearFocus => self.session.clear_focus(),
            MapAction::OpenUrl(url) => ctx.open_url(egui::OpenUrl::new_tab(url)),
            MapAction::Focus { item_id, region } => {
                self.session.locate(&item_id, region);
            }
        }
    }

    fn file_dialog(&self) -> rfd::FileDialog {
        rfd::FileDialog::new().add_filter("Checklist progress", &["json"])
    }

    fn export(&mut self) {
        let Some(path) = self
            .file_dialog()
            .set_file_name(format!("{}.json", self.session.catalog().storage_key))
            .save_file()
        else {
            return;
        };

        self.ui.status = Some(match export_progress(&path, self.session.progress()) {
            Ok(()) => {
                log::info!("Exported progress to {}", path.display());
                format!("Exported progress to {}", path.display())
            }
            Err(e) => {
                log::warn!("Export to {} failed: {e:#}", path.display());
                format!("Export failed: {e:#}")
            }
        });
    }

    fn import(&mut self) {
        let Some(path) = self.file_dialog().pick_file() else {
            return;
        };

        self.ui.status = Some(match import_progress(&path) {
            Ok(progress) => {
                self.session.import_progress(progress);
                format!("Imported progress from {}", path.display())
            }
            Err(e) => {
                log::warn!("Import from {} failed: {e:#}", path.display());
                format!("Import failed: {e:#}")
            }
        });
    }

    fn draw_checklist_route(&mut self, ctx: &egui::Context) {
        let mut actions = draw_top_bar(ctx, &self.session, &mut self.ui.search_text);

        if let Some(status) = &self.ui.status {
            let mut dismiss = false;
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(status).small());
                    if ui.small_button("✖").clicked() {
                        dismiss = true;
                    }
                });
            });
            if dismiss {
                self.ui.status = None;
            }
        }

        if self.session.map().panel_open() {
            if let Some(action) = self.map.show(ctx, &self.session, &self.engine) {
                self.apply_map(ctx, action);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    actions.extend(draw_checklist(ui, &self.session, &self.ui.settings));
                });
        });

        for action in actions {
            self.apply(ctx, action);
        }

        draw_codex_window(ctx, &mut self.session, &self.engine);
        self.draw_reset_confirm(ctx);
        self.draw_settings(ctx);
    }

    fn draw_reset_confirm(&mut self, ctx: &egui::Context) {
        if !self.ui.confirm_reset {
            return;
        }

        let mut confirmed = false;
        let mut cancelled = false;
        let modal = egui::Modal::new(egui::Id::new("confirm_reset")).show(ctx, |ui| {
            ui.set_width(280.0);
            ui.heading("Reset progress?");
            ui.label("Every checked item will be cleared.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
            });
        });

        if confirmed {
            self.session.reset_progress();
            self.ui.status = Some("Progress reset".into());
            self.ui.confirm_reset = false;
        } else if cancelled || modal.should_close() {
            self.ui.confirm_reset = false;
        }
    }

    fn draw_settings(&mut self, ctx: &egui::Context) {
        let settings = &mut self.ui.settings;
        let advice_label = &self.advice_label;
        let mut changed = false;

        egui::Window::new("Settings")
            .open(&mut self.ui.show_settings)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("UI Scale");
                let scale = ui.add(egui::Slider::new(&mut settings.ui_scale, 0.75..=2.0));
                changed |= scale.drag_stopped() || (scale.changed() && !scale.dragged());

                ui.separator();
                ui.label("Category colors");
                egui::Grid::new("category_colors").num_columns(2).show(ui, |ui| {
                    for category in Category::ALL {
                        let mut color = settings.color(category);
                        ui.label(format!("{} {}", category.icon(), category.key()));
                        if ui.color_edit_button_srgba(&mut color).changed() {
                            settings.set_color(category, color);
                            changed = true;
                        }
                        ui.end_row();
                    }
                });

                if ui.button("Restore defaults").clicked() {
                    *settings = UiSettings::default();
                    changed = true;
                }

                ui.separator();
                ui.label(RichText::new(format!("Advice: {advice_label}")).small().weak());
            });

        if changed {
            save_settings(&self.ui.settings);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for HubApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        self.drain_engine(ctx);

        match self.ui.route {
            Route::Hub => {
                if draw_hub(ctx, self.session.catalog(), self.session.percent()) {
                    self.ui.route = Route::Checklist;
                }
            }
            Route::Checklist => self.draw_checklist_route(ctx),
        }

        // Poll for engine responses while anything is in flight.
        if self.busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
