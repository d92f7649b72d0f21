use eframe::egui;
use egui::{Color32, RichText, Stroke};

use crate::model::advice::AdviceState;
use crate::model::catalog::{Item, Phase, Region};
use crate::model::filter::FilteredPhase;
use crate::model::progress::ProgressStorage;
use crate::model::session::ChecklistSession;
use crate::ui::settings::UiSettings;

const BLOOD: Color32 = Color32::from_rgb(168, 28, 28);
const GOLD: Color32 = Color32::from_rgb(255, 215, 0);

/// Everything the checklist screen can ask for. Collected while drawing,
/// applied by the app once the frame's borrows are released.
#[derive(Debug, Clone, PartialEq)]
pub enum ChecklistAction {
    Back,
    OpenCodex,
    ToggleMap,
    ToggleSettings,
    Search(String),
    TogglePhase(String),
    ShowOnMap(String),
    ToggleItem(String),
    ToggleDetails(String),
    Locate { item_id: String, region: Region },
    OpenWiki(String),
    Consult(String),
    Export,
    Import,
    RequestReset,
}

/* =========================
   Top bar
   ========================= */

pub fn draw_top_bar<S: ProgressStorage>(
    ctx: &egui::Context,
    session: &ChecklistSession<S>,
    search_text: &mut String,
) -> Vec<ChecklistAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("checklist_top").show(ctx, |ui| {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("←").on_hover_text("Back to hub").clicked() {
                actions.push(ChecklistAction::Back);
            }
            ui.label(RichText::new("🛡").color(BLOOD).size(22.0));
            ui.heading(RichText::new(session.catalog().title.to_uppercase()).strong());

            ui.add_space(12.0);
            let search = ui.add(
                egui::TextEdit::singleline(search_text)
                    .hint_text("Search checklist (e.g. 'Gwent')...")
                    .desired_width(320.0),
            );
            if search.changed() {
                actions.push(ChecklistAction::Search(search_text.clone()));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⚙").on_hover_text("Settings").clicked() {
                    actions.push(ChecklistAction::ToggleSettings);
                }

                let map_open = session.map().panel_open();
                let label = if map_open { "Close Map" } else { "Map" };
                if ui.selectable_label(map_open, label).clicked() {
                    actions.push(ChecklistAction::ToggleMap);
                }

                if ui
                    .button(RichText::new("✨ Codex").color(GOLD))
                    .clicked()
                {
                    actions.push(ChecklistAction::OpenCodex);
                }
            });
        });
        ui.add_space(6.0);
    });

    actions
}

/* =========================
   Checklist body
   ========================= */

pub fn draw_checklist<S: ProgressStorage>(
    ui: &mut egui::Ui,
    session: &ChecklistSession<S>,
    settings: &UiSettings,
) -> Vec<ChecklistAction> {
    let mut actions = Vec::new();
    let view = session.view();

    draw_progress(ui, session);
    ui.add_space(8.0);

    if view.is_empty() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("⛃").size(40.0).weak());
            ui.label(RichText::new(format!("No items found for \"{}\"", session.query())).weak());
        });
        ui.add_space(40.0);
    }

    for filtered in &view.phases {
        draw_phase(ui, session, settings, filtered, &mut actions);
        ui.add_space(10.0);
    }

    ui.separator();
    ui.horizontal(|ui| {
        if ui.small_button("Export progress…").clicked() {
            actions.push(ChecklistAction::Export);
        }
        if ui.small_button("Import progress…").clicked() {
            actions.push(ChecklistAction::Import);
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let reset = ui.add(
                egui::Button::new(RichText::new("RESET ALL DATA").small().weak()).frame(false),
            );
            if reset.clicked() {
                actions.push(ChecklistAction::RequestReset);
            }
        });
    });
    ui.add_space(24.0);

    actions
}

fn draw_progress<S: ProgressStorage>(ui: &mut egui::Ui, session: &ChecklistSession<S>) {
    let percent = session.percent();
    let total = session.catalog().total_items();

    ui.horizontal(|ui| {
        ui.label(RichText::new(&session.catalog().subtitle).italics().weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{percent}%"))
                    .size(20.0)
                    .strong()
                    .color(Color32::from_rgb(255, 77, 77)),
            );
            ui.label(RichText::new("TOTAL COMPLETION").small().weak());
        });
    });
    ui.add(
        egui::ProgressBar::new(f32::from(percent) / 100.0)
            .desired_height(6.0)
            .fill(BLOOD),
    );
    ui.label(
        RichText::new(format!("{} / {total} done", session.completed_count().min(total)))
            .small()
            .weak(),
    );
}

fn draw_phase<S: ProgressStorage>(
    ui: &mut egui::Ui,
    session: &ChecklistSession<S>,
    settings: &UiSettings,
    filtered: &FilteredPhase<'_>,
    actions: &mut Vec<ChecklistAction>,
) {
    let phase = filtered.phase;
    let open = session.phase_is_open(filtered);
    let [r, g, b] = phase.accent;
    let accent = Color32::from_rgb(r, g, b);

    let frame = egui::Frame::new()
        .fill(Color32::from_gray(30))
        .stroke(Stroke::new(1.0, Color32::from_gray(51)))
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(8));

    let shown = frame.show(ui, |ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui| {
            let done = phase
                .items
                .iter()
                .filter(|i| session.is_checked(&i.id))
                .count();
            let arrow = if open { "▼" } else { "▶" };
            let header = ui.add(
                egui::Label::new(
                    RichText::new(format!("{arrow}  {}", phase.title))
                        .strong()
                        .size(16.0),
                )
                .sense(egui::Sense::click()),
            );
            if header.clicked() {
                actions.push(ChecklistAction::TogglePhase(phase.id.clone()));
            }
            ui.label(RichText::new(format!("{done}/{}", phase.items.len())).weak());

            let map = session.map();
            if map.panel_open() && map.active_region() != phase.region {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("SHOW ON MAP").clicked() {
                        actions.push(ChecklistAction::ShowOnMap(phase.id.clone()));
                    }
                });
            }
        });

        if !session.query_active() {
            ui.label(RichText::new(&phase.description).italics().small().weak());
        }

        if open {
            ui.add_space(6.0);
            for item in &filtered.items {
                draw_item(ui, session, settings, phase, item, actions);
                ui.add_space(4.0);
            }
        }
    });

    let rect = shown.response.rect;
    ui.painter().vline(
        rect.left() + 1.0,
        rect.y_range().shrink(6.0),
        Stroke::new(3.0, accent),
    );
}

fn draw_item<S: ProgressStorage>(
    ui: &mut egui::Ui,
    session: &ChecklistSession<S>,
    settings: &UiSettings,
    phase: &Phase,
    item: &Item,
    actions: &mut Vec<ChecklistAction>,
) {
    let checked = session.is_checked(&item.id);
    let urgent = item.category.is_urgent() && !checked;

    let fill = if checked {
        Color32::from_gray(26)
    } else {
        Color32::from_gray(34)
    };
    let frame = egui::Frame::new()
        .fill(fill)
        .stroke(Stroke::new(1.0, Color32::from_gray(51)))
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::same(8));

    let shown = frame.show(ui, |ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui| {
            let mut check = checked;
            if ui.checkbox(&mut check, "").changed() {
                actions.push(ChecklistAction::ToggleItem(item.id.clone()));
            }

            ui.vertical(|ui| {
                ui.horizontal_wrapped(|ui| {
                    if urgent {
                        ui.label(
                            RichText::new(" CRITICAL ")
                                .small()
                                .strong()
                                .color(Color32::WHITE)
                                .background_color(Color32::from_rgb(220, 38, 38)),
                        );
                    }
                    let mut title = RichText::new(&item.title).strong();
                    if checked {
                        title = title.strikethrough().weak();
                    }
                    if ui
                        .add(egui::Label::new(title).sense(egui::Sense::click()))
                        .clicked()
                    {
                        actions.push(ChecklistAction::ToggleDetails(item.id.clone()));
                    }
                });

                let mut short = RichText::new(&item.short_desc).small();
                if checked {
                    short = short.weak();
                }
                if ui
                    .add(egui::Label::new(short).sense(egui::Sense::click()))
                    .clicked()
                {
                    actions.push(ChecklistAction::ToggleDetails(item.id.clone()));
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                let icon_color = if urgent {
                    Color32::from_rgb(239, 68, 68)
                } else {
                    settings.color(item.category)
                };
                ui.label(RichText::new(item.category.icon()).color(icon_color));
            });
        });

        if session.item_details_open(&item.id) {
            ui.separator();
            draw_details(ui, session, phase, item, actions);
        }
    });

    if urgent {
        let rect = shown.response.rect;
        ui.painter().vline(
            rect.left() + 1.5,
            rect.y_range(),
            Stroke::new(4.0, Color32::from_rgb(220, 38, 38)),
        );
    }
}

fn draw_details<S: ProgressStorage>(
    ui: &mut egui::Ui,
    session: &ChecklistSession<S>,
    phase: &Phase,
    item: &Item,
    actions: &mut Vec<ChecklistAction>,
) {
    ui.label(RichText::new(&item.long_desc).small());
    ui.label(RichText::new(format!("📍 {}", item.location)).small().weak());

    let advice = session.advice().state(&item.id);

    if let Some(AdviceState::Ready(text)) = advice {
        egui::Frame::new()
            .fill(Color32::from_gray(42))
            .corner_radius(egui::CornerRadius::same(4))
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("✨ VESEMIR'S TIP:").small().strong().color(GOLD));
                ui.label(RichText::new(format!("\"{text}\"")).italics());
            });
    }

    ui.horizontal(|ui| {
        if ui.button("🗺 Locate").clicked() {
            actions.push(ChecklistAction::Locate {
                item_id: item.id.clone(),
                region: phase.region,
            });
        }
        if ui.button("📖 Wiki").clicked() {
            actions.push(ChecklistAction::OpenWiki(item.wiki_search.clone()));
        }

        let (label, enabled) = match advice {
            Some(AdviceState::Loading) => ("...", false),
            Some(AdviceState::Ready(_)) => ("Done", false),
            None => ("✨ Vesemir", true),
        };
        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
            actions.push(ChecklistAction::Consult(item.id.clone()));
        }
    });
}
