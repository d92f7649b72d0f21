use eframe::egui;
use egui::{Color32, RichText, Stroke};

use crate::model::catalog::Catalog;

const CARD_SIZE: egui::Vec2 = egui::vec2(320.0, 220.0);

/// Landing page. Returns true when the user picks the game.
pub fn draw_hub(ctx: &egui::Context, catalog: &Catalog, percent: u8) -> bool {
    let mut open_game = false;

    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(Color32::from_rgb(10, 10, 10)))
        .show(ctx, |ui| {
            ui.add_space((ui.available_height() - 360.0).max(24.0) / 2.0);

            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("Completionist Hub")
                        .size(48.0)
                        .strong()
                        .color(Color32::from_rgb(129, 140, 248)),
                );
                ui.label(RichText::new("Select your adventure").size(18.0).weak());
            });

            ui.add_space(32.0);

            let width = CARD_SIZE.x * 2.0 + 24.0;
            ui.horizontal(|ui| {
                ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));

                if game_card(ui, catalog, percent).clicked() {
                    open_game = true;
                }
                ui.add_space(24.0);
                coming_soon_card(ui);
            });
        });

    open_game
}

fn game_card(ui: &mut egui::Ui, catalog: &Catalog, percent: u8) -> egui::Response {
    let shown = egui::Frame::new()
        .fill(Color32::from_rgb(26, 26, 26))
        .stroke(Stroke::new(1.0, Color32::from_gray(51)))
        .corner_radius(egui::CornerRadius::same(16))
        .inner_margin(egui::Margin::same(20))
        .show(ui, |ui| {
            ui.set_min_size(CARD_SIZE - egui::vec2(40.0, 40.0));
            ui.set_max_width(CARD_SIZE.x - 40.0);

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                ui.horizontal(|ui| {
                    tag(ui, "⚔ MISSABLES");
                    tag(ui, "🗺 MAPS");
                });
                ui.label(RichText::new(&catalog.subtitle).weak());
                ui.horizontal(|ui| {
                    ui.label(RichText::new("The Witcher 3").size(24.0).strong());
                    ui.label(RichText::new("→").size(20.0));
                });
                if percent > 0 {
                    ui.label(RichText::new(format!("{percent}% complete")).small().weak());
                }
            });
        });

    let response = shown.response.interact(egui::Sense::click());
    if response.hovered() {
        ui.painter().rect_stroke(
            response.rect,
            egui::CornerRadius::same(16),
            Stroke::new(1.0, Color32::from_rgb(168, 28, 28)),
            egui::StrokeKind::Inside,
        );
    }
    response.on_hover_cursor(egui::CursorIcon::PointingHand)
}

fn coming_soon_card(ui: &mut egui::Ui) {
    egui::Frame::new()
        .fill(Color32::from_rgb(17, 17, 17))
        .stroke(Stroke::new(1.0, Color32::from_gray(34)))
        .corner_radius(egui::CornerRadius::same(16))
        .inner_margin(egui::Margin::same(20))
        .show(ui, |ui| {
            ui.set_min_size(CARD_SIZE - egui::vec2(40.0, 40.0));
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("More Games Coming Soon")
                        .size(20.0)
                        .strong()
                        .color(Color32::from_gray(75)),
                );
            });
        });
}

fn tag(ui: &mut egui::Ui, text: &str) {
    egui::Frame::new()
        .fill(Color32::from_black_alpha(128))
        .stroke(Stroke::new(1.0, Color32::from_white_alpha(25)))
        .corner_radius(egui::CornerRadius::same(4))
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().strong());
        });
}
