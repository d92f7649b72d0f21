use eframe::egui;
use egui::{Color32, RichText};

use crate::model::advice::AdviceDispatcher;
use crate::model::progress::ProgressStorage;
use crate::model::session::ChecklistSession;

pub fn draw_codex_window<S, D>(ctx: &egui::Context, session: &mut ChecklistSession<S>, dispatcher: &D)
where
    S: ProgressStorage,
    D: AdviceDispatcher + ?Sized,
{
    let mut open = session.codex.open;

    egui::Window::new(RichText::new("✨ The Witcher's Codex").color(Color32::from_rgb(255, 215, 0)))
        .id(egui::Id::new("codex"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(480.0)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .max_height(320.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    ui.set_min_height(200.0);
                    let codex = &session.codex;

                    match (codex.asked(), codex.answer()) {
                        (Some(asked), Some(answer)) => {
                            ui.label(RichText::new("QUERY").small().strong().weak());
                            ui.label(asked);
                            ui.add_space(8.0);
                            ui.label(
                                RichText::new("CODEX ENTRY")
                                    .small()
                                    .strong()
                                    .color(Color32::from_rgb(129, 140, 248)),
                            );
                            ui.label(answer);
                        }
                        (Some(asked), None) if codex.is_loading() => {
                            ui.label(RichText::new("QUERY").small().strong().weak());
                            ui.label(asked);
                            ui.add_space(8.0);
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(RichText::new("Searching the ancient texts…").weak());
                            });
                        }
                        _ => {
                            ui.vertical_centered(|ui| {
                                ui.add_space(60.0);
                                ui.label(RichText::new("📖").size(40.0).weak());
                                ui.label(RichText::new("\"Search the ancient texts...\"").italics().weak());
                            });
                        }
                    }
                });

            ui.separator();

            let mut submit = false;
            ui.horizontal(|ui| {
                let input = ui.add(
                    egui::TextEdit::singleline(&mut session.codex.draft)
                        .hint_text("Ask the Codex...")
                        .desired_width(ui.available_width() - 48.0),
                );
                if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }

                let label = if session.codex.is_loading() { "⏳" } else { "➤" };
                if ui
                    .add_enabled(session.codex.can_submit(), egui::Button::new(label))
                    .clicked()
                {
                    submit = true;
                }
            });

            if submit && session.ask_codex(dispatcher) {
                session.codex.draft.clear();
            }
        });

    session.codex.open = open;
}
