use eframe::egui::{self, RichText, Ui};

use skill_constellation::engine::Category;

use super::super::ViewModel;
use super::super::render_utils::category_color;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Controls");
        ui.add_space(6.0);

        ui.label("Search");
        let search = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("fuzzy skill name")
                .desired_width(f32::INFINITY),
        );
        if search.changed() {
            self.engine.set_search(&self.search);
        }
        let match_count = self.engine.search_matches().len();
        if !self.engine.search().is_empty() {
            ui.small(format!("{match_count} matching skills"));
        }

        ui.separator();
        ui.label(RichText::new("Simulation").strong());
        ui.horizontal(|ui| {
            let running = self.engine.is_running();
            if ui.button(if running { "Pause" } else { "Resume" }).clicked() {
                if running {
                    self.engine.stop();
                } else {
                    self.engine.start();
                }
            }
            ui.checkbox(&mut self.show_labels, "Labels");
            ui.checkbox(&mut self.show_fps_bar, "FPS");
        });
        if ui.button("Reset view").clicked() {
            self.pan = egui::Vec2::ZERO;
            self.zoom = 1.0;
        }

        ui.separator();
        ui.label(RichText::new("Suggestions").strong());
        ui.horizontal(|ui| {
            let generating = self.engine.is_generating();
            let suggest = ui.add_enabled(!generating, egui::Button::new("Suggest skills"));
            if suggest.clicked() {
                self.status = Some(match self.engine.request_suggestions() {
                    Ok(()) => "Asking for suggestions...".to_owned(),
                    Err(error) => format!("Suggestions unavailable: {error}"),
                });
            }
            if generating {
                ui.spinner();
                if ui.button("Cancel").clicked() {
                    self.engine.cancel_suggestions();
                    self.status = Some("Suggestion request cancelled".to_owned());
                }
            }
        });
        if let Some(status) = &self.status {
            ui.small(status.as_str());
        }

        ui.separator();
        ui.label(RichText::new("Categories").strong());
        let graph = self.engine.graph();
        for category in Category::ALL {
            let count = graph
                .nodes()
                .iter()
                .filter(|node| node.category() == category)
                .count();
            if count == 0 {
                continue;
            }
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(category_color(category)));
                ui.label(format!("{category} ({count})"));
            });
        }

        ui.add_space(8.0);
        ui.small("Drag a node to pin it. Right or middle drag pans, scroll zooms.");
    }
}
