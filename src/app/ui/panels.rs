use std::collections::VecDeque;
use std::sync::Arc;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use skill_constellation::engine::SuggestionProvider;
use skill_constellation::{EngineConfig, Skill, SkillGraphEngine};

use super::super::{ViewModel, ViewScratch};

impl ViewModel {
    pub(in crate::app) fn new(
        config: EngineConfig,
        provider: Arc<dyn SuggestionProvider>,
        skills: &[Skill],
    ) -> Self {
        let mut engine = SkillGraphEngine::new(config, provider);
        let summary = engine.load(skills);
        engine.start();

        let status = (summary.skipped > 0)
            .then(|| format!("Skipped {} malformed skill records", summary.skipped));

        Self {
            engine,
            search: String::new(),
            status,
            pan: Vec2::ZERO,
            zoom: 1.0,
            show_labels: true,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            view_scratch: ViewScratch::default(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("skill constellation");
                    ui.separator();
                    ui.label(format!("skills: {source}"));
                    ui.label(format!("nodes: {}", self.engine.graph().len()));
                    ui.label(format!("edges: {}", self.engine.graph().edges().len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload skills"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.simulation_text());
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
