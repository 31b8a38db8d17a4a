use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use skill_constellation::engine::SuggestionProvider;
use skill_constellation::{EngineConfig, Skill, SkillGraphEngine, load_skills, parse_skills};

mod graph;
mod render_utils;
mod ui;

const SAMPLE_SKILLS: &str = include_str!("../../data/skills.json");

pub struct SkillGraphApp {
    skills_path: Option<PathBuf>,
    config: EngineConfig,
    provider: Arc<dyn SuggestionProvider>,
    state: AppState,
    reload_rx: Option<Receiver<Result<Vec<Skill>, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Vec<Skill>, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: SkillGraphEngine,
    search: String,
    status: Option<String>,
    pan: Vec2,
    zoom: f32,
    show_labels: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

impl SkillGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        skills_path: Option<PathBuf>,
        config: EngineConfig,
        provider: Arc<dyn SuggestionProvider>,
    ) -> Self {
        let state = Self::start_load(skills_path.clone());
        Self {
            skills_path,
            config,
            provider,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(skills_path: Option<PathBuf>) -> Receiver<Result<Vec<Skill>, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = match &skills_path {
                Some(path) => load_skills(path),
                None => parse_skills(SAMPLE_SKILLS),
            };
            let _ = tx.send(result.map_err(|error| format!("{error:#}")));
        });

        rx
    }

    fn start_load(skills_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(skills_path),
        }
    }

    fn source_label(&self) -> String {
        self.skills_path
            .as_ref()
            .map_or_else(|| "built-in sample".to_owned(), |path| path.display().to_string())
    }

    fn ready(&self, skills: &[Skill]) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            self.config.clone(),
            Arc::clone(&self.provider),
            skills,
        )))
    }
}

impl eframe::App for SkillGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let source = self.source_label();

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(skills)) => transition = Some(Ok(skills)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading skills...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load skills");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.skills_path.clone());
                }
                return;
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.skills_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(skills)) => {
                            let summary = model.engine.reload(&skills);
                            model.status = Some(format!(
                                "Reloaded {} skills ({} skipped)",
                                summary.loaded, summary.skipped
                            ));
                        }
                        Ok(Err(error)) => {
                            model.status = Some(format!("Reload failed: {error}"));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.status = Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(skills) => self.ready(&skills),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
