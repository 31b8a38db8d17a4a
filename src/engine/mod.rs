//! The skill graph engine.
//!
//! [`SkillGraphEngine`] owns the live graph together with everything that
//! mutates it: the force simulation, the pointer interaction state and at most
//! one outstanding suggestion round. All mutation happens on the thread that
//! owns the engine, between ticks. A renderer reads [`SkillGraphEngine::graph`]
//! or [`SkillGraphEngine::snapshot`] and forwards pointer events through the
//! `on_*` methods.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::vec2;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{SkillRecordError, SuggestionError};
use crate::skills::Skill;

pub mod categorize;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod physics;
pub mod simulation;
pub mod suggest;

pub use categorize::{CATEGORY_RULES, Category, CategoryRule, categorize};
pub use graph::{Edge, EdgeKind, GraphNode, NodeId, PinState, SkillGraph, skill_radius};
pub use interaction::InteractionController;
pub use layout::{core_links, initialize_layout};
pub use simulation::Simulation;
pub use suggest::{
    CatalogProvider, SuggestionBatch, SuggestionCandidate, SuggestionGenerator, SuggestionPoll,
    SuggestionProvider, SuggestionRequest,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
    pub categories: usize,
    pub edges: usize,
}

/// How a suggestion round ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionOutcome {
    Merged { nodes: usize },
    Failed(SuggestionError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub suggestions: Option<SuggestionOutcome>,
}

/// Owned copy of the graph for renderers that cannot borrow the engine.
#[derive(Clone, Debug)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub alpha: f32,
    pub running: bool,
}

pub struct SkillGraphEngine {
    config: EngineConfig,
    graph: SkillGraph,
    simulation: Simulation,
    interaction: InteractionController,
    generator: SuggestionGenerator,
    pending: Option<SuggestionRequest>,
    revision: u64,
    active: bool,
}

impl SkillGraphEngine {
    pub fn new(config: EngineConfig, provider: Arc<dyn SuggestionProvider>) -> Self {
        let config = config.sanitized();
        Self {
            simulation: Simulation::new(&config),
            generator: SuggestionGenerator::new(provider, &config.suggestions),
            graph: SkillGraph::new(),
            interaction: InteractionController::new(),
            pending: None,
            revision: 0,
            active: true,
            config,
        }
    }

    /// Replaces the whole graph with `skills`.
    ///
    /// Invalid records and repeated ids are skipped with a warning. Interaction
    /// state is reset, any outstanding suggestion round is dropped and the
    /// simulation is reheated to full temperature.
    pub fn load(&mut self, skills: &[Skill]) -> LoadSummary {
        self.cancel_suggestions();

        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(skills.len());
        for skill in skills {
            let verdict = skill.validate().and_then(|()| {
                if seen.insert(skill.id.as_str()) {
                    Ok(())
                } else {
                    Err(SkillRecordError::DuplicateId(skill.id.clone()))
                }
            });
            match verdict {
                Ok(()) => nodes.push(GraphNode::core(skill.clone())),
                Err(error) => warn!("skipping skill record: {error}"),
            }
        }

        initialize_layout(&mut nodes, &self.config.layout);
        let edges = core_links(&nodes, &self.config.layout);
        let categories = nodes
            .iter()
            .map(GraphNode::category)
            .collect::<HashSet<_>>()
            .len();

        let mut graph = SkillGraph::new();
        for node in nodes {
            graph.push_node(node);
        }
        for edge in edges {
            graph.push_edge(edge);
        }

        let summary = LoadSummary {
            loaded: graph.len(),
            skipped: skills.len() - graph.len(),
            categories,
            edges: graph.edges().len(),
        };

        self.graph = graph;
        self.revision += 1;
        self.interaction.reset();
        self.simulation.set_alpha_target(0.0);
        self.simulation.reheat(1.0);

        info!(
            loaded = summary.loaded,
            skipped = summary.skipped,
            categories = summary.categories,
            edges = summary.edges,
            revision = self.revision,
            "skill graph loaded"
        );
        summary
    }

    pub fn reload(&mut self, skills: &[Skill]) -> LoadSummary {
        self.load(skills)
    }

    /// Starts or resumes the tick schedule. Has no effect after [`shutdown`].
    ///
    /// [`shutdown`]: Self::shutdown
    pub fn start(&mut self) {
        if self.active {
            self.simulation.start();
        }
    }

    /// Pauses the schedule. Until the next `start`, frames neither tick nor
    /// merge finished suggestion rounds.
    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    /// Stops for good and abandons any outstanding suggestion round.
    pub fn shutdown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.simulation.stop();
        self.cancel_suggestions();
        debug!(revision = self.revision, "engine shut down");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_running(&self) -> bool {
        self.active && self.simulation.is_running()
    }

    pub fn is_quiescent(&self) -> bool {
        self.simulation.is_quiescent()
    }

    pub fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &SkillGraph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Runs one solver step immediately, outside the frame schedule.
    pub fn tick(&mut self) -> f32 {
        if !self.active {
            return self.simulation.alpha();
        }
        self.simulation.tick(&mut self.graph)
    }

    /// Per-frame entry point: merges a finished suggestion round, then runs
    /// the ticks that fall due in `elapsed`.
    pub fn frame(&mut self, elapsed: Duration) -> FrameReport {
        if !self.is_running() {
            return FrameReport::default();
        }

        let suggestions = self.poll_suggestions();
        let ticks = self.simulation.advance(&mut self.graph, elapsed);
        FrameReport { ticks, suggestions }
    }

    /// Starts a background suggestion round seeded from the current graph.
    pub fn request_suggestions(&mut self) -> Result<(), SuggestionError> {
        if !self.active {
            return Err(SuggestionError::Inactive);
        }
        if self.pending.is_some() {
            return Err(SuggestionError::AlreadyPending);
        }

        let request = self.generator.generate(&self.graph, self.revision)?;
        self.pending = Some(request);
        Ok(())
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Abandons the outstanding round, if any. Its result is never merged.
    pub fn cancel_suggestions(&mut self) {
        if let Some(request) = self.pending.take() {
            request.cancel();
            debug!(elapsed = ?request.elapsed(), "suggestion request cancelled");
        }
    }

    /// Checks the outstanding round and merges its result when it is ready.
    /// Returns `None` while nothing has finished.
    pub fn poll_suggestions(&mut self) -> Option<SuggestionOutcome> {
        if !self.is_running() {
            return None;
        }
        let request = self.pending.take()?;

        if request.revision() != self.revision {
            debug!(
                request_revision = request.revision(),
                revision = self.revision,
                "dropping suggestions for a previous graph"
            );
            return None;
        }

        let result = match request.poll() {
            SuggestionPoll::Pending => {
                let timeout = self.config.suggestions.timeout();
                if request.elapsed() < timeout {
                    self.pending = Some(request);
                    return None;
                }
                request.cancel();
                Err(SuggestionError::TimedOut(timeout))
            }
            SuggestionPoll::Ready(result) => result,
        };

        let outcome = match result {
            Ok(batch) => match self.merge(batch) {
                0 => SuggestionOutcome::Failed(SuggestionError::Empty),
                nodes => SuggestionOutcome::Merged { nodes },
            },
            Err(error) => SuggestionOutcome::Failed(error),
        };
        if let SuggestionOutcome::Failed(error) = &outcome {
            warn!("skill suggestion round failed: {error}");
        }
        Some(outcome)
    }

    /// Adds the batch to the live graph. Names are checked again here since the
    /// graph may have changed while the worker ran.
    fn merge(&mut self, batch: SuggestionBatch) -> usize {
        let mut taken = self.graph.name_keys();
        let mut added = HashSet::new();

        for node in batch.nodes {
            let seed_present = node
                .source_node_id
                .as_deref()
                .is_some_and(|source| self.graph.contains(source));
            if !seed_present || !taken.insert(node.skill.name_key()) {
                continue;
            }
            let id = node.id().to_owned();
            if self.graph.push_node(node) {
                added.insert(id);
            }
        }
        for edge in batch.edges {
            if added.contains(&edge.target_id) {
                self.graph.push_edge(edge);
            }
        }

        if !added.is_empty() {
            self.simulation.reheat(self.config.physics.suggestion_alpha);
            info!(added = added.len(), total = self.graph.len(), "merged skill suggestions");
        }
        added.len()
    }

    /// Turns a suggestion into a regular skill. Returns `false` when `id` is
    /// not a suggested node.
    pub fn accept_suggestion(&mut self, id: &str) -> bool {
        let Some(node) = self.graph.node_mut(id).filter(|node| node.suggested) else {
            return false;
        };
        node.promote();

        for edge in self.graph.edges_mut() {
            if edge.kind == EdgeKind::Suggested && edge.touches(id) {
                edge.kind = EdgeKind::Core;
            }
        }
        self.simulation.reheat(self.config.physics.suggestion_alpha);
        info!(id, "accepted skill suggestion");
        true
    }

    /// Removes a suggestion and its edge. Returns `false` when `id` is not a
    /// suggested node.
    pub fn reject_suggestion(&mut self, id: &str) -> bool {
        if !self.graph.node(id).is_some_and(|node| node.suggested) {
            return false;
        }
        if self.interaction.forget(&mut self.graph, id) {
            self.simulation.set_alpha_target(0.0);
        }
        self.graph.remove_node(id);
        self.simulation.reheat(self.config.physics.suggestion_alpha);
        info!(id, "rejected skill suggestion");
        true
    }

    pub fn on_drag_start(&mut self, id: &str) -> bool {
        if !self.active || !self.interaction.drag_start(&mut self.graph, id) {
            return false;
        }
        let target = self.config.physics.drag_alpha_target;
        self.simulation.set_alpha_target(target);
        self.simulation.reheat(target);
        true
    }

    pub fn on_drag(&mut self, id: &str, x: f32, y: f32) -> bool {
        self.active && self.interaction.drag_to(&mut self.graph, id, vec2(x, y))
    }

    pub fn on_drag_end(&mut self, id: &str) -> bool {
        if !self.active || !self.interaction.drag_end(&mut self.graph, id) {
            return false;
        }
        self.simulation.set_alpha_target(0.0);
        true
    }

    pub fn on_node_click(&mut self, id: &str) {
        if self.graph.contains(id) {
            self.interaction.click(id);
        }
    }

    pub fn on_node_hover(&mut self, id: Option<&str>) {
        self.interaction.hover(id.filter(|id| self.graph.contains(id)));
    }

    pub fn clear_selection(&mut self) {
        self.interaction.clear_selection();
    }

    pub fn hovered(&self) -> Option<&str> {
        self.interaction.hovered()
    }

    pub fn selected(&self) -> Option<&str> {
        self.interaction.selected()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.interaction.dragging()
    }

    pub fn highlighted(&self) -> HashSet<&str> {
        self.interaction.highlighted(&self.graph)
    }

    pub fn set_search(&mut self, query: &str) {
        self.interaction.set_search(query);
    }

    pub fn search(&self) -> &str {
        self.interaction.search()
    }

    pub fn search_matches(&self) -> HashSet<&str> {
        self.interaction.search_matches(&self.graph)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.graph.nodes().to_vec(),
            edges: self.graph.edges().to_vec(),
            alpha: self.simulation.alpha(),
            running: self.is_running(),
        }
    }
}

impl Drop for SkillGraphEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SkillGraphEngine {
        let mut config = EngineConfig::default();
        config.suggestions.seed = Some(5);
        SkillGraphEngine::new(config, Arc::new(CatalogProvider::new()))
    }

    #[test]
    fn load_skips_invalid_and_repeated_records() {
        let mut engine = engine();
        let summary = engine.load(&[
            Skill::new("1", "React", 80),
            Skill::new("1", "Vue", 60),
            Skill::new("2", "  ", 60),
            Skill::new("3", "Docker", 120),
            Skill::new("4", "Figma", 55),
        ]);

        assert_eq!(
            summary,
            LoadSummary {
                loaded: 2,
                skipped: 3,
                categories: 2,
                edges: 0,
            }
        );
        assert_eq!(engine.revision(), 1);
    }

    #[test]
    fn hover_and_click_ignore_unknown_ids() {
        let mut engine = engine();
        engine.load(&[Skill::new("1", "React", 80)]);

        engine.on_node_hover(Some("nope"));
        engine.on_node_click("nope");
        assert_eq!(engine.hovered(), None);
        assert_eq!(engine.selected(), None);

        engine.on_node_hover(Some("1"));
        engine.on_node_click("1");
        assert_eq!(engine.hovered(), Some("1"));
        assert_eq!(engine.selected(), Some("1"));
    }

    #[test]
    fn shut_down_engines_refuse_work() {
        let mut engine = engine();
        engine.load(&[Skill::new("1", "React", 80)]);
        engine.shutdown();
        engine.start();

        assert!(!engine.is_running());
        assert_eq!(engine.request_suggestions(), Err(SuggestionError::Inactive));
        assert_eq!(engine.frame(Duration::from_secs(1)), FrameReport::default());
        assert!(!engine.on_drag_start("1"));
    }

    #[test]
    fn dragging_holds_the_simulation_warm_until_release() {
        let mut engine = engine();
        engine.load(&[Skill::new("1", "React", 80), Skill::new("2", "Vue", 60)]);
        engine.start();

        assert!(engine.on_drag_start("1"));
        assert_eq!(
            engine.simulation().alpha_target(),
            engine.config().physics.drag_alpha_target
        );
        assert!(engine.on_drag("1", 30.0, 40.0));
        assert!(engine.on_drag_end("1"));
        assert_eq!(engine.simulation().alpha_target(), 0.0);
    }
}
