use std::collections::HashSet;

use eframe::egui::Vec2;
use rand::Rng;

use crate::config::SuggestionConfig;
use crate::engine::categorize::Category;
use crate::engine::graph::{Edge, EdgeKind, GraphNode, NodeId};
use crate::engine::layout::polar;
use crate::skills::{MAX_LEVEL, Skill, name_key};

use super::provider::SuggestionCandidate;

/// What a worker needs to know about a seed node, copied out of the graph so
/// the worker never touches live state.
#[derive(Clone, Debug)]
pub(crate) struct SeedSnapshot {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) anchor: Vec2,
    pub(crate) angle: f32,
    pub(crate) distance: f32,
}

impl SeedSnapshot {
    pub(crate) fn of(node: &GraphNode) -> Self {
        Self {
            id: node.id().to_owned(),
            name: node.name().to_owned(),
            category: node.category(),
            anchor: node.cluster_anchor,
            angle: node.angle_from_anchor,
            distance: node.distance_from_anchor,
        }
    }
}

/// New suggested nodes plus one `Suggested` edge per node back to its seed.
#[derive(Clone, Debug, Default)]
pub struct SuggestionBatch {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

impl SuggestionBatch {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub(crate) fn suggestion_id(name: &str) -> NodeId {
    let slug = name_key(name)
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
        .collect::<String>();
    format!("suggested:{slug}")
}

/// Turns provider candidates into placed nodes around `seed`, skipping any
/// name already in `taken_names` and recording accepted names there.
pub(crate) fn place_candidates(
    seed: &SeedSnapshot,
    candidates: Vec<SuggestionCandidate>,
    taken_names: &mut HashSet<String>,
    taken_ids: &mut HashSet<NodeId>,
    config: &SuggestionConfig,
    rng: &mut impl Rng,
    batch: &mut SuggestionBatch,
) {
    let mut placed = 0;
    for candidate in candidates {
        if placed >= config.max_candidates_per_seed {
            break;
        }

        let name = candidate.name.trim();
        if name.is_empty() || !taken_names.insert(name_key(name)) {
            continue;
        }
        let id = suggestion_id(name);
        if !taken_ids.insert(id.clone()) {
            continue;
        }

        let jitter = if config.angle_jitter > 0.0 {
            rng.random_range(-config.angle_jitter..=config.angle_jitter)
        } else {
            0.0
        };
        let angle = seed.angle + jitter;
        let distance = seed.distance + config.distance_increment;

        let skill = Skill::new(id.clone(), name, candidate.estimated_level.min(MAX_LEVEL));
        let mut node = GraphNode::suggestion(
            skill,
            seed.category,
            config.node_radius,
            seed.id.clone(),
            candidate.rationale,
        );
        node.cluster_anchor = seed.anchor;
        node.angle_from_anchor = angle;
        node.distance_from_anchor = distance;
        node.position = seed.anchor + polar(angle, distance);

        batch.edges.push(Edge::new(
            seed.id.clone(),
            id,
            config.edge_strength,
            EdgeKind::Suggested,
        ));
        batch.nodes.push(node);
        placed += 1;
    }
}
