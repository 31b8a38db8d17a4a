use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;

use crate::skills::{Skill, name_key};

use super::categorize::{Category, categorize};

pub type NodeId = String;

pub const MIN_SKILL_RADIUS: f32 = 10.0;
pub const SKILL_RADIUS_SPAN: f32 = 10.0;

/// `10` at level 0 up to `20` at level 100.
pub fn skill_radius(level: u8) -> f32 {
    MIN_SKILL_RADIUS + (f32::from(level.min(100)) / 100.0) * SKILL_RADIUS_SPAN
}

/// Who owns a node's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinState {
    /// The solver moves the node.
    Free,
    /// A drag gesture is in progress; only the drag handler writes the position.
    Dragging(Vec2),
    /// Released by the user and held at that point.
    Pinned(Vec2),
}

impl PinState {
    pub fn fixed_position(self) -> Option<Vec2> {
        match self {
            Self::Free => None,
            Self::Dragging(position) | Self::Pinned(position) => Some(position),
        }
    }

    pub fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub skill: Skill,
    category: Category,
    radius: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pin_state: PinState,
    pub cluster_anchor: Vec2,
    pub angle_from_anchor: f32,
    pub distance_from_anchor: f32,
    pub suggested: bool,
    pub source_node_id: Option<NodeId>,
    pub rationale: Option<String>,
}

impl GraphNode {
    /// A node for one of the user's own skills. Position and anchor are filled
    /// in by the layout pass.
    pub fn core(skill: Skill) -> Self {
        let category = categorize(&skill.name, skill.level);
        let radius = skill_radius(skill.level);
        Self {
            skill,
            category,
            radius,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin_state: PinState::Free,
            cluster_anchor: Vec2::ZERO,
            angle_from_anchor: 0.0,
            distance_from_anchor: 0.0,
            suggested: false,
            source_node_id: None,
            rationale: None,
        }
    }

    /// A recommended node hanging off `source_node_id`, sharing its category.
    pub(crate) fn suggestion(
        skill: Skill,
        category: Category,
        radius: f32,
        source_node_id: NodeId,
        rationale: String,
    ) -> Self {
        Self {
            skill,
            category,
            radius,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin_state: PinState::Free,
            cluster_anchor: Vec2::ZERO,
            angle_from_anchor: 0.0,
            distance_from_anchor: 0.0,
            suggested: true,
            source_node_id: Some(source_node_id),
            rationale: Some(rationale),
        }
    }

    pub fn id(&self) -> &str {
        &self.skill.id
    }

    pub fn name(&self) -> &str {
        &self.skill.name
    }

    pub fn level(&self) -> u8 {
        self.skill.level
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Turns an accepted suggestion into a regular node. This is the only
    /// place a radius changes without a level change.
    pub(crate) fn promote(&mut self) {
        self.suggested = false;
        self.source_node_id = None;
        self.radius = skill_radius(self.skill.level);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Core,
    Suggested,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// In `(0, 1]`.
    pub strength: f32,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(
        source_id: impl Into<NodeId>,
        target_id: impl Into<NodeId>,
        strength: f32,
        kind: EdgeKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            strength: strength.clamp(f32::EPSILON, 1.0),
            kind,
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source_id == id || self.target_id == id
    }

    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source_id == id {
            Some(&self.target_id)
        } else if self.target_id == id {
            Some(&self.source_id)
        } else {
            None
        }
    }
}

/// The live node/edge set the solver and the renderer share.
#[derive(Clone, Debug, Default)]
pub struct SkillGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    index_by_id: HashMap<NodeId, usize>,
}

impl SkillGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [GraphNode] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        let index = self.index_of(id)?;
        self.nodes.get_mut(index)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        let key = name_key(name);
        self.nodes.iter().any(|node| node.skill.name_key() == key)
    }

    pub fn name_keys(&self) -> HashSet<String> {
        self.nodes.iter().map(|node| node.skill.name_key()).collect()
    }

    /// Returns `false` and leaves the graph untouched when the id is taken.
    pub(crate) fn push_node(&mut self, node: GraphNode) -> bool {
        if self.index_by_id.contains_key(node.id()) {
            return false;
        }
        self.index_by_id
            .insert(node.id().to_owned(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Returns `false` when either endpoint is missing or the edge is a self loop.
    pub(crate) fn push_edge(&mut self, edge: Edge) -> bool {
        if edge.source_id == edge.target_id
            || !self.contains(&edge.source_id)
            || !self.contains(&edge.target_id)
        {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Removes a node together with every edge touching it.
    pub(crate) fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        let index = self.index_by_id.remove(id)?;
        let node = self.nodes.remove(index);
        self.edges.retain(|edge| !edge.touches(id));
        for (position, node) in self.nodes.iter().enumerate().skip(index) {
            self.index_by_id.insert(node.id().to_owned(), position);
        }
        Some(node)
    }

    pub fn neighbors(&self, id: &str) -> HashSet<&str> {
        self.edges
            .iter()
            .filter_map(|edge| edge.other_end(id))
            .collect()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }
}
