use std::collections::HashSet;

use eframe::egui::Vec2;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::trace;

use super::graph::{NodeId, PinState, SkillGraph};

/// Pointer state translated into graph terms: which node is hovered, which is
/// selected, which one is under an active drag, and the search filter.
#[derive(Default)]
pub struct InteractionController {
    hovered: Option<NodeId>,
    selected: Option<NodeId>,
    dragging: Option<NodeId>,
    search: String,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Takes ownership of the node's position. Refused while another drag is in
    /// progress or when the id is unknown.
    pub fn drag_start(&mut self, graph: &mut SkillGraph, id: &str) -> bool {
        if self.dragging.is_some() {
            return false;
        }
        let Some(node) = graph.node_mut(id) else {
            return false;
        };

        node.pin_state = PinState::Dragging(node.position);
        node.velocity = Vec2::ZERO;
        self.dragging = Some(id.to_owned());
        trace!(id, "drag started");
        true
    }

    /// Moves the dragged node to `position`. Ignored for any other node.
    pub fn drag_to(&mut self, graph: &mut SkillGraph, id: &str, position: Vec2) -> bool {
        if self.dragging.as_deref() != Some(id) || !position.is_finite() {
            return false;
        }
        let Some(node) = graph.node_mut(id) else {
            return false;
        };

        node.position = position;
        node.velocity = Vec2::ZERO;
        node.pin_state = PinState::Dragging(position);
        true
    }

    /// Ends the drag. A user skill stays pinned where it was dropped and that
    /// spot becomes its new cluster anchor; a suggestion goes back to the solver.
    pub fn drag_end(&mut self, graph: &mut SkillGraph, id: &str) -> bool {
        if self.dragging.as_deref() != Some(id) {
            return false;
        }
        self.dragging = None;
        let Some(node) = graph.node_mut(id) else {
            return false;
        };

        let position = node.position;
        node.velocity = Vec2::ZERO;
        if node.suggested {
            node.pin_state = PinState::Free;
        } else {
            node.pin_state = PinState::Pinned(position);
            node.cluster_anchor = position;
            node.distance_from_anchor = 0.0;
        }
        trace!(id, suggested = node.suggested, "drag ended");
        true
    }

    pub fn hover(&mut self, id: Option<&str>) {
        self.hovered = id.map(str::to_owned);
    }

    /// Selects the node, or clears the selection when it was already selected.
    pub fn click(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_owned());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The hovered node and its direct neighbors.
    pub fn highlighted<'a>(&'a self, graph: &'a SkillGraph) -> HashSet<&'a str> {
        let Some(hovered) = self.hovered.as_deref() else {
            return HashSet::new();
        };
        if !graph.contains(hovered) {
            return HashSet::new();
        }

        let mut highlighted = graph.neighbors(hovered);
        highlighted.insert(hovered);
        highlighted
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.trim().to_owned();
    }

    /// Ids of nodes whose name fuzzy-matches the search query.
    pub fn search_matches<'a>(&self, graph: &'a SkillGraph) -> HashSet<&'a str> {
        if self.search.is_empty() {
            return HashSet::new();
        }

        let matcher = SkimMatcherV2::default();
        let query = self.search.to_lowercase();
        graph
            .nodes()
            .iter()
            .filter(|node| {
                matcher
                    .fuzzy_match(&node.name().to_lowercase(), &query)
                    .is_some()
            })
            .map(|node| node.id())
            .collect()
    }

    /// Drops every reference to a node that left the graph. Returns `true`
    /// when this released an active drag.
    pub fn forget(&mut self, graph: &mut SkillGraph, id: &str) -> bool {
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.dragging.as_deref() != Some(id) {
            return false;
        }
        self.dragging = None;
        if let Some(node) = graph.node_mut(id) {
            node.pin_state = PinState::Free;
        }
        true
    }

    pub fn reset(&mut self) {
        self.hovered = None;
        self.selected = None;
        self.dragging = None;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::engine::categorize::Category;
    use crate::engine::graph::{Edge, EdgeKind, GraphNode};
    use crate::skills::Skill;

    fn graph() -> SkillGraph {
        let mut graph = SkillGraph::new();
        graph.push_node(GraphNode::core(Skill::new("1", "React", 80)));
        graph.push_node(GraphNode::core(Skill::new("2", "TypeScript", 70)));
        graph.push_node(GraphNode::core(Skill::new("3", "PostgreSQL", 40)));
        graph.push_node(GraphNode::suggestion(
            Skill::new("suggested:next-js", "Next.js", 45),
            Category::Frontend,
            8.0,
            "1".to_owned(),
            String::new(),
        ));
        graph.push_edge(Edge::new("1", "2", 0.7, EdgeKind::Core));
        graph.push_edge(Edge::new("1", "suggested:next-js", 0.5, EdgeKind::Suggested));
        graph
    }

    #[test]
    fn released_user_skills_stay_pinned_at_the_drop_point() {
        let mut graph = graph();
        let mut controller = InteractionController::new();

        assert!(controller.drag_start(&mut graph, "1"));
        assert!(controller.drag_to(&mut graph, "1", vec2(120.0, -40.0)));
        assert!(controller.drag_end(&mut graph, "1"));

        let node = graph.node("1").expect("node exists");
        assert_eq!(node.pin_state, PinState::Pinned(vec2(120.0, -40.0)));
        assert_eq!(node.cluster_anchor, vec2(120.0, -40.0));
        assert_eq!(controller.dragging(), None);
    }

    #[test]
    fn released_suggestions_are_handed_back_to_the_solver() {
        let mut graph = graph();
        let mut controller = InteractionController::new();

        controller.drag_start(&mut graph, "suggested:next-js");
        controller.drag_to(&mut graph, "suggested:next-js", vec2(10.0, 10.0));
        controller.drag_end(&mut graph, "suggested:next-js");

        let node = graph.node("suggested:next-js").expect("node exists");
        assert_eq!(node.pin_state, PinState::Free);
        assert_eq!(node.position, vec2(10.0, 10.0));
    }

    #[test]
    fn only_one_node_can_be_dragged_at_a_time() {
        let mut graph = graph();
        let mut controller = InteractionController::new();

        assert!(controller.drag_start(&mut graph, "1"));
        assert!(!controller.drag_start(&mut graph, "2"));
        assert!(!controller.drag_to(&mut graph, "2", vec2(1.0, 1.0)));
        assert!(!controller.drag_end(&mut graph, "2"));
        assert!(!controller.drag_start(&mut graph, "missing"));

        assert_eq!(graph.node("2").map(|node| node.pin_state), Some(PinState::Free));
    }

    #[test]
    fn hover_highlights_direct_neighbors() {
        let graph = graph();
        let mut controller = InteractionController::new();

        controller.hover(Some("1"));
        assert_eq!(
            controller.highlighted(&graph),
            HashSet::from(["1", "2", "suggested:next-js"])
        );

        controller.hover(Some("3"));
        assert_eq!(controller.highlighted(&graph), HashSet::from(["3"]));

        controller.hover(None);
        assert!(controller.highlighted(&graph).is_empty());
    }

    #[test]
    fn clicking_twice_clears_the_selection() {
        let mut controller = InteractionController::new();

        controller.click("1");
        assert_eq!(controller.selected(), Some("1"));
        controller.click("2");
        assert_eq!(controller.selected(), Some("2"));
        controller.click("2");
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn search_matches_names_fuzzily() {
        let graph = graph();
        let mut controller = InteractionController::new();

        controller.set_search("pstgr");
        assert_eq!(controller.search_matches(&graph), HashSet::from(["3"]));

        controller.set_search("  ");
        assert!(controller.search_matches(&graph).is_empty());
    }

    #[test]
    fn forgetting_a_dragged_node_releases_it() {
        let mut graph = graph();
        let mut controller = InteractionController::new();
        controller.drag_start(&mut graph, "1");
        controller.hover(Some("1"));
        controller.click("1");

        assert!(controller.forget(&mut graph, "1"));
        assert!(!controller.forget(&mut graph, "1"));

        assert_eq!(controller.dragging(), None);
        assert_eq!(controller.hovered(), None);
        assert_eq!(controller.selected(), None);
        assert_eq!(graph.node("1").map(|node| node.pin_state), Some(PinState::Free));
    }
}
