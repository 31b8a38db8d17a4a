use std::collections::BTreeMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;

use super::categorize::Category;
use super::graph::{Edge, EdgeKind, GraphNode, PinState};

/// Seeds a radial cluster layout: one anchor per category evenly spaced on a
/// circle around the origin, each category's skills fanned out on a narrow arc
/// around its anchor with stronger skills closer in.
///
/// Categories are numbered in [`Category`] order; siblings keep input order.
pub fn initialize_layout(nodes: &mut [GraphNode], config: &LayoutConfig) {
    let groups = group_by_category(nodes);
    let category_count = groups.len();
    if category_count == 0 {
        return;
    }

    for (category_index, members) in groups.values().enumerate() {
        let theta = category_index as f32 * TAU / category_count as f32;
        let anchor = vec2(theta.cos(), theta.sin()) * config.category_radius;
        let sibling_count = members.len() as f32;

        for (sibling_index, &node_index) in members.iter().enumerate() {
            let node = &mut nodes[node_index];
            let angle = theta + (sibling_index as f32 - sibling_count / 2.0) * config.sibling_arc_step;
            let distance = config.base_distance + f32::from(100 - node.level().min(100)) / 5.0;

            node.cluster_anchor = anchor;
            node.angle_from_anchor = angle;
            node.distance_from_anchor = distance;
            node.position = anchor + polar(angle, distance);
            node.velocity = Vec2::ZERO;
            node.pin_state = PinState::Free;
        }
    }
}

/// Chains the skills of every category in input order, so each cluster holds
/// together through springs as well as through its anchor.
pub fn core_links(nodes: &[GraphNode], config: &LayoutConfig) -> Vec<Edge> {
    group_by_category(nodes)
        .values()
        .flat_map(|members| {
            members.windows(2).filter_map(|pair| match pair {
                [from, to] => Some(Edge::new(
                    nodes[*from].id(),
                    nodes[*to].id(),
                    config.core_link_strength,
                    EdgeKind::Core,
                )),
                _ => None,
            })
        })
        .collect()
}

pub fn polar(angle: f32, distance: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin()) * distance
}

fn group_by_category(nodes: &[GraphNode]) -> BTreeMap<Category, Vec<usize>> {
    let mut groups: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (index, node) in nodes.iter().enumerate().filter(|(_, node)| !node.suggested) {
        groups.entry(node.category()).or_default().push(index);
    }
    groups
}
