//! One solver step over the live graph.
//!
//! Forces act on velocities, then positions integrate velocities. Order within
//! a tick: link springs, many-body charge, collision, cluster pull, boundary,
//! centering, then friction and the speed bound. Pinned and dragged nodes are
//! held at their fixed point and do not integrate.

mod forces;
mod quadtree;

use eframe::egui::Vec2;

use crate::config::PhysicsConfig;

use super::graph::{EdgeKind, SkillGraph};
use forces::{ChargeParams, CollisionParams, accumulate_charge, accumulate_collisions};
use quadtree::QuadNode;

/// Reused buffers so a tick does not allocate per node.
#[derive(Default)]
pub struct PhysicsScratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    degrees: Vec<u32>,
    links: Vec<Link>,
}

#[derive(Clone, Copy)]
struct Link {
    source: usize,
    target: usize,
    strength: f32,
    distance: f32,
}

/// Cools `alpha` one step toward `alpha_target`.
pub fn decay_alpha(alpha: f32, alpha_target: f32, config: &PhysicsConfig) -> f32 {
    alpha_target + (alpha - alpha_target) * (1.0 - config.alpha_decay)
}

/// Advances every free node by one step at the current temperature and
/// returns the cooled alpha for the next tick.
pub fn tick(
    graph: &mut SkillGraph,
    alpha: f32,
    alpha_target: f32,
    config: &PhysicsConfig,
    scratch: &mut PhysicsScratch,
) -> f32 {
    let alpha = decay_alpha(alpha, alpha_target, config);
    if graph.is_empty() {
        return alpha;
    }

    load_scratch(graph, config, scratch);
    apply_links(alpha, config, scratch);
    apply_charge(alpha, config, scratch);
    apply_collisions(config, scratch);
    apply_anchor_forces(graph, alpha, config, scratch);
    integrate(graph, config, scratch);

    alpha
}

fn load_scratch(graph: &mut SkillGraph, config: &PhysicsConfig, scratch: &mut PhysicsScratch) {
    scratch.positions.clear();
    scratch.velocities.clear();
    scratch.radii.clear();
    scratch.links.clear();
    scratch.degrees.clear();
    scratch.degrees.resize(graph.len(), 0);

    for node in graph.nodes_mut() {
        if let Some(fixed) = node.pin_state.fixed_position() {
            node.position = fixed;
            node.velocity = Vec2::ZERO;
        }
        scratch.positions.push(node.position);
        scratch.velocities.push(node.velocity);
        scratch.radii.push(node.radius());
    }

    for edge in graph.edges() {
        let (Some(source), Some(target)) =
            (graph.index_of(&edge.source_id), graph.index_of(&edge.target_id))
        else {
            continue;
        };
        if source == target {
            continue;
        }

        let distance = match edge.kind {
            EdgeKind::Core => config.core_link_distance,
            EdgeKind::Suggested => config.suggested_link_distance,
        };
        scratch.degrees[source] += 1;
        scratch.degrees[target] += 1;
        scratch.links.push(Link {
            source,
            target,
            strength: edge.strength,
            distance,
        });
    }
}

/// Springs toward the rest length, split between the endpoints so the
/// better-connected end moves less.
fn apply_links(alpha: f32, config: &PhysicsConfig, scratch: &mut PhysicsScratch) {
    let positions = &scratch.positions;
    let velocities = &mut scratch.velocities;
    for link in &scratch.links {
        let delta = (positions[link.target] + velocities[link.target])
            - (positions[link.source] + velocities[link.source]);
        let length = delta.length().max(config.min_distance);
        let stretch = (length - link.distance) / length * alpha * link.strength;
        let correction = delta * stretch;

        let source_degree = scratch.degrees[link.source] as f32;
        let target_degree = scratch.degrees[link.target] as f32;
        let bias = source_degree / (source_degree + target_degree).max(1.0);

        velocities[link.target] -= correction * bias;
        velocities[link.source] += correction * (1.0 - bias);
    }
}

fn apply_charge(alpha: f32, config: &PhysicsConfig, scratch: &mut PhysicsScratch) {
    if config.charge >= 0.0 || scratch.positions.len() < 2 {
        return;
    }

    let Some(tree) = QuadNode::build(&scratch.positions, &scratch.radii) else {
        return;
    };
    let params = ChargeParams {
        scaled_strength: -config.charge * alpha,
        min_distance_sq: config.min_distance * config.min_distance,
    };
    for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
        accumulate_charge(&tree, index, &scratch.positions, params, velocity);
    }
}

fn apply_collisions(config: &PhysicsConfig, scratch: &mut PhysicsScratch) {
    if config.collision_strength <= 0.0 || scratch.positions.len() < 2 {
        return;
    }

    scratch.predicted.clear();
    scratch.predicted.extend(
        scratch
            .positions
            .iter()
            .zip(&scratch.velocities)
            .map(|(position, velocity)| *position + *velocity),
    );

    let Some(tree) = QuadNode::build(&scratch.predicted, &scratch.radii) else {
        return;
    };
    accumulate_collisions(
        &tree,
        &tree,
        true,
        &scratch.predicted,
        &scratch.radii,
        CollisionParams {
            radius_factor: config.collision_radius_factor,
            strength: config.collision_strength,
        },
        &mut scratch.velocities,
    );
}

/// Cluster pull, boundary containment and the weak global centering.
fn apply_anchor_forces(
    graph: &SkillGraph,
    alpha: f32,
    config: &PhysicsConfig,
    scratch: &mut PhysicsScratch,
) {
    let boundary = config.viewport_radius - config.boundary_padding;
    for (index, node) in graph.nodes().iter().enumerate() {
        let position = scratch.positions[index];
        let velocity = &mut scratch.velocities[index];

        *velocity += (node.cluster_anchor - position) * (config.cluster_strength * alpha);

        let radius = position.length();
        if radius > boundary {
            let excess = (radius - boundary).min(config.max_speed);
            *velocity -= position / radius * (excess * config.boundary_strength * alpha);
        }

        *velocity -= position * (config.centering_strength * alpha);
    }
}

fn integrate(graph: &mut SkillGraph, config: &PhysicsConfig, scratch: &PhysicsScratch) {
    let friction = 1.0 - config.velocity_decay;
    for (index, node) in graph.nodes_mut().iter_mut().enumerate() {
        if let Some(fixed) = node.pin_state.fixed_position() {
            node.position = fixed;
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut velocity = scratch.velocities[index] * friction;
        let speed = velocity.length();
        if speed > config.max_speed {
            velocity *= config.max_speed / speed;
        }

        let position = node.position + velocity;
        if position.is_finite() {
            node.position = position;
            node.velocity = velocity;
        } else {
            node.position = node.cluster_anchor;
            node.velocity = Vec2::ZERO;
        }
    }
}
