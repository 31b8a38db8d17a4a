use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.9;

/// Deterministic unit vector for a pair of coincident points, so stacked
/// nodes always separate the same way.
pub(super) fn separation_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin())
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// `|charge| * alpha`.
    pub(super) scaled_strength: f32,
    pub(super) min_distance_sq: f32,
}

/// Velocity change on `point` from a body of `mass` at `source`: the separation
/// vector scaled by `strength / distance²`. Inside the minimum distance the
/// kick saturates at `strength / min_distance`.
fn charge_between(point: Vec2, source: Vec2, mass: f32, params: ChargeParams) -> Option<Vec2> {
    let delta = point - source;
    let distance_sq = delta.length_sq();
    if distance_sq <= f32::EPSILON {
        return None;
    }
    let scale_sq = if distance_sq < params.min_distance_sq {
        (params.min_distance_sq * distance_sq).sqrt()
    } else {
        distance_sq
    };
    Some(delta * (params.scaled_strength * mass / scale_sq))
}

pub(super) fn accumulate_charge(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == index {
                continue;
            }
            match charge_between(point, positions[other], 1.0, params) {
                Some(kick) => *velocity += kick,
                None => {
                    let direction = if index < other {
                        separation_direction(index, other)
                    } else {
                        -separation_direction(other, index)
                    };
                    *velocity += direction * (params.scaled_strength / params.min_distance_sq.sqrt());
                }
            }
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance = delta.length().max(f32::EPSILON);
    let far_enough = !cell.bounds.contains(point)
        && cell.bounds.side_length() / distance < BARNES_HUT_THETA;
    if far_enough {
        if let Some(kick) = charge_between(point, cell.center_of_mass, cell.mass, params) {
            *velocity += kick;
        }
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, params, velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) radius_factor: f32,
    pub(super) strength: f32,
}

/// Soft pairwise separation on predicted positions. Overlapping pairs are
/// pushed apart along their separation, the lighter (smaller) node moving more.
pub(super) fn accumulate_collisions(
    cell_a: &QuadNode,
    cell_b: &QuadNode,
    same_cell: bool,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let reach = (cell_a.max_radius + cell_b.max_radius) * params.radius_factor;
    if cell_a.bounds.gap_sq(cell_b.bounds) > reach * reach {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (offset, &from) in cell_a.indices.iter().enumerate() {
                for &to in &cell_a.indices[offset + 1..] {
                    separate_pair(from, to, predicted, radii, params, velocities);
                }
            }
        } else {
            for &from in &cell_a.indices {
                for &to in &cell_b.indices {
                    separate_pair(from, to, predicted, radii, params, velocities);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, child) in children.iter().enumerate() {
            accumulate_collisions(child, child, true, predicted, radii, params, velocities);
            for other in &children[offset + 1..] {
                accumulate_collisions(child, other, false, predicted, radii, params, velocities);
            }
        }
        return;
    }

    let split_a = if cell_a.is_leaf() {
        false
    } else if cell_b.is_leaf() {
        true
    } else {
        cell_a.bounds.half_extent >= cell_b.bounds.half_extent
    };

    if split_a {
        for child in cell_a.children() {
            accumulate_collisions(child, cell_b, false, predicted, radii, params, velocities);
        }
    } else {
        for child in cell_b.children() {
            accumulate_collisions(cell_a, child, false, predicted, radii, params, velocities);
        }
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let min_distance = (radii[from] + radii[to]) * params.radius_factor;
    let delta = predicted[from] - predicted[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 1e-4 {
        delta / distance
    } else {
        separation_direction(from, to)
    };

    let overlap = (min_distance - distance) * params.strength;
    let weight_from = radii[to] * radii[to];
    let weight_to = radii[from] * radii[from];
    let total = (weight_from + weight_to).max(f32::EPSILON);

    velocities[from] += direction * (overlap * weight_from / total);
    velocities[to] -= direction * (overlap * weight_to / total);
}
