//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it wants to
//! override. Values are clamped into safe ranges by [`EngineConfig::sanitized`]
//! before the engine uses them.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation ticks per second of wall time fed to `frame`.
    pub tick_rate_hz: f32,
    /// Upper bound on ticks run for a single long frame.
    pub max_ticks_per_frame: u32,
    pub physics: PhysicsConfig,
    pub layout: LayoutConfig,
    pub suggestions: SuggestionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_ticks_per_frame: 4,
            physics: PhysicsConfig::default(),
            layout: LayoutConfig::default(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Many-body charge. Negative values repel.
    pub charge: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    /// Fraction of velocity removed every tick.
    pub velocity_decay: f32,
    pub core_link_distance: f32,
    pub suggested_link_distance: f32,
    pub cluster_strength: f32,
    /// Collision keeps centers at least `(r_a + r_b) * collision_radius_factor` apart.
    pub collision_radius_factor: f32,
    pub collision_strength: f32,
    pub viewport_radius: f32,
    pub boundary_padding: f32,
    pub boundary_strength: f32,
    pub centering_strength: f32,
    /// Distances below this are clamped before any inverse-distance term.
    pub min_distance: f32,
    /// Per-tick displacement bound.
    pub max_speed: f32,
    pub drag_alpha_target: f32,
    pub suggestion_alpha: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            charge: -50.0,
            alpha_decay: 0.02,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            core_link_distance: 50.0,
            suggested_link_distance: 80.0,
            cluster_strength: 0.3,
            collision_radius_factor: 1.8,
            collision_strength: 0.7,
            viewport_radius: 480.0,
            boundary_padding: 40.0,
            boundary_strength: 0.5,
            centering_strength: 0.005,
            min_distance: 4.0,
            max_speed: 40.0,
            drag_alpha_target: 0.3,
            suggestion_alpha: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance of every category anchor from the origin.
    pub category_radius: f32,
    /// Angular step between siblings of one category, in radians.
    pub sibling_arc_step: f32,
    pub base_distance: f32,
    pub core_link_strength: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            category_radius: 250.0,
            sibling_arc_step: PI / 12.0,
            base_distance: 60.0,
            core_link_strength: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub max_seeds: usize,
    pub max_candidates_per_seed: usize,
    /// Half-width of the random angle jitter around the seed's angle, in radians.
    pub angle_jitter: f32,
    pub distance_increment: f32,
    pub node_radius: f32,
    pub edge_strength: f32,
    pub timeout_ms: u64,
    /// Fixed RNG seed for reproducible seed selection and jitter.
    pub seed: Option<u64>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_seeds: 3,
            max_candidates_per_seed: 4,
            angle_jitter: PI / 8.0,
            distance_increment: 40.0,
            node_radius: 8.0,
            edge_strength: 0.5,
            timeout_ms: 10_000,
            seed: None,
        }
    }
}

impl SuggestionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    pub fn tick_interval(&self) -> Duration {
        let rate = f64::from(self.tick_rate_hz.clamp(1.0, 480.0));
        Duration::from_nanos((1_000_000_000.0 / rate).round() as u64)
    }

    /// Clamps every knob into a range the solver is known to stay stable in.
    pub fn sanitized(mut self) -> Self {
        self.tick_rate_hz = finite_or(self.tick_rate_hz, 60.0).clamp(1.0, 480.0);
        self.max_ticks_per_frame = self.max_ticks_per_frame.clamp(1, 32);

        let defaults = PhysicsConfig::default();
        let physics = &mut self.physics;
        physics.charge = finite_or(physics.charge, defaults.charge).clamp(-2_000.0, 0.0);
        physics.alpha_decay = finite_or(physics.alpha_decay, defaults.alpha_decay).clamp(0.001, 0.5);
        physics.alpha_min = finite_or(physics.alpha_min, defaults.alpha_min).clamp(1e-5, 0.1);
        physics.velocity_decay =
            finite_or(physics.velocity_decay, defaults.velocity_decay).clamp(0.05, 0.95);
        physics.core_link_distance =
            finite_or(physics.core_link_distance, defaults.core_link_distance).clamp(1.0, 1_000.0);
        physics.suggested_link_distance = finite_or(
            physics.suggested_link_distance,
            defaults.suggested_link_distance,
        )
        .clamp(1.0, 1_000.0);
        physics.cluster_strength =
            finite_or(physics.cluster_strength, defaults.cluster_strength).clamp(0.0, 1.0);
        physics.collision_radius_factor = finite_or(
            physics.collision_radius_factor,
            defaults.collision_radius_factor,
        )
        .clamp(1.0, 4.0);
        physics.collision_strength =
            finite_or(physics.collision_strength, defaults.collision_strength).clamp(0.0, 1.0);
        physics.viewport_radius =
            finite_or(physics.viewport_radius, defaults.viewport_radius).clamp(50.0, 20_000.0);
        physics.boundary_padding = finite_or(physics.boundary_padding, defaults.boundary_padding)
            .clamp(0.0, physics.viewport_radius * 0.5);
        physics.boundary_strength =
            finite_or(physics.boundary_strength, defaults.boundary_strength).clamp(0.0, 1.0);
        physics.centering_strength =
            finite_or(physics.centering_strength, defaults.centering_strength).clamp(0.0, 0.1);
        physics.min_distance =
            finite_or(physics.min_distance, defaults.min_distance).clamp(0.5, 50.0);
        physics.max_speed = finite_or(physics.max_speed, defaults.max_speed).clamp(1.0, 200.0);
        physics.drag_alpha_target =
            finite_or(physics.drag_alpha_target, defaults.drag_alpha_target).clamp(0.0, 1.0);
        physics.suggestion_alpha =
            finite_or(physics.suggestion_alpha, defaults.suggestion_alpha).clamp(0.0, 1.0);

        let defaults = LayoutConfig::default();
        let layout = &mut self.layout;
        layout.category_radius =
            finite_or(layout.category_radius, defaults.category_radius).clamp(0.0, 10_000.0);
        layout.sibling_arc_step =
            finite_or(layout.sibling_arc_step, defaults.sibling_arc_step).clamp(0.0, PI);
        layout.base_distance =
            finite_or(layout.base_distance, defaults.base_distance).clamp(0.0, 1_000.0);
        layout.core_link_strength = finite_or(layout.core_link_strength, defaults.core_link_strength)
            .clamp(f32::EPSILON, 1.0);

        let defaults = SuggestionConfig::default();
        let suggestions = &mut self.suggestions;
        suggestions.max_seeds = suggestions.max_seeds.clamp(1, 3);
        suggestions.max_candidates_per_seed = suggestions.max_candidates_per_seed.clamp(1, 16);
        suggestions.angle_jitter =
            finite_or(suggestions.angle_jitter, defaults.angle_jitter).clamp(0.0, PI);
        suggestions.distance_increment =
            finite_or(suggestions.distance_increment, defaults.distance_increment)
                .clamp(0.0, 1_000.0);
        suggestions.node_radius =
            finite_or(suggestions.node_radius, defaults.node_radius).clamp(2.0, 10.0);
        suggestions.edge_strength = finite_or(suggestions.edge_strength, defaults.edge_strength)
            .clamp(f32::EPSILON, 1.0);

        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
