use std::time::Duration;

use tracing::debug;

use crate::config::{EngineConfig, PhysicsConfig};

use super::graph::SkillGraph;
use super::physics::{self, PhysicsScratch};

/// Owned handle over the solver's temperature and schedule.
///
/// Time reaches the simulation only through [`Simulation::advance`], which the
/// host calls once per animation frame with the elapsed wall time. While
/// stopped, nothing advances and nothing is mutated.
pub struct Simulation {
    config: PhysicsConfig,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    tick_interval: Duration,
    max_ticks_per_frame: u32,
    pending_time: Duration,
    ticks: u64,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.physics.clone(),
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            tick_interval: config.tick_interval(),
            max_ticks_per_frame: config.max_ticks_per_frame,
            pending_time: Duration::ZERO,
            ticks: 0,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!(alpha = self.alpha, "simulation started");
        }
        self.running = true;
        self.pending_time = Duration::ZERO;
    }

    /// Cancels the schedule. Time passed to `advance` afterwards is discarded.
    pub fn stop(&mut self) {
        if self.running {
            debug!(ticks = self.ticks, alpha = self.alpha, "simulation stopped");
        }
        self.running = false;
        self.pending_time = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_quiescent(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
    }

    /// Raises the temperature to at least `alpha`.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
    }

    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
    }

    /// Runs exactly one solver step if the simulation is running and not yet
    /// cold. Returns the alpha after the step.
    pub fn tick(&mut self, graph: &mut SkillGraph) -> f32 {
        if !self.running || self.is_quiescent() {
            return self.alpha;
        }

        self.alpha = physics::tick(
            graph,
            self.alpha,
            self.alpha_target,
            &self.config,
            &mut self.scratch,
        );
        self.ticks += 1;

        if self.is_quiescent() {
            debug!(ticks = self.ticks, "simulation cooled down");
        }
        self.alpha
    }

    /// Feeds `elapsed` wall time into the fixed-rate schedule and runs the
    /// ticks that fall due, at most `max_ticks_per_frame` of them. Returns the
    /// number of ticks run.
    pub fn advance(&mut self, graph: &mut SkillGraph, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }

        self.pending_time += elapsed;
        let mut ran = 0;
        while self.pending_time >= self.tick_interval && ran < self.max_ticks_per_frame {
            self.pending_time -= self.tick_interval;
            if self.is_quiescent() {
                continue;
            }
            self.tick(graph);
            ran += 1;
        }

        // A long stall should not replay as a burst on the next frame.
        if ran == self.max_ticks_per_frame {
            self.pending_time = self.pending_time.min(self.tick_interval);
        }
        ran
    }
}
