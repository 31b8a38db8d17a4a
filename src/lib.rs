//! Force-directed skill constellation.
//!
//! Skills are sorted into categories, seeded on a radial cluster layout and
//! then relaxed by a force simulation. A background worker can grow the graph
//! with suggested skills while the simulation keeps running.

pub mod config;
pub mod engine;
pub mod error;
pub mod skills;

pub use config::EngineConfig;
pub use engine::{
    FrameReport, GraphSnapshot, LoadSummary, SkillGraphEngine, SuggestionOutcome,
};
pub use error::{ConfigError, SkillRecordError, SuggestionError};
pub use skills::{Skill, load_skills, parse_skills};
