use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why a single skill record was left out of a graph load.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SkillRecordError {
    #[error("record is not a JSON object with the expected fields: {0}")]
    Malformed(String),

    #[error("record has no id")]
    MissingId,

    #[error("record `{0}` has no name")]
    MissingName(String),

    #[error("record `{0}` has no level")]
    MissingLevel(String),

    #[error("record `{id}` has level {level} outside 0..=100")]
    LevelOutOfRange { id: String, level: f64 },

    #[error("record id `{0}` appears more than once")]
    DuplicateId(String),
}

/// Recoverable failure of a suggestion round. The graph is left untouched and
/// the caller may retry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("recommendation provider failed: {0}")]
    Provider(String),

    #[error("recommendation request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("recommendation worker stopped without reporting a result")]
    Disconnected,

    #[error("recommendation request was cancelled")]
    Cancelled,

    #[error("recommendation provider returned no usable skills")]
    Empty,

    #[error("a recommendation request is already in flight")]
    AlreadyPending,

    #[error("graph has no core skills to seed recommendations from")]
    NoSeeds,

    #[error("engine has been shut down")]
    Inactive,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
