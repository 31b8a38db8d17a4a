use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SkillRecordError;

pub const MAX_LEVEL: u8 = 100;

/// A verified skill as delivered by the data-loading side. Immutable once the
/// graph is built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: u8,
    #[serde(default)]
    pub last_verified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub endorsements: u32,
}

impl Skill {
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            last_verified: None,
            endorsements: 0,
        }
    }

    pub fn with_endorsements(mut self, endorsements: u32) -> Self {
        self.endorsements = endorsements;
        self
    }

    pub fn with_last_verified(mut self, last_verified: DateTime<Utc>) -> Self {
        self.last_verified = Some(last_verified);
        self
    }

    pub fn validate(&self) -> Result<(), SkillRecordError> {
        if self.id.trim().is_empty() {
            return Err(SkillRecordError::MissingId);
        }
        if self.name.trim().is_empty() {
            return Err(SkillRecordError::MissingName(self.id.clone()));
        }
        if self.level > MAX_LEVEL {
            return Err(SkillRecordError::LevelOutOfRange {
                id: self.id.clone(),
                level: f64::from(self.level),
            });
        }
        Ok(())
    }

    /// Case-insensitive identity of the skill name.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
