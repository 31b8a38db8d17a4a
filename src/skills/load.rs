use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::SkillRecordError;

use super::record::{MAX_LEVEL, Skill};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkill {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    level: Option<f64>,
    #[serde(default)]
    last_verified: Option<DateTime<Utc>>,
    #[serde(default)]
    endorsements: Option<u32>,
}

pub fn load_skills(path: &Path) -> Result<Vec<Skill>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read skills from {}", path.display()))?;
    parse_skills(&raw).with_context(|| format!("failed to parse skills from {}", path.display()))
}

/// Accepts either a bare JSON array of skill records or an object with a
/// `skills` array. Individual malformed records are skipped with a warning.
pub fn parse_skills(raw: &str) -> Result<Vec<Skill>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid skills JSON")?;

    let entries = match &parsed {
        Value::Array(entries) => entries,
        Value::Object(object) => object
            .get("skills")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("skills JSON object has no `skills` array"))?,
        _ => return Err(anyhow!("unexpected JSON type for skills document")),
    };

    let mut seen_ids = HashSet::with_capacity(entries.len());
    let mut skills = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match skill_from_value(entry) {
            Ok(skill) if !seen_ids.insert(skill.id.clone()) => {
                warn!(index, error = %SkillRecordError::DuplicateId(skill.id), "skipping skill record");
            }
            Ok(skill) => skills.push(skill),
            Err(error) => warn!(index, %error, "skipping skill record"),
        }
    }

    info!(
        loaded = skills.len(),
        skipped = entries.len() - skills.len(),
        "parsed skill records"
    );
    Ok(skills)
}

fn skill_from_value(value: &Value) -> Result<Skill, SkillRecordError> {
    let raw = RawSkill::deserialize(value)
        .map_err(|error| SkillRecordError::Malformed(error.to_string()))?;

    let id = match raw.id {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(SkillRecordError::MissingId),
    };

    let name = raw
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| SkillRecordError::MissingName(id.clone()))?;

    let level = raw
        .level
        .ok_or_else(|| SkillRecordError::MissingLevel(id.clone()))?;
    if !(0.0..=f64::from(MAX_LEVEL)).contains(&level) {
        return Err(SkillRecordError::LevelOutOfRange { id, level });
    }

    Ok(Skill {
        id,
        name: name.trim().to_owned(),
        level: level.round() as u8,
        last_verified: raw.last_verified,
        endorsements: raw.endorsements.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn skips_malformed_records_without_failing_the_load() {
        let skills = parse_skills(
            r#"[
                { "id": "1", "name": "React", "level": 80, "endorsements": 4 },
                { "id": "2", "level": 40 },
                { "id": "3", "name": "Go", "level": 140 },
                { "id": "4", "name": "Docker" },
                { "name": "No Id", "level": 10 },
                "not an object",
                { "id": "1", "name": "React again", "level": 10 },
                { "id": 5, "name": "SQL", "level": 55.0, "lastVerified": "2024-03-01T12:00:00Z" }
            ]"#,
        )
        .expect("document parses");

        let ids = skills.iter().map(|skill| skill.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["1", "5"]);
        assert_eq!(skills[0].endorsements, 4);
        assert_eq!(skills[1].level, 55);
        assert!(skills[1].last_verified.is_some());
    }

    #[test]
    fn accepts_wrapped_documents() {
        let skills = parse_skills(r#"{ "skills": [{ "id": "a", "name": "Rust", "level": 70 }] }"#)
            .expect("document parses");
        assert_eq!(skills, vec![Skill::new("a", "Rust", 70)]);
    }

    #[test]
    fn rejects_documents_that_are_not_skill_lists() {
        assert!(parse_skills("42").is_err());
        assert!(parse_skills(r#"{ "items": [] }"#).is_err());
        assert!(parse_skills("[").is_err());
    }

    #[test]
    fn loads_skills_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"[{{ "id": "1", "name": "Kubernetes", "level": 65 }}]"#)
            .expect("write skills");

        let skills = load_skills(file.path()).expect("skills load");
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "Kubernetes");
    }
}
