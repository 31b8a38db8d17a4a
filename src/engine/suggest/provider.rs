use serde::{Deserialize, Serialize};

/// One recommended skill as reported by a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCandidate {
    pub name: String,
    pub estimated_level: u8,
    pub rationale: String,
}

impl SuggestionCandidate {
    pub fn new(name: impl Into<String>, estimated_level: u8, rationale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            estimated_level,
            rationale: rationale.into(),
        }
    }
}

/// External recommendation capability. Called from a background worker, so it
/// may block for as long as it likes; the engine keeps ticking meanwhile.
pub trait SuggestionProvider: Send + Sync {
    fn generate_suggestions(
        &self,
        seed_skill_name: &str,
        seed_category: &str,
    ) -> anyhow::Result<Vec<SuggestionCandidate>>;
}

impl<F> SuggestionProvider for F
where
    F: Fn(&str, &str) -> anyhow::Result<Vec<SuggestionCandidate>> + Send + Sync,
{
    fn generate_suggestions(
        &self,
        seed_skill_name: &str,
        seed_category: &str,
    ) -> anyhow::Result<Vec<SuggestionCandidate>> {
        self(seed_skill_name, seed_category)
    }
}
