use std::thread;
use std::time::Duration;

use crate::engine::categorize::Category;

use super::provider::{SuggestionCandidate, SuggestionProvider};

type Entry = (&'static str, u8, &'static str);

/// Follow-ups for specific skills, checked before the per-category table.
const BY_SKILL: &[(&str, &[Entry])] = &[
    (
        "react",
        &[
            ("Next.js", 45, "Server rendering and routing on top of React"),
            ("Redux Toolkit", 40, "State management commonly paired with React"),
            ("React Testing Library", 35, "Component testing for React apps"),
        ],
    ),
    (
        "rust",
        &[
            ("Tokio", 40, "The async runtime most Rust services build on"),
            ("WebAssembly", 30, "Rust compiles cleanly to wasm targets"),
        ],
    ),
    (
        "docker",
        &[
            ("Kubernetes", 35, "Orchestrates the containers Docker builds"),
            ("Docker Compose", 50, "Multi-container local environments"),
        ],
    ),
    (
        "python",
        &[
            ("FastAPI", 40, "Typed HTTP APIs in Python"),
            ("Pandas", 35, "Tabular data work in Python"),
        ],
    ),
];

const BY_CATEGORY: &[(Category, &[Entry])] = &[
    (
        Category::Frontend,
        &[
            ("TypeScript", 45, "Static types for larger frontend codebases"),
            ("Accessibility (WCAG)", 30, "Inclusive interfaces are expected of frontend work"),
            ("Vite", 40, "Fast bundling and dev server"),
        ],
    ),
    (
        Category::Backend,
        &[
            ("GraphQL", 35, "Flexible API layer over existing services"),
            ("Message Queues", 30, "Decoupling services with async messaging"),
            ("OpenAPI", 40, "Documented, generated HTTP contracts"),
        ],
    ),
    (
        Category::Database,
        &[
            ("Query Optimization", 35, "Index and plan tuning for relational stores"),
            ("Redis", 40, "Caching in front of the primary database"),
        ],
    ),
    (
        Category::DevOps,
        &[
            ("Terraform", 35, "Infrastructure as code"),
            ("GitHub Actions", 45, "CI/CD close to the repository"),
            ("Prometheus", 30, "Metrics and alerting for deployed services"),
        ],
    ),
    (
        Category::Mobile,
        &[
            ("React Native", 35, "Shared code across iOS and Android"),
            ("App Store Deployment", 40, "Shipping builds to users"),
        ],
    ),
    (
        Category::DataAi,
        &[
            ("Feature Engineering", 35, "Better inputs beat bigger models"),
            ("MLOps", 30, "Getting models into production"),
        ],
    ),
    (
        Category::Design,
        &[
            ("Design Systems", 40, "Reusable components across products"),
            ("User Research", 35, "Grounding design in user evidence"),
        ],
    ),
];

const GENERAL: &[Entry] = &[
    ("Git", 50, "Version control underpins every discipline"),
    ("Technical Writing", 35, "Clear docs multiply the value of any skill"),
    ("Automated Testing", 40, "Confidence to change code quickly"),
];

/// Built-in stand-in for a real recommendation service: a static table keyed
/// by skill name, then by category, with an optional artificial delay.
#[derive(Clone, Debug, Default)]
pub struct CatalogProvider {
    latency: Duration,
}

impl CatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    fn entries_for(seed_skill_name: &str, seed_category: &str) -> &'static [Entry] {
        let name = seed_skill_name.to_lowercase();
        if let Some((_, entries)) = BY_SKILL.iter().find(|(key, _)| name.contains(*key)) {
            return *entries;
        }

        BY_CATEGORY
            .iter()
            .find(|(category, _)| category.label().eq_ignore_ascii_case(seed_category))
            .map(|(_, entries)| *entries)
            .unwrap_or(GENERAL)
    }
}

impl SuggestionProvider for CatalogProvider {
    fn generate_suggestions(
        &self,
        seed_skill_name: &str,
        seed_category: &str,
    ) -> anyhow::Result<Vec<SuggestionCandidate>> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        Ok(Self::entries_for(seed_skill_name, seed_category)
            .iter()
            .map(|(name, level, rationale)| SuggestionCandidate::new(*name, *level, *rationale))
            .collect())
    }
}
