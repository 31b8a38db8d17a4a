//! Skill classification.
//!
//! A skill name is matched, case-insensitively and by substring, against the
//! keyword sets in [`CATEGORY_RULES`]. Rules are tried strictly in table order
//! and the first hit wins, so when a name carries keywords of several categories
//! (`"React Native"` matches both the frontend and mobile vocabularies) the
//! earlier row decides. Names that match nothing fall into a level bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declaration order is also the order categories are laid out around the
/// origin: keyword categories in table order, then the level buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Frontend,
    Backend,
    Database,
    DevOps,
    Mobile,
    DataAi,
    Design,
    Advanced,
    Intermediate,
    Beginner,
}

impl Category {
    pub const ALL: [Self; 10] = [
        Self::Frontend,
        Self::Backend,
        Self::Database,
        Self::DevOps,
        Self::Mobile,
        Self::DataAi,
        Self::Design,
        Self::Advanced,
        Self::Intermediate,
        Self::Beginner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::Database => "Database",
            Self::DevOps => "DevOps",
            Self::Mobile => "Mobile",
            Self::DataAi => "Data & AI",
            Self::Design => "Design",
            Self::Advanced => "Advanced",
            Self::Intermediate => "Intermediate",
            Self::Beginner => "Beginner",
        }
    }

    pub fn is_level_bucket(self) -> bool {
        matches!(self, Self::Advanced | Self::Intermediate | Self::Beginner)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct CategoryRule {
    pub category: Category,
    /// Lowercase substrings.
    pub keywords: &'static [&'static str],
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Frontend,
        keywords: &[
            "react", "vue", "angular", "svelte", "html", "css", "javascript", "typescript",
            "tailwind", "next.js", "redux", "webpack", "frontend",
        ],
    },
    CategoryRule {
        category: Category::Backend,
        keywords: &[
            "node", "express", "django", "flask", "spring", "rails", "rust", "golang", "java",
            "python", "php", "graphql", "rest api", "microservice", ".net", "backend",
        ],
    },
    CategoryRule {
        category: Category::Database,
        keywords: &[
            "sql", "postgres", "mongo", "redis", "database", "dynamo", "elasticsearch",
            "cassandra", "sqlite",
        ],
    },
    CategoryRule {
        category: Category::DevOps,
        keywords: &[
            "docker", "kubernetes", "k8s", "aws", "azure", "gcp", "terraform", "ci/cd",
            "jenkins", "ansible", "linux", "nginx", "devops",
        ],
    },
    CategoryRule {
        category: Category::Mobile,
        keywords: &["ios", "android", "swift", "kotlin", "flutter", "xamarin", "mobile"],
    },
    CategoryRule {
        category: Category::DataAi,
        keywords: &[
            "machine learning", "deep learning", "tensorflow", "pytorch", "pandas", "numpy",
            "scikit", "data science", "data analysis", "nlp", "llm", "statistics",
        ],
    },
    CategoryRule {
        category: Category::Design,
        keywords: &["figma", "sketch", "photoshop", "illustrator", "ux", "ui design", "design"],
    },
];

const ADVANCED_ABOVE: u8 = 75;
const INTERMEDIATE_ABOVE: u8 = 50;

/// Total: every input maps to exactly one category.
pub fn categorize(name: &str, level: u8) -> Category {
    let name = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|rule| rule.category)
        .unwrap_or_else(|| level_bucket(level))
}

pub fn level_bucket(level: u8) -> Category {
    if level > ADVANCED_ABOVE {
        Category::Advanced
    } else if level > INTERMEDIATE_ABOVE {
        Category::Intermediate
    } else {
        Category::Beginner
    }
}
