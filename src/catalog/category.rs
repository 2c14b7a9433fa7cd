use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Kind of icon a catalog entry or screenshot region depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Artifact,
    Hero,
    Trait,
    Genre,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Artifact,
        Category::Hero,
        Category::Trait,
        Category::Genre,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Artifact => "artifact",
            Category::Hero => "hero",
            Category::Trait => "trait",
            Category::Genre => "genre",
        }
    }

    /// Name reported when nothing in the catalog is an acceptable match.
    pub fn unknown_name(self) -> &'static str {
        match self {
            Category::Artifact => "UNKNOWN_ARTIFACT",
            Category::Hero => "UNKNOWN_HERO",
            Category::Trait => "UNKNOWN_TRAIT",
            Category::Genre => "UNKNOWN_GENRE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| EngineError::InvalidCategory(s.to_string()))
    }
}
