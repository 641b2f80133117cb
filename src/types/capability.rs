//! Capability tags declared by providers and requested by callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Well-known capability tags with a `Custom` escape hatch.
///
/// Serializes as a flat kebab-case string (e.g. `"text-generation"`), so it
/// works as a JSON value, a map key, and inside plain key-value config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    TextGeneration,
    Translation,
    Summarization,
    QuestionAnswering,
    Classification,
    Embedding,
    /// Provider-specific capability not in the well-known set.
    Custom(String),
}

impl Capability {
    /// Canonical tag for this capability.
    pub fn as_str(&self) -> &str {
        match self {
            Self::TextGeneration => "text-generation",
            Self::Translation => "translation",
            Self::Summarization => "summarization",
            Self::QuestionAnswering => "question-answering",
            Self::Classification => "classification",
            Self::Embedding => "embedding",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Create a custom capability tag.
    pub fn custom(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        // Normalise well-known tags so `custom("translation") == Translation`.
        tag.parse().unwrap_or(Self::Custom(tag))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "text-generation" => Self::TextGeneration,
            "translation" => Self::Translation,
            "summarization" => Self::Summarization,
            "question-answering" => Self::QuestionAnswering,
            "classification" => Self::Classification,
            "embedding" => Self::Embedding,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        let Ok(cap) = s.parse();
        cap
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Capability::from(s.as_str()))
    }
}
