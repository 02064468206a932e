//! Surrogate key strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How surrogate ids are generated for a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyStrategy {
    /// Run-scoped counter. Unique within a run, not stable across runs.
    #[default]
    Monotonic,
    /// SHA-256 of the row's natural key, truncated to 63 bits. Stable across runs.
    ContentHash,
}

impl KeyStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monotonic => "monotonic",
            Self::ContentHash => "content-hash",
        }
    }
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" => Ok(Self::Monotonic),
            "content-hash" | "content_hash" => Ok(Self::ContentHash),
            other => Err(ModelError::UnknownKeyStrategy(other.to_string())),
        }
    }
}
