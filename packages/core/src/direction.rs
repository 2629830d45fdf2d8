//! Direction semantics: how many documents a mutation touches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction strings meaning "source → target only". The empty string is
/// also single.
pub const SINGLE_SYNONYMS: &[&str] = &["single", "one", "uni", "unary", "discrete"];

/// Direction strings meaning "both users, mirrored".
pub const RECIPROCAL_SYNONYMS: &[&str] = &["reciprocal", "mutual", "bi", "multiple"];

/// The two operational modes a direction string can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionMode {
    /// One write, on the source user's document.
    Single,
    /// Two mirrored writes, applied atomically.
    Reciprocal,
}

impl std::fmt::Display for DirectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectionMode::Single => write!(f, "single"),
            DirectionMode::Reciprocal => write!(f, "reciprocal"),
        }
    }
}

/// The direction string matched neither synonym set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "invalid relationship direction {0:?}; expected one of: \
     single, one, uni, unary, discrete, reciprocal, mutual, bi, multiple"
)]
pub struct InvalidDirectionError(pub String);

/// Classify a direction string. Matching is exact and case-sensitive.
///
/// Unrecognised strings are an error rather than a silent default to
/// [`DirectionMode::Single`], which would write only half of a reciprocal
/// relationship.
pub fn resolve(direction: &str) -> Result<DirectionMode, InvalidDirectionError> {
    if direction.is_empty() || SINGLE_SYNONYMS.contains(&direction) {
        Ok(DirectionMode::Single)
    } else if RECIPROCAL_SYNONYMS.contains(&direction) {
        Ok(DirectionMode::Reciprocal)
    } else {
        Err(InvalidDirectionError(direction.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_defaults_to_single() {
        assert_eq!(resolve(""), Ok(DirectionMode::Single));
    }

    #[test]
    fn single_synonyms() {
        for s in SINGLE_SYNONYMS {
            assert_eq!(resolve(s), Ok(DirectionMode::Single), "{s}");
        }
    }

    #[test]
    fn reciprocal_synonyms() {
        for s in RECIPROCAL_SYNONYMS {
            assert_eq!(resolve(s), Ok(DirectionMode::Reciprocal), "{s}");
        }
    }

    #[test]
    fn unknown_direction_rejected() {
        for s in ["both", "Single", "MUTUAL", " single", "two-way"] {
            assert_eq!(resolve(s), Err(InvalidDirectionError(s.to_string())), "{s}");
        }
    }

    #[test]
    fn synonym_sets_are_disjoint() {
        for s in SINGLE_SYNONYMS {
            assert!(!RECIPROCAL_SYNONYMS.contains(s));
        }
    }
}
