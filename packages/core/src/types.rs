//! Core data types for Tomolink.
//!
//! This module defines the canonical request shape shared by every layer:
//! [`RelationshipRequest`], the [`Field`] names used in error reporting, and
//! the [`Operation`] a mutation endpoint performs. The JSON field names match
//! the HTTP body format (`uuidsource`, `uuidtarget`, ...).

use serde::{Deserialize, Serialize};

/// One relationship request, either partially populated (as parsed from a
/// single input source) or canonical (after [`crate::reconcile`]).
///
/// Empty values are `""` for strings and `0` for `delta`; there is no
/// separate "absent" state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipRequest {
    /// Direction synonym, resolved by [`crate::direction::resolve`].
    #[serde(default)]
    pub direction: String,

    /// Relationship type name, e.g. `"friend"`.
    #[serde(default)]
    pub relationship: String,

    /// Increment amount for counters, or the stored value for other kinds.
    #[serde(default)]
    pub delta: i64,

    /// Identifier of the user whose document is written first.
    #[serde(default, rename = "uuidsource")]
    pub source: String,

    /// Identifier of the other user in the relationship.
    #[serde(default, rename = "uuidtarget")]
    pub target: String,
}

impl RelationshipRequest {
    /// Returns `true` if every field holds its empty value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Names the fields of a [`RelationshipRequest`] in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Direction,
    Relationship,
    Delta,
    #[serde(rename = "uuidsource")]
    Source,
    #[serde(rename = "uuidtarget")]
    Target,
}

/// Formats the field as its JSON wire name (e.g. `"uuidsource"`).
impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Direction => write!(f, "direction"),
            Field::Relationship => write!(f, "relationship"),
            Field::Delta => write!(f, "delta"),
            Field::Source => write!(f, "uuidsource"),
            Field::Target => write!(f, "uuidtarget"),
        }
    }
}

/// The kind of mutation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        let json = r#"{
            "direction": "mutual",
            "relationship": "friend",
            "delta": 3,
            "uuidsource": "alice",
            "uuidtarget": "bob"
        }"#;
        let req: RelationshipRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.source, "alice");
        assert_eq!(req.target, "bob");
        assert_eq!(req.delta, 3);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: RelationshipRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
    }

    #[test]
    fn field_display_matches_serde() {
        for field in [
            Field::Direction,
            Field::Relationship,
            Field::Delta,
            Field::Source,
            Field::Target,
        ] {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{field}\""));
        }
    }
}
