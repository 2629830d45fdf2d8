//! The relationship vocabulary a server accepts.
//!
//! A [`RelationshipSchema`] is built once from configuration and never
//! mutated afterwards, so it can be shared across request tasks behind an
//! `Arc` without locking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on configured relationship definitions.
pub const MAX_RELATIONSHIPS: usize = 10;

/// How a relationship's edge value behaves under create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Integer accumulated with atomic increments.
    Counter,
    /// Unix time in seconds, overwritten on each write.
    Timestamp,
    /// Integer value, overwritten on each write.
    Score,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipKind::Counter => write!(f, "counter"),
            RelationshipKind::Timestamp => write!(f, "timestamp"),
            RelationshipKind::Score => write!(f, "score"),
        }
    }
}

impl std::str::FromStr for RelationshipKind {
    type Err = SchemaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(RelationshipKind::Counter),
            "timestamp" => Ok(RelationshipKind::Timestamp),
            "score" => Ok(RelationshipKind::Score),
            _ => Err(SchemaError::UnknownKind(s.to_string())),
        }
    }
}

/// Errors raised while building a [`RelationshipSchema`].
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("relationship name at index {0} must not be empty")]
    EmptyName(usize),

    #[error("relationship {0:?} is defined more than once")]
    DuplicateName(String),

    #[error("unknown relationship type {0:?}; expected one of: counter, timestamp, score")]
    UnknownKind(String),

    #[error("{0} relationships defined; at most {MAX_RELATIONSHIPS} are supported")]
    TooMany(usize),
}

/// Ordered, immutable set of relationship names and their kinds.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSchema {
    entries: Vec<(String, RelationshipKind)>,
    index: HashMap<String, usize>,
}

impl RelationshipSchema {
    /// Build a schema from `(name, kind)` pairs in configuration order.
    pub fn from_definitions<I, N, K>(definitions: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: AsRef<str>,
    {
        let mut schema = Self::default();
        for (i, (name, kind)) in definitions.into_iter().enumerate() {
            let name = name.into();
            if name.is_empty() {
                return Err(SchemaError::EmptyName(i));
            }
            let kind: RelationshipKind = kind.as_ref().parse()?;
            if schema.index.contains_key(&name) {
                return Err(SchemaError::DuplicateName(name));
            }
            schema.index.insert(name.clone(), schema.entries.len());
            schema.entries.push((name, kind));
        }
        if schema.entries.len() > MAX_RELATIONSHIPS {
            return Err(SchemaError::TooMany(schema.entries.len()));
        }
        Ok(schema)
    }

    /// Returns `true` if `name` is a declared relationship (case-sensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The declared kind of `name`, if it is part of the schema.
    pub fn kind_of(&self, name: &str) -> Option<RelationshipKind> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    /// All relationship names, in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// All `(name, kind)` pairs, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RelationshipKind)> {
        self.entries.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RelationshipSchema {
        RelationshipSchema::from_definitions([
            ("friend", "counter"),
            ("colleague", "counter"),
            ("last_played", "timestamp"),
        ])
        .unwrap()
    }

    #[test]
    fn membership_is_case_sensitive() {
        let s = schema();
        assert!(s.contains("friend"));
        assert!(!s.contains("Friend"));
        assert!(!s.contains("enemy"));
    }

    #[test]
    fn names_keep_configuration_order() {
        let s = schema();
        let names: Vec<&str> = s.names().collect();
        assert_eq!(names, vec!["friend", "colleague", "last_played"]);
    }

    #[test]
    fn kind_lookup() {
        let s = schema();
        assert_eq!(s.kind_of("last_played"), Some(RelationshipKind::Timestamp));
        assert_eq!(s.kind_of("friend"), Some(RelationshipKind::Counter));
        assert_eq!(s.kind_of("enemy"), None);
    }

    #[test]
    fn duplicate_name_rejected() {
        let err = RelationshipSchema::from_definitions([("friend", "counter"), ("friend", "score")])
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName("friend".into()));
    }

    #[test]
    fn empty_name_rejected() {
        let err =
            RelationshipSchema::from_definitions([("friend", "counter"), ("", "counter")]).unwrap_err();
        assert_eq!(err, SchemaError::EmptyName(1));
    }

    #[test]
    fn unknown_kind_rejected() {
        let err = RelationshipSchema::from_definitions([("friend", "gauge")]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownKind("gauge".into()));
    }

    #[test]
    fn too_many_definitions_rejected() {
        let defs: Vec<(String, &str)> = (0..=MAX_RELATIONSHIPS)
            .map(|i| (format!("rel{i}"), "counter"))
            .collect();
        let err = RelationshipSchema::from_definitions(defs).unwrap_err();
        assert_eq!(err, SchemaError::TooMany(MAX_RELATIONSHIPS + 1));
    }

    #[test]
    fn empty_schema_is_allowed() {
        let s = RelationshipSchema::from_definitions(Vec::<(String, String)>::new()).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }
}
