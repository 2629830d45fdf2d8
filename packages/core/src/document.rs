//! The stored shape of one user's relationships.
//!
//! A [`Document`] maps relationship name → (target user → value). Writes are
//! merge-style: applying a [`WriteOp`] touches exactly one field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::mutation::{FieldPath, WriteOp};

/// Edges of one relationship type: target user → value.
pub type Edges = BTreeMap<String, Value>;

/// A write could not be applied to the current field value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("cannot increment {0}: current value is not an integer")]
    NotAnInteger(String),

    #[error("incrementing {0} would overflow")]
    Overflow(String),
}

/// All relationships of one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    relationships: BTreeMap<String, Edges>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with no edges does not exist from the client's view.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// All edges of one relationship type, if any exist.
    pub fn relationship(&self, name: &str) -> Option<&Edges> {
        self.relationships.get(name)
    }

    /// The value at `path`, if set.
    pub fn field(&self, path: &FieldPath) -> Option<&Value> {
        self.relationships
            .get(&path.relationship)
            .and_then(|edges| edges.get(&path.target))
    }

    /// Overwrite the value at `path`.
    pub fn insert(&mut self, path: &FieldPath, value: Value) {
        self.relationships
            .entry(path.relationship.clone())
            .or_default()
            .insert(path.target.clone(), value);
    }

    /// Remove the value at `path`, dropping the relationship map once it is
    /// empty. Returns the removed value.
    pub fn remove(&mut self, path: &FieldPath) -> Option<Value> {
        let edges = self.relationships.get_mut(&path.relationship)?;
        let removed = edges.remove(&path.target);
        if edges.is_empty() {
            self.relationships.remove(&path.relationship);
        }
        removed
    }

    /// Apply one write. On error the document is unchanged.
    pub fn apply(&mut self, path: &FieldPath, op: &WriteOp) -> Result<(), ApplyError> {
        match op {
            WriteOp::Set(value) => self.insert(path, value.clone()),
            WriteOp::DeleteField => {
                self.remove(path);
            }
            WriteOp::Increment(delta) => {
                let next = incremented(path, self.field(path), *delta)?;
                self.insert(path, next);
            }
        }
        Ok(())
    }
}

/// The value a field holds after adding `delta` to `current`.
///
/// An absent field counts as zero.
pub fn incremented(path: &FieldPath, current: Option<&Value>, delta: i64) -> Result<Value, ApplyError> {
    let base = match current {
        None => 0,
        Some(v) => v
            .as_i64()
            .ok_or_else(|| ApplyError::NotAnInteger(path.to_string()))?,
    };
    base.checked_add(delta)
        .map(Value::from)
        .ok_or_else(|| ApplyError::Overflow(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(rel: &str, target: &str) -> FieldPath {
        FieldPath::new(rel, target)
    }

    #[test]
    fn increment_absent_field_starts_at_zero() {
        let mut d = Document::new();
        d.apply(&path("friend", "bob"), &WriteOp::Increment(3)).unwrap();
        assert_eq!(d.field(&path("friend", "bob")), Some(&json!(3)));
        d.apply(&path("friend", "bob"), &WriteOp::Increment(-1)).unwrap();
        assert_eq!(d.field(&path("friend", "bob")), Some(&json!(2)));
    }

    #[test]
    fn delete_preserves_siblings() {
        let mut d = Document::new();
        d.insert(&path("friend", "bob"), json!(1));
        d.insert(&path("friend", "carol"), json!(2));
        d.insert(&path("colleague", "bob"), json!(5));

        d.apply(&path("friend", "bob"), &WriteOp::DeleteField).unwrap();

        assert_eq!(d.field(&path("friend", "bob")), None);
        assert_eq!(d.field(&path("friend", "carol")), Some(&json!(2)));
        assert_eq!(d.field(&path("colleague", "bob")), Some(&json!(5)));
    }

    #[test]
    fn deleting_last_edge_drops_relationship() {
        let mut d = Document::new();
        d.insert(&path("friend", "bob"), json!(1));
        d.apply(&path("friend", "bob"), &WriteOp::DeleteField).unwrap();
        assert!(d.relationship("friend").is_none());
        assert!(d.is_empty());
    }

    #[test]
    fn delete_of_missing_field_is_a_no_op() {
        let mut d = Document::new();
        d.insert(&path("friend", "bob"), json!(1));
        d.apply(&path("friend", "zed"), &WriteOp::DeleteField).unwrap();
        d.apply(&path("enemy", "bob"), &WriteOp::DeleteField).unwrap();
        assert_eq!(d.field(&path("friend", "bob")), Some(&json!(1)));
    }

    #[test]
    fn increment_non_integer_fails_without_change() {
        let mut d = Document::new();
        d.insert(&path("friend", "bob"), json!("text"));
        let err = d
            .apply(&path("friend", "bob"), &WriteOp::Increment(1))
            .unwrap_err();
        assert_eq!(err, ApplyError::NotAnInteger("friend.bob".into()));
        assert_eq!(d.field(&path("friend", "bob")), Some(&json!("text")));
    }

    #[test]
    fn increment_overflow_detected() {
        let mut d = Document::new();
        d.insert(&path("friend", "bob"), json!(i64::MAX));
        assert!(matches!(
            d.apply(&path("friend", "bob"), &WriteOp::Increment(1)),
            Err(ApplyError::Overflow(_))
        ));
    }

    #[test]
    fn serialises_as_nested_map() {
        let mut d = Document::new();
        d.insert(&path("friend", "bob"), json!(1));
        assert_eq!(serde_json::to_value(&d).unwrap(), json!({"friend": {"bob": 1}}));
    }
}
