//! Projection of a validated request into store writes.
//!
//! [`plan`] is pure: it decides *what* to write. Executing the writes
//! atomically is the store's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::direction::DirectionMode;
use crate::schema::RelationshipKind;
use crate::types::{Operation, RelationshipRequest};

/// Location of one edge value inside a user document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    pub relationship: String,
    pub target: String,
}

impl FieldPath {
    pub fn new(relationship: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            relationship: relationship.into(),
            target: target.into(),
        }
    }
}

/// Formats the path in dotted form, e.g. `friend.bob`.
impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.relationship, self.target)
    }
}

/// What a single write does to its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    /// Overwrite the field with this value.
    Set(Value),
    /// Remove the field, leaving siblings untouched.
    DeleteField,
    /// Add to the field's integer value; an absent field counts as zero.
    Increment(i64),
}

/// One `(document, field path, operation)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWrite {
    pub document: String,
    pub path: FieldPath,
    pub op: WriteOp,
}

/// The writes for one request: one for single direction, two (mirrored)
/// for reciprocal. Must be submitted to the store as a single batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMutation {
    pub mode: DirectionMode,
    pub writes: Vec<FieldWrite>,
}

/// Build the store writes for `request`.
///
/// The caller must have already checked that `relationship`, `source` and
/// `target` are non-empty. `now` is the current Unix time in seconds and is
/// used only for timestamp relationships written with a zero `delta`.
pub fn plan(
    operation: Operation,
    request: &RelationshipRequest,
    mode: DirectionMode,
    kind: RelationshipKind,
    now: i64,
) -> StoreMutation {
    let op = match operation {
        Operation::Delete => WriteOp::DeleteField,
        Operation::Create | Operation::Update => match kind {
            RelationshipKind::Counter => WriteOp::Increment(request.delta),
            RelationshipKind::Score => WriteOp::Set(Value::from(request.delta)),
            RelationshipKind::Timestamp if request.delta == 0 => WriteOp::Set(Value::from(now)),
            RelationshipKind::Timestamp => WriteOp::Set(Value::from(request.delta)),
        },
    };

    let forward = FieldWrite {
        document: request.source.clone(),
        path: FieldPath::new(&request.relationship, &request.target),
        op: op.clone(),
    };

    let mut writes = vec![forward];
    // A self-relationship's mirror is the same field; writing it twice
    // would double-count an increment.
    if mode == DirectionMode::Reciprocal && request.source != request.target {
        writes.push(FieldWrite {
            document: request.target.clone(),
            path: FieldPath::new(&request.relationship, &request.source),
            op,
        });
    }

    StoreMutation { mode, writes }
}
