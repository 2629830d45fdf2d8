//! Request checks run before any store call: the strict relationship gate
//! and the completeness check for mutations.

use thiserror::Error;

use crate::schema::RelationshipSchema;
use crate::types::{Field, RelationshipRequest};

/// Errors returned when a reconciled [`RelationshipRequest`] is not
/// acceptable for the operation being performed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("relationship {0:?} is not defined on this server")]
    UnknownRelationship(String),

    #[error("{0} must not be empty")]
    MissingParameter(Field),
}

/// Strict-mode gate.
///
/// With `strict` off this always passes. With `strict` on, the request's
/// relationship name must be declared in `schema`. An empty name is
/// reported as a missing parameter.
pub fn check_strict(
    schema: &RelationshipSchema,
    strict: bool,
    request: &RelationshipRequest,
) -> Result<(), ValidationError> {
    if !strict || schema.contains(&request.relationship) {
        return Ok(());
    }
    if request.relationship.is_empty() {
        return Err(ValidationError::MissingParameter(Field::Relationship));
    }
    Err(ValidationError::UnknownRelationship(
        request.relationship.clone(),
    ))
}

/// Require the fields every mutation needs: relationship, source and target.
///
/// Errors are returned in that field order.
pub fn require_complete(request: &RelationshipRequest) -> Result<(), ValidationError> {
    let required = [
        (Field::Relationship, &request.relationship),
        (Field::Source, &request.source),
        (Field::Target, &request.target),
    ];
    for (field, value) in required {
        if value.is_empty() {
            return Err(ValidationError::MissingParameter(field));
        }
    }
    Ok(())
}

// --- tests -------------------------------------------------------------------
