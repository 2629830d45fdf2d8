//! Merging URL-sourced and body-sourced parameters into one request.
//!
//! Clients may name a parameter in the path, in the JSON body, or in both.
//! Both is accepted only when the two values agree; two different non-empty
//! values for the same field are a [`ConflictError`]. Guessing which one the
//! client meant could overwrite or delete the wrong edge.

use thiserror::Error;

use crate::types::{Field, RelationshipRequest};

/// Two input sources supplied different non-empty values for one field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("conflicting values for {field}: {first:?} and {second:?}; supply it only once")]
pub struct ConflictError {
    pub field: Field,
    pub first: String,
    pub second: String,
}

/// Merge two partially populated requests field by field.
///
/// For each field: empty in both → empty; non-empty in exactly one → that
/// value; equal non-empty values → that value; different non-empty values →
/// [`ConflictError`] naming the field. Pure; performs no I/O.
pub fn reconcile(
    url: RelationshipRequest,
    body: RelationshipRequest,
) -> Result<RelationshipRequest, ConflictError> {
    // Full destructuring: a new field without a merge rule does not compile.
    let RelationshipRequest {
        direction: url_direction,
        relationship: url_relationship,
        delta: url_delta,
        source: url_source,
        target: url_target,
    } = url;
    let RelationshipRequest {
        direction: body_direction,
        relationship: body_relationship,
        delta: body_delta,
        source: body_source,
        target: body_target,
    } = body;

    Ok(RelationshipRequest {
        direction: merge_text(Field::Direction, url_direction, body_direction)?,
        relationship: merge_text(Field::Relationship, url_relationship, body_relationship)?,
        delta: merge_number(Field::Delta, url_delta, body_delta)?,
        source: merge_text(Field::Source, url_source, body_source)?,
        target: merge_text(Field::Target, url_target, body_target)?,
    })
}

fn merge_text(field: Field, first: String, second: String) -> Result<String, ConflictError> {
    if first.is_empty() {
        return Ok(second);
    }
    if second.is_empty() || first == second {
        return Ok(first);
    }
    Err(ConflictError {
        field,
        first,
        second,
    })
}

fn merge_number(field: Field, first: i64, second: i64) -> Result<i64, ConflictError> {
    match (first, second) {
        (0, v) | (v, 0) => Ok(v),
        (a, b) if a == b => Ok(a),
        (a, b) => Err(ConflictError {
            field,
            first: a.to_string(),
            second: b.to_string(),
        }),
    }
}
