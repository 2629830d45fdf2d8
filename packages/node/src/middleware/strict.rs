//! Strict relationship gate.

use std::sync::Arc;

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use tomolink::{check_strict, RelationshipRequest, RelationshipSchema};

use crate::error::AppError;

#[derive(Clone)]
pub struct StrictGate {
    pub schema: Arc<RelationshipSchema>,
    pub strict: bool,
}

/// Reject requests naming a relationship outside the schema. Runs after
/// [`normalize_params`](super::params::normalize_params), so names from the
/// path and from the body are both covered.
pub async fn strict_relationships(
    State(gate): State<StrictGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let canonical = request
        .extensions()
        .get::<RelationshipRequest>()
        .ok_or_else(|| AppError::Internal("relationship parameters were not normalized".into()))?;
    check_strict(&gate.schema, gate.strict, canonical)?;
    Ok(next.run(request).await)
}
