//! Path constraint for the `{relationship}` segment.
//!
//! With strict mode on, a relationship outside the schema is not a route at
//! all: the request gets 404 before its body is read.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use regex::Regex;
use tomolink::routes::RELATIONSHIP_PARAM;

use crate::error::AppError;

pub async fn relationship_constraint(
    State(pattern): State<Arc<Regex>>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let relationship = params
        .get(RELATIONSHIP_PARAM)
        .map(String::as_str)
        .unwrap_or_default();
    if !pattern.is_match(relationship) {
        return Err(AppError::NotFound(format!(
            "no route for {}",
            request.uri().path()
        )));
    }
    Ok(next.run(request).await)
}
