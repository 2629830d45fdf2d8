//! Request parameter normalization.
//!
//! Builds the canonical [`RelationshipRequest`] for every route from the path
//! parameters and the JSON body, and stores it in the request extensions
//! for the strict gate and the handler.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, FromRequestParts, Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tomolink::{
    reconcile,
    routes::{RELATIONSHIP_PARAM, SOURCE_PARAM, TARGET_PARAM},
    RelationshipRequest,
};
use tomolink_api::RelationshipBody;

use crate::error::AppError;

/// Reconcile path and body parameters.
///
/// Rejects a non-JSON `Content-Type` with 415 before reading the body. The
/// body is read once, up to `body_limit` bytes.
pub async fn normalize_params(
    State(body_limit): State<usize>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    check_content_type(request.headers())?;

    let (mut parts, body) = request.into_parts();
    let url = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await {
        Ok(Path(params)) => from_path(params),
        Err(PathRejection::MissingPathParams(_)) => RelationshipRequest::default(),
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let bytes = axum::body::to_bytes(body, body_limit)
        .await
        .map_err(|e| AppError::InvalidJson(format!("failed to read request body: {e}")))?;
    let from_body = RelationshipBody::parse(&bytes)?.into_request()?;

    let canonical = reconcile(url, from_body)?;
    tracing::debug!(
        relationship = %canonical.relationship,
        source = %canonical.source,
        target = %canonical.target,
        direction = %canonical.direction,
        delta = canonical.delta,
        "parameters reconciled"
    );

    parts.extensions.insert(canonical);
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn from_path(mut params: HashMap<String, String>) -> RelationshipRequest {
    let mut take = |name: &str| params.remove(name).unwrap_or_default();
    RelationshipRequest {
        source: take(SOURCE_PARAM),
        relationship: take(RELATIONSHIP_PARAM),
        target: take(TARGET_PARAM),
        ..Default::default()
    }
}

fn check_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };
    let mime = value
        .to_str()
        .unwrap_or_default()
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if mime == "application/json" {
        Ok(())
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "expected Content-Type application/json, got {mime:?}"
        )))
    }
}
