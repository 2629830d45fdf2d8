//! Retrieval handlers.
//!
//! - `GET /users/{source}`                          → the whole user document.
//! - `GET /users/{source}/{relationship}`           → all edges of one type.
//! - `GET /users/{source}/{relationship}/{target}`  → one edge value.
//!
//! A user with no edges, a relationship with no edges, and an unset edge
//! are all 404.

use axum::{extract::State, Extension, Json};
use serde_json::Value;
use tomolink::{Document, Edges, FieldPath, RelationshipRequest};

use crate::error::AppError;

use super::AppState;

pub async fn retrieve_user(
    State(state): State<AppState>,
    Extension(request): Extension<RelationshipRequest>,
) -> Result<Json<Document>, AppError> {
    let document = state
        .storage
        .get(&request.source)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} has no relationships", request.source)))?;
    Ok(Json(document))
}

pub async fn retrieve_relationship(
    State(state): State<AppState>,
    Extension(request): Extension<RelationshipRequest>,
) -> Result<Json<Edges>, AppError> {
    let edges = state
        .storage
        .get(&request.source)
        .await?
        .and_then(|doc| doc.relationship(&request.relationship).cloned())
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "user {} has no {} relationships",
                request.source, request.relationship
            ))
        })?;
    Ok(Json(edges))
}

pub async fn retrieve_edge(
    State(state): State<AppState>,
    Extension(request): Extension<RelationshipRequest>,
) -> Result<Json<Value>, AppError> {
    let path = FieldPath::new(&request.relationship, &request.target);
    let value = state
        .storage
        .get_field(&request.source, &path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} has no edge {path}", request.source)))?;
    Ok(Json(value))
}
