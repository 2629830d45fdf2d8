//! Mutation handlers.
//!
//! - `POST   /createRelationship`
//! - `POST   /updateRelationship`
//! - `DELETE /deleteRelationship`
//!
//! All parameters come from the JSON body. Each returns a
//! [`MutationResponse`] describing the batch that was written.

use axum::{extract::State, Extension, Json};
use tomolink::{Operation, RelationshipRequest};
use tomolink_api::MutationResponse;

use crate::error::AppError;

use super::AppState;

async fn mutate(
    state: AppState,
    operation: Operation,
    request: RelationshipRequest,
) -> Result<Json<MutationResponse>, AppError> {
    let response = state.engine.apply(operation, request).await?;
    tracing::info!(
        %operation,
        direction = %response.direction,
        writes = response.writes.len(),
        "relationship mutated"
    );
    Ok(Json(response))
}

pub async fn create_relationship(
    State(state): State<AppState>,
    Extension(request): Extension<RelationshipRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(state, Operation::Create, request).await
}

pub async fn update_relationship(
    State(state): State<AppState>,
    Extension(request): Extension<RelationshipRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(state, Operation::Update, request).await
}

pub async fn delete_relationship(
    State(state): State<AppState>,
    Extension(request): Extension<RelationshipRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(state, Operation::Delete, request).await
}
