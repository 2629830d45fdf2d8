//! Mutation engine: turns a reconciled request into one atomic store batch.

use std::sync::Arc;

use thiserror::Error;
use tomolink::{
    direction, plan, require_complete, InvalidDirectionError, Operation, RelationshipKind,
    RelationshipRequest, RelationshipSchema, ValidationError,
};
use tomolink_api::MutationResponse;

use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Direction(#[from] InvalidDirectionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Applies create, update and delete requests to the store.
#[derive(Clone)]
pub struct MutationEngine {
    storage: Arc<dyn Storage>,
    schema: Arc<RelationshipSchema>,
}

impl MutationEngine {
    pub fn new(storage: Arc<dyn Storage>, schema: Arc<RelationshipSchema>) -> Self {
        Self { storage, schema }
    }

    /// Apply `request` using the server clock for zero-delta timestamps.
    pub async fn apply(
        &self,
        operation: Operation,
        request: RelationshipRequest,
    ) -> Result<MutationResponse, EngineError> {
        self.apply_at(operation, request, chrono::Utc::now().timestamp())
            .await
    }

    /// Apply `request` with `now` (Unix seconds) as the current time.
    ///
    /// Validation and direction errors are returned before the store is
    /// touched. The planned writes go to the store in exactly one
    /// `batch_write` call.
    #[tracing::instrument(
        skip(self, request),
        fields(
            relationship = %request.relationship,
            source = %request.source,
            target = %request.target,
        )
    )]
    pub async fn apply_at(
        &self,
        operation: Operation,
        request: RelationshipRequest,
        now: i64,
    ) -> Result<MutationResponse, EngineError> {
        require_complete(&request)?;
        let mode = direction::resolve(&request.direction)?;
        // Only reachable for unlisted names when strict mode is off.
        let kind = self
            .schema
            .kind_of(&request.relationship)
            .unwrap_or(RelationshipKind::Counter);

        let mutation = plan(operation, &request, mode, kind, now);
        tracing::debug!(mode = %mutation.mode, %kind, writes = mutation.writes.len(), "submitting batch");
        self.storage.batch_write(&mutation.writes).await?;

        Ok(MutationResponse {
            operation,
            direction: mutation.mode,
            request,
            writes: mutation.writes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::RecordingStorage;
    use serde_json::json;
    use tomolink::{DirectionMode, FieldPath, Field, WriteOp};

    fn schema() -> Arc<RelationshipSchema> {
        Arc::new(
            RelationshipSchema::from_definitions([
                ("friend", "counter"),
                ("lastseen", "timestamp"),
                ("rating", "score"),
            ])
            .unwrap(),
        )
    }

    fn engine() -> (Arc<RecordingStorage>, MutationEngine) {
        let storage = Arc::new(RecordingStorage::new());
        let engine = MutationEngine::new(storage.clone(), schema());
        (storage, engine)
    }

    fn request(relationship: &str, direction: &str, delta: i64) -> RelationshipRequest {
        RelationshipRequest {
            direction: direction.into(),
            relationship: relationship.into(),
            delta,
            source: "alice".into(),
            target: "bob".into(),
        }
    }

    #[tokio::test]
    async fn reciprocal_create_is_one_batch_of_two() {
        let (storage, engine) = engine();
        let resp = engine
            .apply_at(Operation::Create, request("friend", "mutual", 1), 0)
            .await
            .unwrap();

        assert_eq!(resp.direction, DirectionMode::Reciprocal);
        assert_eq!(storage.batch_count(), 1);
        let batch = &storage.batches()[0];
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].document, "alice");
        assert_eq!(batch[0].path, FieldPath::new("friend", "bob"));
        assert_eq!(batch[1].document, "bob");
        assert_eq!(batch[1].path, FieldPath::new("friend", "alice"));

        assert_eq!(
            storage.get_field("bob", &FieldPath::new("friend", "alice")).await.unwrap(),
            Some(json!(1))
        );
    }

    #[tokio::test]
    async fn failed_batch_leaves_both_sides_untouched() {
        let (storage, engine) = engine();
        storage.fail_writes();
        let err = engine
            .apply_at(Operation::Create, request("friend", "bi", 1), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));
        assert_eq!(storage.batch_count(), 1);
        assert!(storage.get("alice").await.unwrap().is_none());
        assert!(storage.get("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_direction_never_reaches_the_store() {
        let (storage, engine) = engine();
        let err = engine
            .apply_at(Operation::Create, request("friend", "both", 1), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Direction(_)));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_target_never_reaches_the_store() {
        let (storage, engine) = engine();
        let mut req = request("friend", "", 1);
        req.target.clear();
        let err = engine.apply_at(Operation::Update, req, 0).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::MissingParameter(Field::Target))
        ));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn timestamp_with_zero_delta_uses_now() {
        let (storage, engine) = engine();
        engine
            .apply_at(Operation::Create, request("lastseen", "", 0), 1_700_000_000)
            .await
            .unwrap();
        assert_eq!(
            storage.get_field("alice", &FieldPath::new("lastseen", "bob")).await.unwrap(),
            Some(json!(1_700_000_000))
        );
    }

    #[tokio::test]
    async fn counter_create_with_zero_delta_is_idempotent() {
        let (storage, engine) = engine();
        engine
            .apply_at(Operation::Create, request("friend", "", 5), 0)
            .await
            .unwrap();
        for _ in 0..3 {
            engine
                .apply_at(Operation::Create, request("friend", "", 0), 0)
                .await
                .unwrap();
        }
        assert_eq!(
            storage.get_field("alice", &FieldPath::new("friend", "bob")).await.unwrap(),
            Some(json!(5))
        );
    }

    #[tokio::test]
    async fn unlisted_relationship_is_a_counter() {
        let (_storage, engine) = engine();
        let resp = engine
            .apply_at(Operation::Create, request("enemy", "", 2), 0)
            .await
            .unwrap();
        assert_eq!(resp.writes[0].op, WriteOp::Increment(2));
    }

    #[tokio::test]
    async fn single_delete_keeps_other_edges() {
        let (storage, engine) = engine();
        let mut carol = request("friend", "", 1);
        carol.target = "carol".into();
        engine.apply_at(Operation::Create, carol, 0).await.unwrap();
        engine
            .apply_at(Operation::Create, request("friend", "", 1), 0)
            .await
            .unwrap();

        engine
            .apply_at(Operation::Delete, request("friend", "single", 0), 0)
            .await
            .unwrap();

        let doc = storage.get("alice").await.unwrap().unwrap();
        let edges = doc.relationship("friend").unwrap();
        assert!(!edges.contains_key("bob"));
        assert_eq!(edges.get("carol"), Some(&json!(1)));
    }
}
