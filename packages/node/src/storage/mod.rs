//! Storage abstraction layer for the Tomolink node.
//!
//! The [`Storage`] trait is the contract between the HTTP layer and
//! persistence: read one user document or one field, and apply a batch of
//! field writes atomically. Deciding *which* writes to make is the mutation
//! engine's job; storage only executes them.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStorage`] | Tests, conformance suite, ephemeral nodes |
//! | [`SqliteStorage`] | Production; durable single-file database |
//!
//! [`MemoryStorage`]: memory::MemoryStorage
//! [`SqliteStorage`]: sqlite::SqliteStorage

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;
use tomolink::{ApplyError, Document, FieldPath, FieldWrite};

/// Errors that storage operations can return.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A write could not be applied to the stored value, e.g. incrementing
    /// a field that does not hold an integer. The batch was not applied.
    #[error("invalid stored value: {0}")]
    InvalidValue(#[from] ApplyError),

    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

/// The persistence contract for a Tomolink node.
///
/// Implementations must be `Send + Sync + 'static` so they can be held in an
/// `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Every relationship of one user. `None` if the user has no edges.
    async fn get(&self, document: &str) -> Result<Option<Document>, StorageError>;

    /// One edge value. `None` if the field is not set.
    async fn get_field(
        &self,
        document: &str,
        path: &FieldPath,
    ) -> Result<Option<Value>, StorageError>;

    /// Apply every write in `writes`, in order, as one atomic unit: either
    /// all of them are visible afterwards or none are.
    async fn batch_write(&self, writes: &[FieldWrite]) -> Result<(), StorageError>;
}
