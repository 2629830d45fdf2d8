//! In-memory storage implementation.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Use this for tests, the conformance suite, and ephemeral nodes.
//!
//! A batch is staged on copies of the documents it touches and published
//! under a single write lock only once every write has applied, so readers
//! never see half of a reciprocal pair.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tomolink::{Document, FieldPath, FieldWrite};

use super::{Storage, StorageError};

/// Thread-safe, in-memory implementation of [`Storage`].
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, document: &str) -> Result<Option<Document>, StorageError> {
        let documents = self.documents.read().unwrap_or_else(|p| p.into_inner());
        Ok(documents.get(document).cloned())
    }

    async fn get_field(
        &self,
        document: &str,
        path: &FieldPath,
    ) -> Result<Option<Value>, StorageError> {
        let documents = self.documents.read().unwrap_or_else(|p| p.into_inner());
        Ok(documents
            .get(document)
            .and_then(|doc| doc.field(path))
            .cloned())
    }

    async fn batch_write(&self, writes: &[FieldWrite]) -> Result<(), StorageError> {
        let mut documents = self.documents.write().unwrap_or_else(|p| p.into_inner());

        let mut staged: HashMap<&str, Document> = HashMap::new();
        for write in writes {
            let doc = staged
                .entry(write.document.as_str())
                .or_insert_with(|| documents.get(&write.document).cloned().unwrap_or_default());
            doc.apply(&write.path, &write.op)?;
        }

        for (id, doc) in staged {
            if doc.is_empty() {
                documents.remove(id);
            } else {
                documents.insert(id.to_string(), doc);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tomolink::WriteOp;

    fn write(document: &str, relationship: &str, target: &str, op: WriteOp) -> FieldWrite {
        FieldWrite {
            document: document.into(),
            path: FieldPath::new(relationship, target),
            op,
        }
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let s = MemoryStorage::new();
        assert!(s.get("alice").await.unwrap().is_none());
        assert!(s
            .get_field("alice", &FieldPath::new("friend", "bob"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn increment_from_absent_and_existing() {
        let s = MemoryStorage::new();
        let inc = write("alice", "friend", "bob", WriteOp::Increment(2));
        s.batch_write(&[inc.clone()]).await.unwrap();
        s.batch_write(&[inc]).await.unwrap();
        let v = s.get_field("alice", &FieldPath::new("friend", "bob")).await.unwrap();
        assert_eq!(v, Some(json!(4)));
    }

    #[tokio::test]
    async fn batch_is_all_or_nothing() {
        let s = MemoryStorage::new();
        s.batch_write(&[write("bob", "friend", "alice", WriteOp::Set(json!("x")))])
            .await
            .unwrap();

        // Second write fails: bob.friend.alice is not an integer.
        let err = s
            .batch_write(&[
                write("alice", "friend", "bob", WriteOp::Increment(1)),
                write("bob", "friend", "alice", WriteOp::Increment(1)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidValue(_)));

        assert!(s.get("alice").await.unwrap().is_none());
        assert_eq!(
            s.get_field("bob", &FieldPath::new("friend", "alice")).await.unwrap(),
            Some(json!("x"))
        );
    }

    #[tokio::test]
    async fn delete_field_keeps_siblings() {
        let s = MemoryStorage::new();
        s.batch_write(&[
            write("alice", "friend", "bob", WriteOp::Increment(1)),
            write("alice", "friend", "carol", WriteOp::Increment(1)),
        ])
        .await
        .unwrap();
        s.batch_write(&[write("alice", "friend", "bob", WriteOp::DeleteField)])
            .await
            .unwrap();

        let doc = s.get("alice").await.unwrap().unwrap();
        let edges = doc.relationship("friend").unwrap();
        assert!(!edges.contains_key("bob"));
        assert_eq!(edges.get("carol"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn deleting_last_edge_removes_document() {
        let s = MemoryStorage::new();
        s.batch_write(&[write("alice", "friend", "bob", WriteOp::Increment(1))])
            .await
            .unwrap();
        s.batch_write(&[write("alice", "friend", "bob", WriteOp::DeleteField)])
            .await
            .unwrap();
        assert!(s.get("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_document_twice_in_one_batch() {
        let s = MemoryStorage::new();
        s.batch_write(&[
            write("alice", "friend", "alice", WriteOp::Increment(1)),
            write("alice", "friend", "alice", WriteOp::Increment(1)),
        ])
        .await
        .unwrap();
        assert_eq!(
            s.get_field("alice", &FieldPath::new("friend", "alice")).await.unwrap(),
            Some(json!(2))
        );
    }
}
