//! SQLite-backed storage implementation.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! One row per edge: `(document, relationship, target)` is the key and
//! `value` holds the JSON-encoded field value. A user document is the set
//! of rows sharing `document`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde_json::Value;
use tomolink::{document::incremented, Document, FieldPath, FieldWrite, WriteOp};

use super::{Storage, StorageError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS relationships (
    document     TEXT NOT NULL,
    relationship TEXT NOT NULL,
    target       TEXT NOT NULL,
    value        TEXT NOT NULL,
    PRIMARY KEY (document, relationship, target)
);
";

/// SQLite-backed implementation of [`Storage`].
///
/// Holds a single database connection protected by a `Mutex`. Each
/// `batch_write` runs inside one transaction.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(|p| p.into_inner());
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Internal(format!("storage task failed: {e}")))?
    }
}

fn map_err(e: rusqlite::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

fn map_json_err(e: serde_json::Error) -> StorageError {
    StorageError::Internal(format!("JSON error: {e}"))
}

fn read_field(conn: &Connection, document: &str, path: &FieldPath) -> Result<Option<Value>, StorageError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM relationships
             WHERE document = ?1 AND relationship = ?2 AND target = ?3",
            params![document, path.relationship, path.target],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_err)?;
    raw.map(|s| serde_json::from_str(&s).map_err(map_json_err))
        .transpose()
}

fn apply_write(tx: &Transaction<'_>, write: &FieldWrite) -> Result<(), StorageError> {
    let path = &write.path;
    let value = match &write.op {
        WriteOp::DeleteField => {
            tx.execute(
                "DELETE FROM relationships
                 WHERE document = ?1 AND relationship = ?2 AND target = ?3",
                params![write.document, path.relationship, path.target],
            )
            .map_err(map_err)?;
            return Ok(());
        }
        WriteOp::Set(value) => value.clone(),
        WriteOp::Increment(delta) => {
            let current = read_field(tx, &write.document, path)?;
            incremented(path, current.as_ref(), *delta)?
        }
    };
    let encoded = serde_json::to_string(&value).map_err(map_json_err)?;
    tx.execute(
        "INSERT INTO relationships (document, relationship, target, value)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (document, relationship, target) DO UPDATE SET value = excluded.value",
        params![write.document, path.relationship, path.target, encoded],
    )
    .map_err(map_err)?;
    Ok(())
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, document: &str) -> Result<Option<Document>, StorageError> {
        let document = document.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT relationship, target, value FROM relationships
                     WHERE document = ?1 ORDER BY relationship, target",
                )
                .map_err(map_err)?;
            let rows = stmt
                .query_map(params![document], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(map_err)?;

            let mut doc = Document::new();
            for row in rows {
                let (relationship, target, raw) = row.map_err(map_err)?;
                let value: Value = serde_json::from_str(&raw).map_err(map_json_err)?;
                doc.insert(&FieldPath::new(relationship, target), value);
            }
            Ok((!doc.is_empty()).then_some(doc))
        })
        .await
    }

    async fn get_field(
        &self,
        document: &str,
        path: &FieldPath,
    ) -> Result<Option<Value>, StorageError> {
        let document = document.to_string();
        let path = path.clone();
        self.blocking(move |conn| read_field(conn, &document, &path))
            .await
    }

    async fn batch_write(&self, writes: &[FieldWrite]) -> Result<(), StorageError> {
        let writes = writes.to_vec();
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(map_err)?;
            for write in &writes {
                apply_write(&tx, write)?;
            }
            // Dropping an uncommitted transaction rolls it back.
            tx.commit().map_err(map_err)
        })
        .await
    }
}
