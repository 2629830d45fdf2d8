//! Shared helpers for the Tomolink conformance test suite.
//!
//! Provides [`spawn_node`], which binds a `TcpListener` on an ephemeral
//! port, wires up an in-process node backed by `MemoryStorage`, and returns
//! both the local URL and the underlying storage so tests can inspect state
//! without going through the HTTP layer.

use std::sync::Arc;

use tomolink::RelationshipSchema;
use tomolink_node::{
    build_router,
    config::{NodeConfig, RelationshipDefinition},
    storage::memory::MemoryStorage,
    Storage,
};

/// Relationship definitions every conformance node starts with.
pub const DEFINITIONS: &[(&str, &str)] = &[
    ("friends", "counter"),
    ("influencers", "score"),
    ("lastcontact", "timestamp"),
];

/// Start an ephemeral strict-mode node and return `(base_url, storage)`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound or the node fails to start.
pub async fn spawn_node() -> (String, Arc<MemoryStorage>) {
    spawn_node_with(true).await
}

/// Like [`spawn_node`], choosing strict or permissive relationship checks.
pub async fn spawn_node_with(strict: bool) -> (String, Arc<MemoryStorage>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let mut config = NodeConfig::default();
    config.http.host = addr.ip().to_string();
    config.http.port = addr.port();
    config.relationships.strict = strict;
    config.relationships.definitions = DEFINITIONS
        .iter()
        .map(|(name, kind)| RelationshipDefinition {
            name: name.to_string(),
            kind: kind.to_string(),
        })
        .collect();
    let schema: RelationshipSchema = config.schema().expect("valid conformance schema");

    let mem_storage = Arc::new(MemoryStorage::new());
    let storage: Arc<dyn Storage> = Arc::clone(&mem_storage) as Arc<dyn Storage>;
    let router = build_router(storage, schema, &config).expect("build conformance router");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance node error");
    });

    (base_url, mem_storage)
}
