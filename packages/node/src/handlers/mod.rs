//! HTTP request handlers for the Tomolink endpoints.
//!
//! Handlers receive the canonical [`tomolink::RelationshipRequest`] that
//! [`crate::middleware::params::normalize_params`] placed in the request
//! extensions, and return `Result<impl IntoResponse, AppError>`.

pub mod mutations;
pub mod relationships;

use std::sync::Arc;

use axum::http::Uri;

use crate::{engine::MutationEngine, error::AppError, storage::Storage};

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub engine: MutationEngine,
}

/// JSON 404 for paths outside the route table.
pub async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router construction and request helpers shared by handler tests.

    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tomolink::RelationshipSchema;
    use tower::ServiceExt;

    use crate::config::NodeConfig;
    use crate::router::build_router;
    use crate::storage::testing::RecordingStorage;

    pub fn schema() -> RelationshipSchema {
        RelationshipSchema::from_definitions([
            ("friend", "counter"),
            ("lastseen", "timestamp"),
            ("rating", "score"),
        ])
        .unwrap()
    }

    pub fn app(strict: bool) -> (Arc<RecordingStorage>, Router) {
        let storage = Arc::new(RecordingStorage::new());
        let mut config = NodeConfig::default();
        config.relationships.strict = strict;
        let router = build_router(storage.clone(), schema(), &config).unwrap();
        (storage, router)
    }

    pub async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
