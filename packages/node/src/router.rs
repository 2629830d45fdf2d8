//! Assembles the Axum [`Router`] from the compiled route table.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tomolink::{
    routes::{Method, RouteSpec},
    RelationshipSchema, RouteError, RouteName, RouteTable,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    config::NodeConfig,
    engine::MutationEngine,
    handlers::{self, mutations, relationships, AppState},
    middleware::{
        constraint::relationship_constraint,
        params::normalize_params,
        strict::{strict_relationships, StrictGate},
    },
    storage::Storage,
};

/// Build the complete application router with shared state.
///
/// Fails when strict mode is on and `schema` is empty.
pub fn build_router(
    storage: Arc<dyn Storage>,
    schema: RelationshipSchema,
    config: &NodeConfig,
) -> Result<Router, RouteError> {
    let strict = config.relationships.strict;
    let table = RouteTable::compile(&schema, strict)?;

    let schema = Arc::new(schema);
    let state = AppState {
        engine: MutationEngine::new(Arc::clone(&storage), Arc::clone(&schema)),
        storage,
    };
    let gate = StrictGate { schema, strict };
    let body_limit = config.http.bodylimit;

    let mut router = Router::new();
    for spec in &table.routes {
        tracing::info!(
            route = %spec.name,
            method = %spec.method,
            path = %spec.path,
            constrained = spec.relationship_pattern.is_some(),
            "registering route"
        );

        // MethodRouter::route_layer only wraps matched methods, so a wrong
        // method still reaches the 405 fallback untouched. The last layer
        // added runs first.
        let mut method_router = endpoint(spec);
        if spec.strict {
            method_router =
                method_router.route_layer(from_fn_with_state(gate.clone(), strict_relationships));
        }
        method_router = method_router.route_layer(from_fn_with_state(body_limit, normalize_params));
        if let Some(pattern) = &spec.relationship_pattern {
            method_router = method_router.route_layer(from_fn_with_state(
                Arc::new(pattern.clone()),
                relationship_constraint,
            ));
        }
        router = router.route(&spec.path, method_router);
    }

    Ok(router
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http()))
}

fn endpoint(spec: &RouteSpec) -> MethodRouter<AppState> {
    let filter = match spec.method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Delete => MethodFilter::DELETE,
    };
    match spec.name {
        RouteName::RetrieveUser => on(filter, relationships::retrieve_user),
        RouteName::RetrieveRelationship => on(filter, relationships::retrieve_relationship),
        RouteName::RetrieveEdge => on(filter, relationships::retrieve_edge),
        RouteName::CreateRelationship => on(filter, mutations::create_relationship),
        RouteName::UpdateRelationship => on(filter, mutations::update_relationship),
        RouteName::DeleteRelationship => on(filter, mutations::delete_relationship),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn strict_with_no_definitions_fails_to_build() {
        let config = NodeConfig::default();
        let err = build_router(
            Arc::new(MemoryStorage::new()),
            RelationshipSchema::default(),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::EmptySchema));
    }

    #[test]
    fn non_strict_with_no_definitions_builds() {
        let mut config = NodeConfig::default();
        config.relationships.strict = false;
        assert!(build_router(
            Arc::new(MemoryStorage::new()),
            RelationshipSchema::default(),
            &config,
        )
        .is_ok());
    }
}
