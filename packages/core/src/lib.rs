//! Core relationship model for Tomolink.
//!
//! This crate holds everything about relationships that does not touch the
//! network or a database: the configured vocabulary, merging of request
//! parameters, strict-mode validation, direction semantics, mutation
//! planning, the stored document shape, and route table compilation. The
//! `tomolink-node` server and the `tomolink-api` wire types build on it.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | [`RelationshipRequest`], [`Field`], [`Operation`] |
//! | [`schema`] | [`RelationshipSchema`] and [`RelationshipKind`] |
//! | [`reconcile`] | URL/body parameter merge via [`reconcile()`] |
//! | [`validation`] | Strict-mode gate and required-field checks |
//! | [`direction`] | Single vs. reciprocal via [`direction::resolve`] |
//! | [`mutation`] | Request → store writes via [`plan`] |
//! | [`document`] | Stored per-user [`Document`] and write application |
//! | [`routes`] | [`RouteTable::compile`] |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tomolink::{direction, plan, reconcile, Operation, RelationshipRequest, RelationshipSchema};
//!
//! let schema = RelationshipSchema::from_definitions([("friend", "counter")])?;
//! let url = RelationshipRequest { source: "alice".into(), ..Default::default() };
//! let body: RelationshipRequest = serde_json::from_str(
//!     r#"{"relationship":"friend","uuidtarget":"bob","delta":1,"direction":"mutual"}"#,
//! )?;
//! let request = reconcile(url, body)?;
//! let mode = direction::resolve(&request.direction)?;
//! let kind = schema.kind_of(&request.relationship).unwrap();
//! let mutation = plan(Operation::Create, &request, mode, kind, 0);
//! assert_eq!(mutation.writes.len(), 2);
//! ```

pub mod direction;
pub mod document;
pub mod mutation;
pub mod reconcile;
pub mod routes;
pub mod schema;
pub mod types;
pub mod validation;

pub use direction::{DirectionMode, InvalidDirectionError};
pub use document::{ApplyError, Document, Edges};
pub use mutation::{plan, FieldPath, FieldWrite, StoreMutation, WriteOp};
pub use reconcile::{reconcile, ConflictError};
pub use routes::{RouteError, RouteName, RouteSpec, RouteTable};
pub use schema::{RelationshipKind, RelationshipSchema, SchemaError, MAX_RELATIONSHIPS};
pub use types::{Field, Operation, RelationshipRequest};
pub use validation::{check_strict, require_complete, ValidationError};
