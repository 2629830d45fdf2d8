//! Request and response types for the Tomolink HTTP API.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/users/{source}` | → [`tomolink::Document`] |
//! | GET | `/users/{source}/{relationship}` | → [`tomolink::Edges`] |
//! | GET | `/users/{source}/{relationship}/{target}` | → JSON scalar |
//! | POST | `/createRelationship` | [`RelationshipBody`] → [`MutationResponse`] |
//! | POST | `/updateRelationship` | [`RelationshipBody`] → [`MutationResponse`] |
//! | DELETE | `/deleteRelationship` | [`RelationshipBody`] → [`MutationResponse`] |
//!
//! Every error response uses [`ErrorResponse`].

pub mod error;
pub mod relationship;

pub use error::{codes, ErrorResponse};
pub use relationship::{BodyError, MutationResponse, RelationshipBody};
