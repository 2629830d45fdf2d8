//! Relationship request bodies and mutation responses.
//!
//! The JSON body of every endpoint may carry any subset of the relationship
//! parameters; whatever it leaves out may come from the URL path instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tomolink::{reconcile, ConflictError, DirectionMode, FieldWrite, Operation, RelationshipRequest};

/// Decoded JSON request body.
///
/// ```json
/// { "direction": "mutual", "relationship": "friend", "delta": 1,
///   "uuidsource": "alice", "uuidtarget": "bob" }
/// ```
///
/// The user pair may instead be given as `"uuids": ["alice", "bob"]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RelationshipBody {
    #[serde(default)]
    pub direction: String,

    #[serde(default)]
    pub relationship: String,

    #[serde(default)]
    pub delta: i64,

    #[serde(default)]
    pub uuidsource: String,

    #[serde(default)]
    pub uuidtarget: String,

    /// `[source, target]`; alternative to the two fields above.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuids: Option<Vec<String>>,
}

/// The request body could not be turned into relationship parameters.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("uuids must contain exactly two identifiers, got {0}")]
    UuidCount(usize),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl RelationshipBody {
    /// Decode a raw request body. An empty or whitespace-only body is an
    /// all-empty parameter set, not an error.
    pub fn parse(bytes: &[u8]) -> Result<Self, BodyError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Convert to a partially populated [`RelationshipRequest`].
    ///
    /// A `uuids` pair is reconciled against `uuidsource`/`uuidtarget` with
    /// the same rules used between the URL and the body.
    pub fn into_request(self) -> Result<RelationshipRequest, BodyError> {
        let explicit = RelationshipRequest {
            direction: self.direction,
            relationship: self.relationship,
            delta: self.delta,
            source: self.uuidsource,
            target: self.uuidtarget,
        };
        match self.uuids {
            None => Ok(explicit),
            Some(uuids) => {
                let [source, target]: [String; 2] = uuids
                    .try_into()
                    .map_err(|v: Vec<String>| BodyError::UuidCount(v.len()))?;
                let pair = RelationshipRequest {
                    source,
                    target,
                    ..Default::default()
                };
                Ok(reconcile(explicit, pair)?)
            }
        }
    }
}

/// Response body for `POST /createRelationship`, `POST /updateRelationship`
/// and `DELETE /deleteRelationship`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationResponse {
    pub operation: Operation,

    /// The resolved direction mode.
    pub direction: DirectionMode,

    /// The canonical request after reconciliation.
    pub request: RelationshipRequest,

    /// The writes submitted to the store, in batch order.
    pub writes: Vec<FieldWrite>,
}
