//! Standard error response body.

use serde::{Deserialize, Serialize};

/// The JSON body returned for all error responses.
///
/// ```json
/// { "error": "relationship \"enemy\" is not defined on this server", "code": "unknown_relationship" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `conflicting_parameters` | 400 |
    /// | `unknown_relationship` | 400 |
    /// | `invalid_direction` | 400 |
    /// | `missing_parameter` | 400 |
    /// | `invalid_json` | 400 |
    /// | `not_found` | 404 |
    /// | `unsupported_media_type` | 415 |
    /// | `store_error` | 500 |
    /// | `internal_error` | 500 |
    pub code: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a static code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

/// Well-known error codes.
pub mod codes {
    pub const CONFLICTING_PARAMETERS: &str = "conflicting_parameters";
    pub const UNKNOWN_RELATIONSHIP: &str = "unknown_relationship";
    pub const INVALID_DIRECTION: &str = "invalid_direction";
    pub const MISSING_PARAMETER: &str = "missing_parameter";
    pub const INVALID_JSON: &str = "invalid_json";
    pub const NOT_FOUND: &str = "not_found";
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "unsupported_media_type";
    pub const STORE_ERROR: &str = "store_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_shape() {
        let e = ErrorResponse::new(codes::INVALID_DIRECTION, "invalid relationship direction \"both\"");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "invalid_direction");
        assert!(json["error"].as_str().unwrap().contains("both"));
    }
}
