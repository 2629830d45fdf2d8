//! Application-level error type returned by middleware and handlers.
//!
//! All variants serialise to the [`ErrorResponse`] JSON format and map to
//! the appropriate HTTP status code. Each error is logged once, here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tomolink::{ConflictError, InvalidDirectionError, ValidationError};
use tomolink_api::{codes, BodyError, ErrorResponse};

use crate::engine::EngineError;
use crate::storage::StorageError;

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    Conflict(String),
    UnknownRelationship(String),
    InvalidDirection(String),
    MissingParameter(String),
    InvalidJson(String),
    UnsupportedMediaType(String),
    NotFound(String),
    Store(String),
    Internal(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, codes::CONFLICTING_PARAMETERS, msg),
            AppError::UnknownRelationship(msg) => {
                (StatusCode::BAD_REQUEST, codes::UNKNOWN_RELATIONSHIP, msg)
            }
            AppError::InvalidDirection(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_DIRECTION, msg),
            AppError::MissingParameter(msg) => (StatusCode::BAD_REQUEST, codes::MISSING_PARAMETER, msg),
            AppError::InvalidJson(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_JSON, msg),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                codes::UNSUPPORTED_MEDIA_TYPE,
                msg,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, codes::NOT_FOUND, msg),
            AppError::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, codes::STORE_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, "{message}");
        } else {
            tracing::warn!(status = status.as_u16(), code, "{message}");
        }
        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}

impl From<ConflictError> for AppError {
    fn from(e: ConflictError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl From<InvalidDirectionError> for AppError {
    fn from(e: InvalidDirectionError) -> Self {
        AppError::InvalidDirection(e.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::UnknownRelationship(_) => AppError::UnknownRelationship(e.to_string()),
            ValidationError::MissingParameter(_) => AppError::MissingParameter(e.to_string()),
        }
    }
}

impl From<BodyError> for AppError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::Conflict(c) => c.into(),
            BodyError::Json(_) | BodyError::UuidCount(_) => AppError::InvalidJson(e.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Store(e.to_string())
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(v) => v.into(),
            EngineError::Direction(d) => d.into(),
            EngineError::Storage(s) => s.into(),
        }
    }
}
