//! Error types for rosterlink-gw
//!
//! Every top-level handler reports its own failure through `ApiError`;
//! upstream client errors map onto gateway-side HTTP statuses (502/503/504)
//! so a caller can tell a gateway bug from an unreachable backing server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clients::{GraphqlError, RestError, SparqlError};
use crate::jsonld::ProjectionError;
use crate::transfer::{GraphqlTransferError, TransferError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., colliding identifiers or ambiguous references
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream server failed or answered garbage (502)
    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// Upstream server is not running (503)
    #[error("Upstream unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream server timed out (504)
    #[error("Upstream timeout: {0}")]
    GatewayTimeout(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// rosterlink-common error
    #[error("Common error: {0}")]
    Common(#[from] rosterlink_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg,
            ),
            ApiError::GatewayTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl From<SparqlError> for ApiError {
    fn from(e: SparqlError) -> Self {
        match e {
            SparqlError::Timeout => {
                ApiError::GatewayTimeout("Timeout while querying the triple store".to_string())
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<RestError> for ApiError {
    fn from(e: RestError) -> Self {
        match e {
            RestError::Timeout => ApiError::GatewayTimeout(
                "Timeout while talking to the destination store".to_string(),
            ),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<GraphqlError> for ApiError {
    fn from(e: GraphqlError) -> Self {
        match e {
            GraphqlError::Timeout => {
                ApiError::GatewayTimeout("Timeout while querying the GraphQL server".to_string())
            }
            GraphqlError::Unreachable(_) => ApiError::ServiceUnavailable(
                "GraphQL server is not reachable; start it before querying".to_string(),
            ),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<ProjectionError> for ApiError {
    fn from(e: ProjectionError) -> Self {
        ApiError::Conflict(e.to_string())
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::UnresolvedTeam { .. } | TransferError::AmbiguousTeam { .. } => {
                ApiError::Conflict(e.to_string())
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<GraphqlTransferError> for ApiError {
    fn from(e: GraphqlTransferError) -> Self {
        match e {
            GraphqlTransferError::ServiceUnavailable => {
                ApiError::ServiceUnavailable(e.to_string())
            }
            GraphqlTransferError::Snapshot(inner) => inner.into(),
        }
    }
}
