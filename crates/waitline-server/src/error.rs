//! HTTP error types for the Waitline server.
//!
//! Maps domain errors from `waitline-core` into appropriate HTTP
//! responses. Every error variant produces a JSON body with a
//! machine-readable `error` field and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use waitline_core::error::SubscribeError;

use crate::state::DegradedReason;

/// Application-level error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The newsletter service is not configured — no key resolved.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// Client sent invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The vendor API rejected the request.
    #[error("vendor rejected the request: {0}")]
    Upstream(String),
    /// Network-level failure reaching the vendor.
    #[error("vendor unreachable: {0}")]
    Connectivity(String),
    /// Internal server error (misconfiguration).
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_rejected", msg),
            Self::Connectivity(msg) => (StatusCode::BAD_GATEWAY, "upstream_unreachable", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SubscribeError> for AppError {
    fn from(err: SubscribeError) -> Self {
        match err {
            SubscribeError::MissingKey => Self::Unavailable(
                "Newsletter service unavailable. Please try again later.".to_owned(),
            ),
            SubscribeError::MissingAudience { .. } => {
                Self::Internal("Audience ID is not configured.".to_owned())
            }
            SubscribeError::InvalidEmail { .. } => {
                Self::BadRequest("A valid email address is required.".to_owned())
            }
            SubscribeError::EmptyContactQuery => Self::BadRequest(
                "Provide either a contact id or email query parameter.".to_owned(),
            ),
            SubscribeError::Rejected { message, .. } => Self::Upstream(message),
            SubscribeError::Network { reason } => Self::Connectivity(reason),
        }
    }
}

impl From<DegradedReason> for AppError {
    fn from(reason: DegradedReason) -> Self {
        match reason {
            DegradedReason::MissingKey => Self::Unavailable(
                "Newsletter service unavailable. Please try again later.".to_owned(),
            ),
            DegradedReason::MissingAudience => {
                Self::Internal("Audience ID is not configured.".to_owned())
            }
        }
    }
}
