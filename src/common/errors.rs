use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::common::types::now_ms;

/// Broad classes of failure seen while talking to the upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorClass {
    /// Missing or invalid token, or a failed refresh.
    Auth,
    /// 429, 5xx or a transport failure. Retried with a growing delay.
    UpstreamTransient,
    /// Any other 4xx. Surfaced but retried at the normal cadence.
    UpstreamClient,
    /// Upstream body could not be decoded.
    Protocol,
}

impl ErrorClass {
    /// Whether a failure of this class should lengthen the wait before the
    /// next attempt.
    pub fn grows_backoff(self) -> bool {
        matches!(self, Self::Auth | Self::UpstreamTransient)
    }
}

/// Errors returned by the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_body(self, path: impl Into<String>) -> ErrorBody {
        let status = self.status();
        ErrorBody {
            timestamp: now_ms(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").into(),
            message: self.to_string(),
            path: path.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body(""))).into_response()
    }
}

/// JSON error response format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status reason phrase (e.g. "Bad Gateway").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// The request path that caused the error.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
}
