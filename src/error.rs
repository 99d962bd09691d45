//! Service error types with HTTP status code mapping.
//!
//! [`ViewerError`] is the central error type for the feed service. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. Record store failures arrive as [`crate::persistence::StoreError`]
//! and are converted at the feed controller boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{FailureId, FeedId};
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "unknown sort field: failurePayload",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`ViewerError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                 |
/// |-----------|-----------------|-----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request             |
/// | 2000–2999 | Not Found       | 404 Not Found / 409 Conflict|
/// | 3000–3999 | Server          | 500 Internal Server Error   |
/// | 5000–5999 | Record Store    | 502 Bad Gateway             |
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested sort field is not a sortable entity field.
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    /// No open feed session with the given ID.
    #[error("feed not found: {0}")]
    FeedNotFound(FeedId),

    /// The failure is not part of the feed's loaded result sequence.
    #[error("failure not found: {0}")]
    FailureNotFound(FailureId),

    /// The open feed session cap has been reached.
    #[error("too many open feeds (limit {0})")]
    FeedLimitReached(usize),

    /// The record store rejected or failed a read.
    #[error("query failed: {0}")]
    QueryFailed(#[source] StoreError),

    /// The record store rejected or failed an insert.
    #[error("insert failed: {0}")]
    InsertFailed(#[source] StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ViewerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UnknownSortField(_) => 1002,
            Self::FeedNotFound(_) => 2001,
            Self::FailureNotFound(_) => 2002,
            Self::FeedLimitReached(_) => 2003,
            Self::Internal(_) => 3000,
            Self::QueryFailed(_) => 5001,
            Self::InsertFailed(_) => 5002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UnknownSortField(_) => StatusCode::BAD_REQUEST,
            Self::FeedNotFound(_) | Self::FailureNotFound(_) => StatusCode::NOT_FOUND,
            Self::FeedLimitReached(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::QueryFailed(_) | Self::InsertFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::QueryFailed(e) | Self::InsertFailed(e) => Some(e.kind().to_string()),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
