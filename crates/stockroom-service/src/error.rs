//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use stockroom_core::LedgerError;
use stockroom_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid identity context.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - duplicate resource or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Insufficient stock for a withdrawal or borrow.
    #[error("insufficient stock for {item_code}: balance={balance}, requested={requested}")]
    InsufficientStock {
        /// The affected item code.
        item_code: String,
        /// Current available balance.
        balance: i64,
        /// Quantity the caller asked for.
        requested: i64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::InsufficientStock {
                item_code,
                balance,
                requested,
            } => (
                StatusCode::CONFLICT,
                "insufficient_stock",
                self.to_string(),
                Some(serde_json::json!({
                    "item_code": item_code,
                    "balance": balance,
                    "requested": requested
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ItemNotFound { .. } | LedgerError::BorrowNotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            LedgerError::InvalidDueDate { .. }
            | LedgerError::InvalidQuantity { .. }
            | LedgerError::InvalidId(_) => Self::BadRequest(err.to_string()),
            LedgerError::ItemAlreadyExists { .. } | LedgerError::AlreadyReturned { .. } => {
                Self::Conflict(err.to_string())
            }
            LedgerError::InsufficientStock {
                item_code,
                balance,
                requested,
            } => Self::InsufficientStock {
                item_code,
                balance,
                requested,
            },
            LedgerError::Scheduling(msg)
            | LedgerError::Storage(msg)
            | LedgerError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::AlreadyExists { .. } | StoreError::AlreadyReturned { .. } => {
                Self::Conflict(err.to_string())
            }
            StoreError::InvalidQuantity { .. } => Self::BadRequest(err.to_string()),
            StoreError::InsufficientStock {
                item_code,
                balance,
                requested,
            } => Self::InsufficientStock {
                item_code,
                balance,
                requested,
            },
            StoreError::Database(msg) => Self::Internal(msg),
        }
    }
}
