//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kasir POS                              │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CheckoutError::Rejected(CoreError) ──┐                                 │
//! │  CheckoutError::Persistence(DbError) ─┤                                 │
//! │  ReportError                         ─┼──► ApiError { code, message }   │
//! │  JsonRejection                       ─┘         │                       │
//! │                                                 ▼                       │
//! │                                   IntoResponse: status + JSON body      │
//! │                                                                         │
//! │  400 VALIDATION_ERROR    404 NOT_FOUND    409 INSUFFICIENT_STOCK        │
//! │  503 UNAVAILABLE         500 DATABASE_ERROR                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence internals are logged and replaced by a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kasir_core::{CoreError, ValidationError};
use kasir_db::{CheckoutError, DbError, ReportError};
use serde::Serialize;
use serde_json::{json, Value};

/// Error body returned to HTTP clients.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for product Kopi Susu (id 7): available 2, requested 3",
///   "details": { "product_id": 7, "available": 2, "requested": 3 }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Referenced product does not exist (404)
    NotFound,

    /// Demand exceeds stock (409)
    InsufficientStock,

    /// Lock wait, pool wait or connection failed, retry later (503)
    Unavailable,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details to the error body.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
        }
        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => {
                ApiError::new(ErrorCode::NotFound, message)
                    .with_details(json!({ "product_id": id }))
            }
            CoreError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            } => {
                let details = json!({
                    "product_id": product_id,
                    "product_name": product_name,
                    "available": available,
                    "requested": requested,
                });
                ApiError::new(ErrorCode::InsufficientStock, message).with_details(details)
            }
            CoreError::AmountOverflow { .. } | CoreError::QuantityOverflow { .. } => {
                ApiError::validation(message)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
///
/// Transient failures ([`DbError::is_transient`]) become 503 so clients know
/// a resubmission may succeed; everything else is a 500.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, transient = err.is_transient(), "Persistence failure");

        let message = match &err {
            DbError::LockTimeout(_) => "Product is busy, retry the request",
            DbError::PoolExhausted => "Server is busy, retry the request",
            DbError::ConnectionFailed(_) => "Database connection failed",
            DbError::TransactionFailed(_) => "Database transaction failed",
            _ => "Database operation failed",
        };
        let code = if err.is_transient() {
            ErrorCode::Unavailable
        } else {
            ErrorCode::DatabaseError
        };
        ApiError::new(code, message)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Rejected(e) => e.into(),
            CheckoutError::Persistence(e) => e.into(),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Invalid(e) => e.into(),
            ReportError::Persistence(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
