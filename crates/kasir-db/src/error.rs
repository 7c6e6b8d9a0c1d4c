//! # Database Error Types
//!
//! Error types for database operations and for the two operations built on
//! top of them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error, SQLSTATE code)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Categorized by SQLSTATE                       │
//! │       │                                                                 │
//! │       ├──────────────────────┐                                          │
//! │       ▼                      ▼                                          │
//! │  CheckoutError          ReportError   ← plus CoreError / Validation    │
//! │       │                      │                                          │
//! │       ▼                      ▼                                          │
//! │  ApiError (apps/api) ← HTTP status + JSON body                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// PostgreSQL Error Codes
// =============================================================================

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const DEADLOCK_DETECTED: &str = "40P01";

// =============================================================================
// Db Error
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and status mapping.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate value violates {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A product references a category that does not exist
    /// - A detail row references a transaction that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - `stock >= 0` would be broken by a write outside the checkout lock
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed (begin, commit, or a conditional write that
    /// affected fewer rows than expected).
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Waiting for a row lock took longer than the configured bound, or
    /// PostgreSQL broke a deadlock by aborting this unit.
    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Whether resubmitting the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::LockTimeout(_) | DbError::PoolExhausted | DbError::ConnectionFailed(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound          → DbError::NotFound
/// sqlx::Error::Database 23505       → DbError::UniqueViolation
/// sqlx::Error::Database 23503       → DbError::ForeignKeyViolation
/// sqlx::Error::Database 23514       → DbError::CheckViolation
/// sqlx::Error::Database 55P03/40P01 → DbError::LockTimeout
/// sqlx::Error::PoolTimedOut         → DbError::PoolExhausted
/// sqlx::Error::PoolClosed / Io      → DbError::ConnectionFailed
/// Other                             → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();

                match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => DbError::UniqueViolation {
                        constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                    },
                    Some(FOREIGN_KEY_VIOLATION) => DbError::ForeignKeyViolation { message },
                    Some(CHECK_VIOLATION) => DbError::CheckViolation { message },
                    Some(LOCK_NOT_AVAILABLE) | Some(DEADLOCK_DETECTED) => {
                        DbError::LockTimeout(message)
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a checkout did not commit. Nothing was written in either case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart broke a checkout rule.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The store failed while the unit of work was open.
    #[error(transparent)]
    Persistence(#[from] DbError),
}

/// The four failure kinds callers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutErrorKind {
    Validation,
    NotFound,
    InsufficientStock,
    Persistence,
}

impl CheckoutErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutErrorKind::Validation => "validation",
            CheckoutErrorKind::NotFound => "not_found",
            CheckoutErrorKind::InsufficientStock => "insufficient_stock",
            CheckoutErrorKind::Persistence => "persistence",
        }
    }
}

impl CheckoutError {
    pub fn kind(&self) -> CheckoutErrorKind {
        match self {
            CheckoutError::Rejected(CoreError::ProductNotFound(_)) => CheckoutErrorKind::NotFound,
            CheckoutError::Rejected(CoreError::InsufficientStock { .. }) => {
                CheckoutErrorKind::InsufficientStock
            }
            CheckoutError::Rejected(_) => CheckoutErrorKind::Validation,
            CheckoutError::Persistence(_) => CheckoutErrorKind::Persistence,
        }
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Rejected(CoreError::Validation(err))
    }
}

// =============================================================================
// Report Error
// =============================================================================

/// Why a sales report could not be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] DbError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_kinds() {
        let not_found = CheckoutError::from(CoreError::ProductNotFound(3));
        assert_eq!(not_found.kind(), CheckoutErrorKind::NotFound);

        let short = CheckoutError::from(CoreError::InsufficientStock {
            product_id: 1,
            product_name: "A".into(),
            available: 10,
            requested: 20,
        });
        assert_eq!(short.kind(), CheckoutErrorKind::InsufficientStock);

        let invalid = CheckoutError::from(ValidationError::Required {
            field: "items".into(),
        });
        assert_eq!(invalid.kind(), CheckoutErrorKind::Validation);

        let overflow = CheckoutError::from(CoreError::AmountOverflow { product_id: 1 });
        assert_eq!(overflow.kind(), CheckoutErrorKind::Validation);

        let db = CheckoutError::from(DbError::PoolExhausted);
        assert_eq!(db.kind(), CheckoutErrorKind::Persistence);
    }

    #[test]
    fn test_checkout_error_keeps_core_message() {
        let err = CheckoutError::from(CoreError::ProductNotFound(42));
        assert_eq!(err.to_string(), "Product not found: 42");
    }

    #[test]
    fn test_transient_errors() {
        assert!(DbError::LockTimeout("55P03".into()).is_transient());
        assert!(DbError::PoolExhausted.is_transient());
        assert!(DbError::ConnectionFailed("reset".into()).is_transient());
        assert!(!DbError::QueryFailed("syntax".into()).is_transient());
        assert!(!DbError::not_found("Product", 1).is_transient());
    }

    #[test]
    fn test_pool_errors_map() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
    }
}
