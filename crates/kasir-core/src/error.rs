//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Checkout rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - CoreError | DbError, with a kind()             │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout rule violations.
///
/// Every variant aborts the enclosing checkout before any stock is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A checkout item references a product id with no matching row.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Aggregated demand for a product exceeds its locked stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout [{A, 2}, {A, 3}]
    ///      │
    ///      ▼
    /// Demand: A → 5, locked stock: A = 4
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: A, available: 4, requested: 5 }
    /// ```
    #[error(
        "Insufficient stock for product {product_name} (id {product_id}): available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i64,
        requested: i64,
    },

    /// A subtotal or the running total does not fit in the money type.
    #[error("Amount overflow while pricing product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// Summed quantities for one product do not fit in an i64.
    #[error("Quantity overflow for product {product_id}")]
    QuantityOverflow { product_id: ProductId },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a checkout opens its unit of work, or before a report query runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Range bounds are out of order.
    #[error("{start_field} must not be after {end_field}")]
    InvertedRange {
        start_field: String,
        end_field: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
