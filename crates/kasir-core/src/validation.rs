//! # Validation Module
//!
//! Input validation for checkout requests and report queries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP transport                                               │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any lock is taken)                       │
//! │  ├── quantity > 0 for every item                                       │
//! │  └── empty cart vs. CheckoutPolicy                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Checkout plan (under lock)                                   │
//! │  └── existence, stock sufficiency, money overflow                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database                                                     │
//! │  └── CHECK (stock >= 0), CHECK (quantity > 0), foreign keys            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::checkout::CheckoutPolicy;
use crate::error::ValidationError;
use crate::types::CheckoutItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Wire format of report dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Checkout Validators
// =============================================================================

/// Validates one item quantity.
///
/// `index` is the item's position in the request and only feeds the field
/// name of the error.
pub fn validate_quantity(index: usize, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: format!("items[{index}].quantity"),
        });
    }

    Ok(())
}

/// Validates a whole cart against the checkout policy.
///
/// ## Rules
/// - Every quantity must be positive
/// - An empty cart is rejected unless `policy.allow_empty_cart`
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_checkout_items;
/// use kasir_core::{CheckoutItem, CheckoutPolicy};
///
/// let policy = CheckoutPolicy::default();
/// assert!(validate_checkout_items(&[CheckoutItem::new(1, 2)], &policy).is_ok());
/// assert!(validate_checkout_items(&[CheckoutItem::new(1, 0)], &policy).is_err());
/// assert!(validate_checkout_items(&[], &policy).is_err());
/// ```
pub fn validate_checkout_items(
    items: &[CheckoutItem],
    policy: &CheckoutPolicy,
) -> ValidationResult<()> {
    if items.is_empty() && !policy.allow_empty_cart {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for (index, item) in items.iter().enumerate() {
        validate_quantity(index, item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Report Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` calendar date.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::parse_report_date;
///
/// assert!(parse_report_date("start_date", "2026-01-31").is_ok());
/// assert!(parse_report_date("start_date", "31/01/2026").is_err());
/// ```
pub fn parse_report_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected YYYY-MM-DD ({e})"),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
