//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate is the **heart** of the checkout backend. It contains the
//! checkout and reporting rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/api (axum HTTP transport)                  │   │
//! │  │        POST /checkout        GET /report       GET /health      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        kasir-db (CheckoutEngine, SalesReportAggregator)         │   │
//! │  │      locks rows ──► asks core for a plan ──► writes ledger      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │  Demand   │  │ DateRange │  │   │
//! │  │   │Transaction│  │ checked × │  │   Plan    │  │   Tally   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CheckoutItem, Transaction, SalesReport)
//! - [`money`] - Money type with checked integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`checkout`] - Demand aggregation and the checkout plan
//! - [`report`] - Date ranges and sales tallying
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::checkout::{CheckoutPlan, Demand};
//! use kasir_core::{CheckoutItem, Product};
//!
//! let items = vec![CheckoutItem::new(1, 3), CheckoutItem::new(2, 2)];
//! let locked = vec![
//!     Product::new(1, "Kopi Susu", 100, 10),
//!     Product::new(2, "Roti Bakar", 50, 5),
//! ];
//!
//! let demand = Demand::from_items(&items).unwrap();
//! let plan = CheckoutPlan::build(&items, &demand, &locked).unwrap();
//! assert_eq!(plan.total().minor(), 400);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CheckoutPlan, CheckoutPolicy, Demand, PlannedLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{DateRange, SalesTally};
pub use types::*;
