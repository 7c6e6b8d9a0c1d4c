//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │ TransactionDetail│      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  transaction_id │       │
//! │  │  name           │   │  created_at     │   │  product_id     │       │
//! │  │  price          │   │  total_amount   │   │  product_name ◄─┼─ snapshot
//! │  │  stock (≥ 0)    │   │  details[]  ────┼──►│  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   │  subtotal       │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────┐         │
//! │  │  CheckoutItem   │   │  SalesReport (derived, not stored)  │         │
//! │  │  product_id     │   │  total_revenue                      │         │
//! │  │  quantity (> 0) │   │  total_transaction_count            │         │
//! │  └─────────────────┘   │  best_selling_product {name, qty}   │         │
//! │                        └─────────────────────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary fields are stored as `i64` minor units; the [`Money`] accessors
//! exist for arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Identifier of a product row.
pub type ProductId = i64;

/// Identifier of a committed transaction.
pub type TransactionId = i64;

// =============================================================================
// Product
// =============================================================================

/// A product as seen by the checkout core: identity, display name, current
/// unit price and on-hand stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in minor units (non-negative).
    pub price: i64,
    /// On-hand stock (never negative).
    pub stock: i64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: i64, stock: i64) -> Self {
        Product {
            id,
            name: name.into(),
            price,
            stock,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// One requested line of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CheckoutItem {
    pub const fn new(product_id: ProductId, quantity: i64) -> Self {
        CheckoutItem {
            product_id,
            quantity,
        }
    }
}

/// Body of a checkout request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

/// Stock reduction for one distinct product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: ProductId,
    pub quantity: i64,
}

// =============================================================================
// Ledger
// =============================================================================

/// A committed sale. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub created_at: DateTime<Utc>,
    /// Sum of all detail subtotals.
    pub total_amount: i64,
    /// One row per original input item, in submission order.
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount)
    }

    /// Recomputes the total from the detail rows.
    pub fn details_total(&self) -> Money {
        self.details.iter().map(TransactionDetail::subtotal).sum()
    }
}

/// A line item of a committed transaction.
/// Uses snapshot pattern to freeze the product name at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionDetail {
    pub transaction_id: TransactionId,
    pub product_id: ProductId,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Locked unit price × quantity.
    pub subtotal: i64,
}

impl TransactionDetail {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal)
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// Summary of committed sales over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub total_revenue: i64,
    pub total_transaction_count: i64,
    pub best_selling_product: BestSellingProduct,
}

/// The product with the highest summed quantity in a report window.
///
/// Empty name and zero quantity when nothing was sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSellingProduct {
    pub name: String,
    pub quantity_sold: i64,
}

impl BestSellingProduct {
    pub fn is_empty(&self) -> bool {
        self.quantity_sold == 0 && self.name.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
