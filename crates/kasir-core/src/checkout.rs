//! # Checkout Planning
//!
//! The pure half of a checkout: everything that can be decided once the
//! referenced product rows are locked, without touching storage.
//!
//! ## Where This Sits in a Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Checkout (unit of work)                         │
//! │                                                                         │
//! │  items ──► Demand::from_items ──► ascending product ids                │
//! │                                        │                                │
//! │                         lock_products(ids)   ◄── kasir-db               │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  CheckoutPlan::build(items, demand, locked)   ◄── THIS MODULE           │
//! │    1. every item's product exists          (ProductNotFound)           │
//! │    2. demand ≤ stock for every product     (InsufficientStock)         │
//! │    3. subtotal per item at locked price    (AmountOverflow)            │
//! │    4. total = Σ subtotals                                               │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  decrement_stock(plan.deltas()) ──► record_sale(plan) ──► commit       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All checks complete before the plan exists, so a plan is only ever
//! handed to storage when every product in the cart can be fulfilled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CheckoutItem, Product, ProductId, StockDelta, TransactionDetail, TransactionId};

// =============================================================================
// Policy
// =============================================================================

/// Tunable checkout rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    /// Accept an empty cart and commit a zero-amount transaction.
    /// Rejected with a validation error when `false` (the default).
    pub allow_empty_cart: bool,
}

// =============================================================================
// Demand
// =============================================================================

/// Requested quantity per distinct product, summed across duplicate items.
///
/// Iteration is in ascending product id order, which is also the lock order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demand {
    by_product: BTreeMap<ProductId, i64>,
}

impl Demand {
    /// Aggregates the items of one request.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::{CheckoutItem, Demand};
    ///
    /// let items = [CheckoutItem::new(9, 2), CheckoutItem::new(4, 1), CheckoutItem::new(9, 3)];
    /// let demand = Demand::from_items(&items).unwrap();
    /// assert_eq!(demand.product_ids(), vec![4, 9]);
    /// assert_eq!(demand.get(9), Some(5));
    /// ```
    pub fn from_items(items: &[CheckoutItem]) -> CoreResult<Self> {
        let mut by_product: BTreeMap<ProductId, i64> = BTreeMap::new();

        for item in items {
            let entry = by_product.entry(item.product_id).or_insert(0);
            *entry = entry
                .checked_add(item.quantity)
                .ok_or(CoreError::QuantityOverflow {
                    product_id: item.product_id,
                })?;
        }

        Ok(Demand { by_product })
    }

    /// Distinct product ids in ascending order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.by_product.keys().copied().collect()
    }

    /// Total requested quantity for a product.
    pub fn get(&self, product_id: ProductId) -> Option<i64> {
        self.by_product.get(&product_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.by_product.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }

    /// One stock reduction per distinct product, ascending by id.
    pub fn to_deltas(&self) -> Vec<StockDelta> {
        self.iter()
            .map(|(product_id, quantity)| StockDelta {
                product_id,
                quantity,
            })
            .collect()
    }
}

// =============================================================================
// Planned Line
// =============================================================================

/// A detail row waiting for its transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLine {
    /// Zero-based position of the originating item in the request.
    pub position: usize,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub subtotal: i64,
}

impl PlannedLine {
    pub fn to_detail(&self, transaction_id: TransactionId) -> TransactionDetail {
        TransactionDetail {
            transaction_id,
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            quantity: self.quantity,
            subtotal: self.subtotal,
        }
    }
}

// =============================================================================
// Checkout Plan
// =============================================================================

/// A fully validated checkout: stock reductions to apply and ledger lines to
/// write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    lines: Vec<PlannedLine>,
    deltas: Vec<StockDelta>,
    total: Money,
}

impl CheckoutPlan {
    /// Builds the plan from the request items, their aggregated demand and
    /// the product rows read under lock.
    ///
    /// `demand` must be the aggregation of `items`. `locked` may be in any
    /// order; rows for products not in the cart are ignored.
    ///
    /// ## Errors
    /// - [`CoreError::ProductNotFound`] for the first item, in submission
    ///   order, whose product has no locked row
    /// - [`CoreError::InsufficientStock`] for the lowest product id whose
    ///   demand exceeds its stock
    /// - [`CoreError::AmountOverflow`] if a subtotal or the total overflows
    pub fn build(items: &[CheckoutItem], demand: &Demand, locked: &[Product]) -> CoreResult<Self> {
        let products: BTreeMap<ProductId, &Product> = locked.iter().map(|p| (p.id, p)).collect();

        for item in items {
            if !products.contains_key(&item.product_id) {
                return Err(CoreError::ProductNotFound(item.product_id));
            }
        }

        for (product_id, requested) in demand.iter() {
            let product = products
                .get(&product_id)
                .ok_or(CoreError::ProductNotFound(product_id))?;

            if requested > product.stock {
                return Err(CoreError::InsufficientStock {
                    product_id,
                    product_name: product.name.clone(),
                    available: product.stock,
                    requested,
                });
            }
        }

        let mut total = Money::zero();
        let mut lines = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            let product = products
                .get(&item.product_id)
                .ok_or(CoreError::ProductNotFound(item.product_id))?;

            let overflow = CoreError::AmountOverflow {
                product_id: item.product_id,
            };
            let subtotal = product
                .price()
                .checked_mul_quantity(item.quantity)
                .ok_or_else(|| overflow.clone())?;
            total = total.checked_add(subtotal).ok_or(overflow)?;

            lines.push(PlannedLine {
                position,
                product_id: item.product_id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                subtotal: subtotal.minor(),
            });
        }

        Ok(CheckoutPlan {
            lines,
            deltas: demand.to_deltas(),
            total,
        })
    }

    /// Ledger lines in submission order.
    pub fn lines(&self) -> &[PlannedLine] {
        &self.lines
    }

    /// Stock reductions, ascending by product id.
    pub fn deltas(&self) -> &[StockDelta] {
        &self.deltas
    }

    pub fn total(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
