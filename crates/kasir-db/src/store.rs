//! # Store Capabilities
//!
//! The seams between the checkout engine and whatever holds the data.
//!
//! ## Capability Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CheckoutStore ──begin()──► Unit: UnitOfWork                           │
//! │                                   │                                     │
//! │                     ┌─────────────┴─────────────┐                       │
//! │                     ▼                           ▼                       │
//! │              InventoryStore                  Ledger                     │
//! │              lock_products(ids)              record_sale(total, lines)  │
//! │              decrement_stock(deltas)                                    │
//! │                     │                           │                       │
//! │                     └─────────────┬─────────────┘                       │
//! │                                   ▼                                     │
//! │                        commit()  |  rollback() / drop                  │
//! │                                                                         │
//! │  SalesReportSource ──sales_report(range)──► SalesReport (read-only)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations: [`crate::postgres`] (PostgreSQL) and [`crate::memory`]
//! (in-process).

use async_trait::async_trait;
use kasir_core::{DateRange, Money, PlannedLine, Product, ProductId, SalesReport, StockDelta, Transaction};

use crate::error::DbResult;

/// Locked access to product rows inside one unit of work.
#[async_trait]
pub trait InventoryStore: Send {
    /// Locks the rows for `ids` and returns them.
    ///
    /// `ids` must be ascending and free of duplicates; locks are taken in
    /// that order. Ids without a row are absent from the result. Locks are
    /// held until the unit commits or rolls back.
    async fn lock_products(&mut self, ids: &[ProductId]) -> DbResult<Vec<Product>>;

    /// Decrements stock for every delta in one conditional write.
    ///
    /// Fails without applying anything if any product is missing or would go
    /// below zero.
    async fn decrement_stock(&mut self, deltas: &[StockDelta]) -> DbResult<()>;
}

/// Append-only sales ledger inside one unit of work.
#[async_trait]
pub trait Ledger: Send {
    /// Writes the header and one detail row per line, in line order.
    async fn record_sale(&mut self, total: Money, lines: &[PlannedLine]) -> DbResult<Transaction>;
}

/// One atomic span. Dropping a unit without committing rolls it back.
#[async_trait]
pub trait UnitOfWork: InventoryStore + Ledger {
    async fn commit(self) -> DbResult<()>;

    async fn rollback(self) -> DbResult<()>;
}

/// Opens units of work for the checkout engine.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    type Unit: UnitOfWork;

    async fn begin(&self) -> DbResult<Self::Unit>;

    /// Cheap liveness probe.
    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// Read-only summary of the ledger over a range of days.
#[async_trait]
pub trait SalesReportSource: Send + Sync {
    async fn sales_report(&self, range: &DateRange) -> DbResult<SalesReport>;
}
