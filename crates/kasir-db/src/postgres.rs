//! # PostgreSQL Checkout Store
//!
//! One checkout unit of work = one `sqlx::Transaction`.
//!
//! ```text
//! begin()            BEGIN; [SELECT set_config('lock_timeout', …, true)]
//! lock_products      SELECT … FOR UPDATE           (ascending ids)
//! decrement_stock    UPDATE … FROM UNNEST … WHERE stock >= qty
//! record_sale        INSERT header RETURNING; INSERT details FROM UNNEST
//! commit()           COMMIT
//! drop / rollback()  ROLLBACK
//! ```

use std::time::Duration;

use async_trait::async_trait;
use kasir_core::{DateRange, Money, PlannedLine, Product, ProductId, SalesReport, StockDelta, Transaction};
use sqlx::{PgPool, Postgres};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;
use crate::store::{CheckoutStore, InventoryStore, Ledger, SalesReportSource, UnitOfWork};

// =============================================================================
// Store
// =============================================================================

/// Opens PostgreSQL checkout units on a shared pool.
#[derive(Debug, Clone)]
pub struct PgCheckoutStore {
    pool: PgPool,
    lock_timeout: Option<Duration>,
}

impl PgCheckoutStore {
    pub fn new(pool: PgPool, lock_timeout: Option<Duration>) -> Self {
        PgCheckoutStore { pool, lock_timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CheckoutStore for PgCheckoutStore {
    type Unit = PgUnit;

    async fn begin(&self) -> DbResult<PgUnit> {
        let mut tx = self.pool.begin().await?;

        if let Some(timeout) = self.lock_timeout {
            // transaction-local, reset by COMMIT or ROLLBACK
            sqlx::query("SELECT set_config('lock_timeout', $1, true)")
                .bind(format!("{}ms", timeout.as_millis()))
                .execute(&mut *tx)
                .await?;
        }

        debug!("Checkout unit opened");
        Ok(PgUnit { tx })
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SalesReportSource for PgCheckoutStore {
    async fn sales_report(&self, range: &DateRange) -> DbResult<SalesReport> {
        TransactionRepository::new(self.pool.clone())
            .sales_report(range)
            .await
    }
}

// =============================================================================
// Unit of Work
// =============================================================================

/// An open checkout transaction. Rolls back on drop unless committed.
pub struct PgUnit {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl InventoryStore for PgUnit {
    async fn lock_products(&mut self, ids: &[ProductId]) -> DbResult<Vec<Product>> {
        ProductRepository::lock_for_checkout(&mut self.tx, ids).await
    }

    async fn decrement_stock(&mut self, deltas: &[StockDelta]) -> DbResult<()> {
        ProductRepository::decrement_stock(&mut self.tx, deltas).await
    }
}

#[async_trait]
impl Ledger for PgUnit {
    async fn record_sale(&mut self, total: Money, lines: &[PlannedLine]) -> DbResult<Transaction> {
        let (id, created_at) = TransactionRepository::insert_header(&mut self.tx, total.minor()).await?;
        TransactionRepository::insert_details(&mut self.tx, id, lines).await?;

        Ok(Transaction {
            id,
            created_at,
            total_amount: total.minor(),
            details: lines.iter().map(|line| line.to_detail(id)).collect(),
        })
    }
}

#[async_trait]
impl UnitOfWork for PgUnit {
    async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
