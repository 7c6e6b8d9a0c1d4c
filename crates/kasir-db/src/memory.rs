//! # In-Memory Store
//!
//! A process-local implementation of the store traits with the same locking
//! discipline as PostgreSQL row locks.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStore (Arc, cheap to clone)                                     │
//! │                                                                         │
//! │  products: id ──► Arc<tokio::Mutex<Product>>   ← one lock per row      │
//! │  names:    id ──► current name                 ← read by reports       │
//! │  ledger:   Vec<Transaction>                    ← append on commit      │
//! │                                                                         │
//! │  MemoryUnit                                                            │
//! │  ├── OwnedMutexGuard per locked product (ascending id order)           │
//! │  ├── staged stock deltas                                               │
//! │  └── staged sale                                                       │
//! │                                                                         │
//! │  commit(): apply deltas through the guards, append sale, drop guards   │
//! │  drop:     discard staging, drop guards                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The std locks guarding the maps are never held across an `.await`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kasir_core::{
    DateRange, Money, PlannedLine, Product, ProductId, SalesReport, SalesTally, StockDelta,
    Transaction, TransactionId,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{CheckoutStore, InventoryStore, Ledger, SalesReportSource, UnitOfWork};

type ProductSlot = Arc<AsyncMutex<Product>>;

#[derive(Debug, Default)]
struct Inner {
    products: RwLock<BTreeMap<ProductId, ProductSlot>>,
    names: RwLock<BTreeMap<ProductId, String>>,
    ledger: Mutex<Vec<Transaction>>,
    next_product_id: AtomicI64,
    next_transaction_id: AtomicI64,
}

impl Inner {
    fn slot(&self, id: ProductId) -> Option<ProductSlot> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory products and ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product and returns it with its assigned id.
    pub fn insert_product(&self, name: impl Into<String>, price: i64, stock: i64) -> Product {
        let id = self.inner.next_product_id.fetch_add(1, Ordering::SeqCst) + 1;
        let product = Product::new(id, name, price, stock);

        self.inner
            .names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, product.name.clone());
        self.inner
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(AsyncMutex::new(product.clone())));

        product
    }

    /// Current row, waiting for any checkout holding its lock.
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        let slot = self.inner.slot(id)?;
        let product = slot.lock().await.clone();
        Some(product)
    }

    /// Current stock, waiting for any checkout holding the row lock.
    pub async fn stock_of(&self, id: ProductId) -> Option<i64> {
        self.product(id).await.map(|p| p.stock)
    }

    /// Renames a product. Committed detail rows keep their snapshot name.
    pub async fn rename_product(&self, id: ProductId, name: impl Into<String>) -> bool {
        let Some(slot) = self.inner.slot(id) else {
            return false;
        };
        let name = name.into();

        let mut row = slot.lock().await;
        row.name.clone_from(&name);
        self.inner
            .names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, name);

        true
    }

    /// Removes a product row. Ledger rows that reference it are kept.
    pub async fn remove_product(&self, id: ProductId) -> bool {
        let Some(slot) = self.inner.slot(id) else {
            return false;
        };

        let _row = slot.lock().await;
        self.inner
            .names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        self.inner
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Snapshot of the committed ledger in commit order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Moves a committed transaction to another instant.
    pub fn set_created_at(&self, id: TransactionId, created_at: DateTime<Utc>) -> bool {
        let mut ledger = self.inner.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        match ledger.iter_mut().find(|tx| tx.id == id) {
            Some(tx) => {
                tx.created_at = created_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> DbResult<MemoryUnit> {
        Ok(MemoryUnit {
            inner: Arc::clone(&self.inner),
            locked: BTreeMap::new(),
            staged_stock: BTreeMap::new(),
            staged_sale: None,
        })
    }
}

#[async_trait]
impl SalesReportSource for MemoryStore {
    async fn sales_report(&self, range: &DateRange) -> DbResult<SalesReport> {
        let ledger = self.transactions();

        let mut tally = SalesTally::new(*range);
        for tx in &ledger {
            tally.record(tx);
        }

        let names = self
            .inner
            .names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(tally.finish(|id| names.get(&id).cloned()))
    }
}

// =============================================================================
// Unit of Work
// =============================================================================

/// An open in-memory checkout. Holds its row locks until dropped.
pub struct MemoryUnit {
    inner: Arc<Inner>,
    locked: BTreeMap<ProductId, OwnedMutexGuard<Product>>,
    staged_stock: BTreeMap<ProductId, i64>,
    staged_sale: Option<Transaction>,
}

impl std::fmt::Debug for MemoryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUnit")
            .field("locked", &self.locked.keys().collect::<Vec<_>>())
            .field("staged_stock", &self.staged_stock)
            .field("staged_sale", &self.staged_sale.as_ref().map(|tx| tx.id))
            .finish()
    }
}

#[async_trait]
impl InventoryStore for MemoryUnit {
    async fn lock_products(&mut self, ids: &[ProductId]) -> DbResult<Vec<Product>> {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        for id in &sorted {
            if self.locked.contains_key(id) {
                continue;
            }
            let Some(slot) = self.inner.slot(*id) else {
                continue;
            };
            let guard = slot.lock_owned().await;
            debug!(product_id = id, "Locked product");
            self.locked.insert(*id, guard);
        }

        Ok(sorted
            .iter()
            .filter_map(|id| self.locked.get(id).map(|guard| (**guard).clone()))
            .collect())
    }

    async fn decrement_stock(&mut self, deltas: &[StockDelta]) -> DbResult<()> {
        let mut next = self.staged_stock.clone();

        for delta in deltas {
            let guard = self.locked.get(&delta.product_id).ok_or_else(|| {
                DbError::TransactionFailed(format!(
                    "product {} is not locked by this unit",
                    delta.product_id
                ))
            })?;

            let staged = next.entry(delta.product_id).or_insert(0);
            let remaining = guard.stock - *staged;
            if remaining < delta.quantity {
                return Err(DbError::TransactionFailed(format!(
                    "stock decrement for product {} exceeds remaining {}",
                    delta.product_id, remaining
                )));
            }
            *staged += delta.quantity;
        }

        self.staged_stock = next;
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryUnit {
    async fn record_sale(&mut self, total: Money, lines: &[PlannedLine]) -> DbResult<Transaction> {
        if self.staged_sale.is_some() {
            return Err(DbError::TransactionFailed(
                "unit already recorded a sale".to_string(),
            ));
        }

        let id = self.inner.next_transaction_id.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = Transaction {
            id,
            created_at: Utc::now(),
            total_amount: total.minor(),
            details: lines.iter().map(|line| line.to_detail(id)).collect(),
        };

        self.staged_sale = Some(tx.clone());
        Ok(tx)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn commit(mut self) -> DbResult<()> {
        for (id, quantity) in &self.staged_stock {
            if let Some(guard) = self.locked.get_mut(id) {
                guard.stock -= quantity;
            }
        }

        if let Some(tx) = self.staged_sale.take() {
            self.inner
                .ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(tx);
        }

        // guards drop here, after every effect is visible
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_dropped_unit_discards_staged_writes() {
        let store = MemoryStore::new();
        let a = store.insert_product("A", 100, 10);

        let mut unit = store.begin().await.unwrap();
        unit.lock_products(&[a.id]).await.unwrap();
        unit.decrement_stock(&[StockDelta { product_id: a.id, quantity: 4 }])
            .await
            .unwrap();
        drop(unit);

        assert_eq!(store.stock_of(a.id).await, Some(10));
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_commit_applies_stock_and_sale() {
        let store = MemoryStore::new();
        let a = store.insert_product("A", 100, 10);

        let mut unit = store.begin().await.unwrap();
        unit.lock_products(&[a.id]).await.unwrap();
        unit.decrement_stock(&[StockDelta { product_id: a.id, quantity: 4 }])
            .await
            .unwrap();
        unit.record_sale(Money::from_minor(400), &[]).await.unwrap();
        unit.commit().await.unwrap();

        assert_eq!(store.stock_of(a.id).await, Some(6));
        assert_eq!(store.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_decrement_requires_lock_and_stock() {
        let store = MemoryStore::new();
        let a = store.insert_product("A", 100, 3);

        let mut unit = store.begin().await.unwrap();
        let unlocked = unit
            .decrement_stock(&[StockDelta { product_id: a.id, quantity: 1 }])
            .await;
        assert!(matches!(unlocked, Err(DbError::TransactionFailed(_))));

        unit.lock_products(&[a.id]).await.unwrap();
        let too_much = unit
            .decrement_stock(&[StockDelta { product_id: a.id, quantity: 4 }])
            .await;
        assert!(matches!(too_much, Err(DbError::TransactionFailed(_))));
    }

    #[tokio::test]
    async fn test_lock_skips_missing_and_sorts() {
        let store = MemoryStore::new();
        let a = store.insert_product("A", 1, 1);
        let b = store.insert_product("B", 1, 1);

        let mut unit = store.begin().await.unwrap();
        let rows = unit.lock_products(&[b.id, 999, a.id]).await.unwrap();
        let ids: Vec<ProductId> = rows.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_locked_row_blocks_other_units() {
        let store = MemoryStore::new();
        let a = store.insert_product("A", 1, 1);

        let mut holder = store.begin().await.unwrap();
        holder.lock_products(&[a.id]).await.unwrap();

        let mut waiter = store.begin().await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            waiter.lock_products(&[a.id]),
        )
        .await;
        assert!(blocked.is_err());

        drop(holder);
        let rows = waiter.lock_products(&[a.id]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_rename_keeps_ledger_snapshot() {
        let store = MemoryStore::new();
        let a = store.insert_product("Old", 1, 1);

        assert!(store.rename_product(a.id, "New").await);
        assert_eq!(store.product(a.id).await.unwrap().name, "New");
        assert!(!store.rename_product(999, "Nope").await);
    }
}
