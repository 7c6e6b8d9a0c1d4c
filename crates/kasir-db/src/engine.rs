//! # Checkout Engine
//!
//! Turns a cart into a committed sale, or into nothing at all.
//!
//! ## One Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  validate_checkout_items(items, policy)      ← no lock taken yet       │
//! │  Demand::from_items(items)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.begin() ─────────────────────────────────────────┐              │
//! │       │                                                 │ unit of work │
//! │  lock_products(demand.product_ids())   ascending ids    │              │
//! │  CheckoutPlan::build(items, demand, locked)             │              │
//! │  decrement_stock(plan.deltas())                         │              │
//! │  record_sale(plan.total(), plan.lines())                │              │
//! │       │                                                 │              │
//! │       ├── Ok  ──► commit()                              │              │
//! │       └── Err ──► rollback()  (no stock change, no rows)│              │
//! │                                                         ┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never retries. A caller that sees a lock timeout or another
//! persistence failure decides whether to resubmit the whole cart.

use kasir_core::validation::validate_checkout_items;
use kasir_core::{CheckoutItem, CheckoutPlan, CheckoutPolicy, Demand, Transaction};
use tracing::{debug, info, warn};

use crate::error::CheckoutError;
use crate::store::{CheckoutStore, UnitOfWork};

/// Checkout orchestration over any [`CheckoutStore`].
#[derive(Debug, Clone)]
pub struct CheckoutEngine<S> {
    store: S,
    policy: CheckoutPolicy,
}

impl<S: CheckoutStore> CheckoutEngine<S> {
    /// Creates an engine with the default policy (empty carts rejected).
    pub fn new(store: S) -> Self {
        CheckoutEngine {
            store,
            policy: CheckoutPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CheckoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one checkout.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - committed; details follow the item order
    /// * `Err(CheckoutError)` - nothing was written
    pub async fn checkout(&self, items: &[CheckoutItem]) -> Result<Transaction, CheckoutError> {
        let result = self.run(items).await;

        match &result {
            Ok(tx) => info!(
                transaction_id = tx.id,
                total_amount = tx.total_amount,
                lines = tx.details.len(),
                "Checkout committed"
            ),
            Err(err) => warn!(
                kind = err.kind().as_str(),
                error = %err,
                items = items.len(),
                "Checkout rejected"
            ),
        }

        result
    }

    async fn run(&self, items: &[CheckoutItem]) -> Result<Transaction, CheckoutError> {
        validate_checkout_items(items, &self.policy)?;
        let demand = Demand::from_items(items)?;

        let mut unit = self.store.begin().await?;

        match apply(&mut unit, items, &demand).await {
            Ok(tx) => {
                unit.commit().await?;
                Ok(tx)
            }
            Err(err) => {
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; unit discarded");
                }
                Err(err)
            }
        }
    }
}

async fn apply<U: UnitOfWork>(
    unit: &mut U,
    items: &[CheckoutItem],
    demand: &Demand,
) -> Result<Transaction, CheckoutError> {
    let locked = if demand.is_empty() {
        Vec::new()
    } else {
        unit.lock_products(&demand.product_ids()).await?
    };
    debug!(requested = demand.len(), found = locked.len(), "Products locked");

    let plan = CheckoutPlan::build(items, demand, &locked)?;

    if !plan.deltas().is_empty() {
        unit.decrement_stock(plan.deltas()).await?;
    }

    let tx = unit.record_sale(plan.total(), plan.lines()).await?;
    Ok(tx)
}
