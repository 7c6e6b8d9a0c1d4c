//! Shared application state handed to every handler.

use std::sync::Arc;

use kasir_db::{CheckoutEngine, SalesReportAggregator};

/// Engine and report aggregator, shared behind `Arc`s.
pub struct AppState<C, R> {
    pub engine: Arc<CheckoutEngine<C>>,
    pub reports: Arc<SalesReportAggregator<R>>,
}

impl<C, R> AppState<C, R> {
    pub fn new(engine: CheckoutEngine<C>, reports: SalesReportAggregator<R>) -> Self {
        AppState {
            engine: Arc::new(engine),
            reports: Arc::new(reports),
        }
    }
}

// Derived Clone would demand C: Clone and R: Clone.
impl<C, R> Clone for AppState<C, R> {
    fn clone(&self) -> Self {
        AppState {
            engine: Arc::clone(&self.engine),
            reports: Arc::clone(&self.reports),
        }
    }
}
