//! # Kasir API
//!
//! HTTP transport for the checkout engine and the sales report aggregator.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Server                                      │
//! │                                                                         │
//! │  Client ───► axum (8080) ───► routes ───► CheckoutEngine ──► Store     │
//! │                                  │                                      │
//! │                                  └──────► SalesReportAggregator        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is generic over the store, so the binary runs it on
//! PostgreSQL while the HTTP tests run it on the in-memory store.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;
