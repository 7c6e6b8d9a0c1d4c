//! # kasir-db: Persistence Layer for Kasir POS
//!
//! This crate turns checkout plans from kasir-core into committed sales.
//! It uses PostgreSQL through sqlx in production and an in-memory store
//! with the same locking discipline in tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  POST /checkout                       GET /report                      │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐                 ┌──────────────────────┐  │   │
//! │  │   │ CheckoutEngine │                 │ SalesReportAggregator│  │   │
//! │  │   │  (engine.rs)   │                 │     (report.rs)      │  │   │
//! │  │   └───────┬────────┘                 └──────────┬───────────┘  │   │
//! │  │           │ CheckoutStore / UnitOfWork          │ SalesReportSource
//! │  │           ▼                                     ▼              │   │
//! │  │   ┌───────────────────┐           ┌──────────────────────┐     │   │
//! │  │   │ PgCheckoutStore   │           │ MemoryStore          │     │   │
//! │  │   │ (postgres.rs)     │           │ (memory.rs)          │     │   │
//! │  │   │ FOR UPDATE rows   │           │ per-product mutexes  │     │   │
//! │  │   └─────────┬─────────┘           └──────────────────────┘     │   │
//! │  │             │ repository/*, pool.rs, migrations.rs             │   │
//! │  └─────────────┼───────────────────────────────────────────────────┘   │
//! │                ▼                                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     PostgreSQL                                  │   │
//! │  │   products, categories, transactions, transaction_details       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and checkout error types
//! - [`repository`] - SQL for products, categories and the ledger
//! - [`store`] - Capability traits the engine and aggregator depend on
//! - [`postgres`] - PostgreSQL implementation of the store traits
//! - [`memory`] - In-memory implementation of the store traits
//! - [`engine`] - The checkout engine
//! - [`report`] - The sales report aggregator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{CheckoutEngine, Database, DbConfig};
//! use kasir_core::CheckoutItem;
//!
//! let db = Database::new(DbConfig::from_url(&url)?).await?;
//! let engine = CheckoutEngine::new(db.checkout_store());
//!
//! let tx = engine.checkout(&[CheckoutItem::new(1, 3)]).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod report;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::CheckoutEngine;
pub use error::{CheckoutError, CheckoutErrorKind, DbError, DbResult, ReportError};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use postgres::PgCheckoutStore;
pub use report::SalesReportAggregator;
pub use store::{CheckoutStore, InventoryStore, Ledger, SalesReportSource, UnitOfWork};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::transaction::TransactionRepository;
