//! # Repository Module
//!
//! SQL for Kasir POS, one repository per table family.
//!
//! ## Two Kinds of Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-level (own a PgPool, one statement per call)                     │
//! │  ├── ProductRepository::insert / get_by_id / count                     │
//! │  ├── CategoryRepository::insert / count                                │
//! │  └── TransactionRepository::get_by_id / sales_report                   │
//! │                                                                         │
//! │  Unit-level (take &mut PgConnection of an open transaction)            │
//! │  ├── ProductRepository::lock_for_checkout   SELECT ... FOR UPDATE      │
//! │  ├── ProductRepository::decrement_stock     UPDATE ... FROM UNNEST     │
//! │  ├── TransactionRepository::insert_header   INSERT ... RETURNING       │
//! │  └── TransactionRepository::insert_details  INSERT ... FROM UNNEST     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and stock
//! - [`CategoryRepository`](category::CategoryRepository) - Categories (seed data)
//! - [`TransactionRepository`](transaction::TransactionRepository) - The sales ledger

pub mod category;
pub mod product;
pub mod transaction;
