//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Row Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Checkout Locks Products                          │
//! │                                                                         │
//! │  Checkout X: [B, A]          Checkout Y: [A, B]                        │
//! │       │                           │                                     │
//! │       ▼                           ▼                                     │
//! │  ids sorted: [A, B]          ids sorted: [A, B]                        │
//! │       │                           │                                     │
//! │       ▼                           ▼                                     │
//! │  SELECT ... WHERE id = ANY($1) ORDER BY id FOR UPDATE                  │
//! │       │                           │                                     │
//! │  locks A, then B             waits on A (held by X)                    │
//! │       │                           │                                     │
//! │  UPDATE, INSERT, COMMIT ───► releases A, B ───► Y locks A, then B      │
//! │                                                                         │
//! │  Same order everywhere: no cycle, no deadlock.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Product, ProductId, StockDelta};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: PgPool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns the stored row.
    pub async fn insert(
        &self,
        name: &str,
        price: i64,
        stock: i64,
        category_id: Option<i64>,
    ) -> DbResult<Product> {
        debug!(name = %name, price, stock, "Inserting product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, stock, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, stock
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID (unlocked read).
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Locks and fetches the rows for `ids` in ascending id order.
    ///
    /// Runs on the connection of an open transaction; the locks live until
    /// it ends. Missing ids are simply absent from the result.
    pub async fn lock_for_checkout(
        conn: &mut PgConnection,
        ids: &[ProductId],
    ) -> DbResult<Vec<Product>> {
        debug!(count = ids.len(), "Locking products for checkout");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, stock
            FROM products
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(products)
    }

    /// Applies all stock reductions in one statement.
    ///
    /// The `stock >= qty` guard makes the write conditional; if any row is
    /// skipped the affected count falls short and the whole unit must be
    /// rolled back.
    pub async fn decrement_stock(conn: &mut PgConnection, deltas: &[StockDelta]) -> DbResult<()> {
        if deltas.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = deltas.iter().map(|d| d.product_id).collect();
        let quantities: Vec<i64> = deltas.iter().map(|d| d.quantity).collect();

        debug!(count = deltas.len(), "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products AS p
            SET stock = p.stock - d.qty
            FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS d(id, qty)
            WHERE p.id = d.id AND p.stock >= d.qty
            "#,
        )
        .bind(&ids)
        .bind(&quantities)
        .execute(&mut *conn)
        .await?;

        let expected = deltas.len() as u64;
        if result.rows_affected() != expected {
            return Err(DbError::TransactionFailed(format!(
                "stock decrement touched {} of {} products",
                result.rows_affected(),
                expected
            )));
        }

        Ok(())
    }
}
