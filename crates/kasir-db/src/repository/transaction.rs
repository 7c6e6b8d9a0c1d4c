//! # Transaction Repository
//!
//! The sales ledger: write-once transaction headers and their detail rows.
//!
//! ## Ledger Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  insert_header(total)                                                  │
//! │     INSERT INTO transactions ... RETURNING id, created_at              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  insert_details(id, lines)                                             │
//! │     INSERT INTO transaction_details ... SELECT FROM UNNEST(...)        │
//! │     line_no = position in the request (submission order)               │
//! │                                                                         │
//! │  Both run on the connection of the checkout's open transaction.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::SalesReportSource;
use kasir_core::{
    BestSellingProduct, DateRange, PlannedLine, SalesReport, Transaction, TransactionDetail,
    TransactionId,
};

#[derive(Debug, sqlx::FromRow)]
struct HeaderRow {
    id: TransactionId,
    total_amount: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BestSellerRow {
    name: String,
    quantity_sold: i64,
}

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        TransactionRepository { pool }
    }

    /// Writes a transaction header and returns its id and timestamp.
    pub async fn insert_header(
        conn: &mut PgConnection,
        total_amount: i64,
    ) -> DbResult<(TransactionId, DateTime<Utc>)> {
        let row = sqlx::query_as::<_, (TransactionId, DateTime<Utc>)>(
            "INSERT INTO transactions (total_amount) VALUES ($1) RETURNING id, created_at",
        )
        .bind(total_amount)
        .fetch_one(&mut *conn)
        .await?;

        debug!(transaction_id = row.0, total_amount, "Inserted transaction header");
        Ok(row)
    }

    /// Writes all detail rows of a transaction in one statement.
    pub async fn insert_details(
        conn: &mut PgConnection,
        transaction_id: TransactionId,
        lines: &[PlannedLine],
    ) -> DbResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut line_nos = Vec::with_capacity(lines.len());
        for line in lines {
            let line_no = i32::try_from(line.position)
                .map_err(|_| DbError::Internal(format!("line {} out of range", line.position)))?;
            line_nos.push(line_no);
        }
        let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        let names: Vec<String> = lines.iter().map(|l| l.product_name.clone()).collect();
        let quantities: Vec<i64> = lines.iter().map(|l| l.quantity).collect();
        let subtotals: Vec<i64> = lines.iter().map(|l| l.subtotal).collect();

        sqlx::query(
            r#"
            INSERT INTO transaction_details
                (transaction_id, line_no, product_id, product_name, quantity, subtotal)
            SELECT $1, d.line_no, d.product_id, d.product_name, d.quantity, d.subtotal
            FROM UNNEST($2::INT[], $3::BIGINT[], $4::TEXT[], $5::BIGINT[], $6::BIGINT[])
                AS d(line_no, product_id, product_name, quantity, subtotal)
            "#,
        )
        .bind(transaction_id)
        .bind(&line_nos)
        .bind(&product_ids)
        .bind(&names)
        .bind(&quantities)
        .bind(&subtotals)
        .execute(&mut *conn)
        .await?;

        debug!(transaction_id, count = lines.len(), "Inserted transaction details");
        Ok(())
    }

    /// Gets a committed transaction with its details in submission order.
    pub async fn get_by_id(&self, id: TransactionId) -> DbResult<Option<Transaction>> {
        let header = sqlx::query_as::<_, HeaderRow>(
            "SELECT id, total_amount, created_at FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let details = sqlx::query_as::<_, TransactionDetail>(
            r#"
            SELECT transaction_id, product_id, product_name, quantity, subtotal
            FROM transaction_details
            WHERE transaction_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Transaction {
            id: header.id,
            created_at: header.created_at,
            total_amount: header.total_amount,
            details,
        }))
    }
}

#[async_trait]
impl SalesReportSource for TransactionRepository {
    /// Both queries share one REPEATABLE READ snapshot.
    async fn sales_report(&self, range: &DateRange) -> DbResult<SalesReport> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total_revenue, total_transaction_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)::BIGINT, COUNT(*)
            FROM transactions
            WHERE created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(range.from())
        .bind(range.until())
        .fetch_one(&mut *tx)
        .await?;

        // live name when the product row exists, else the latest snapshot
        let best = sqlx::query_as::<_, BestSellerRow>(
            r#"
            SELECT
                COALESCE(
                    MAX(p.name),
                    (ARRAY_AGG(td.product_name ORDER BY t.created_at DESC, td.id DESC))[1]
                ) AS name,
                SUM(td.quantity)::BIGINT AS quantity_sold
            FROM transaction_details td
            JOIN transactions t ON t.id = td.transaction_id
            LEFT JOIN products p ON p.id = td.product_id
            WHERE t.created_at >= $1 AND t.created_at < $2
            GROUP BY td.product_id
            ORDER BY quantity_sold DESC, td.product_id ASC
            LIMIT 1
            "#,
        )
        .bind(range.from())
        .bind(range.until())
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        let best_selling_product = best
            .map(|row| BestSellingProduct {
                name: row.name,
                quantity_sold: row.quantity_sold,
            })
            .unwrap_or_default();

        Ok(SalesReport {
            total_revenue,
            total_transaction_count,
            best_selling_product,
        })
    }
}
