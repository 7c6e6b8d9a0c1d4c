//! # Category Repository
//!
//! Product categories. Only the seed tool writes them; checkout never reads
//! them.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

use crate::error::DbResult;

/// A product category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        debug!(name = %name, "Inserting category");

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
