//! # Product Repository
//!
//! The engine's narrow view of the catalog: price lookups for cart
//! snapshots and relative stock adjustments at checkout.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendra_core::Product;

/// Repository for catalog products.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product (seeding and tests; catalog management is external).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, stock_quantity, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, stock_quantity, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Current price of a product in cents, if the product exists.
    /// Used for cart line snapshots.
    pub async fn get_price(&self, id: &str) -> DbResult<Option<i64>> {
        let price = sqlx::query_scalar::<_, i64>(
            "SELECT price_cents FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Adjusts the stock level by a delta in a single relative UPDATE.
    ///
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ❌ WRONG: read quantity, subtract, write back                      │
    /// │     (two concurrent checkouts lose an update)                       │
    /// │                                                                     │
    /// │  ✅ CORRECT: relative update, atomic at the storage layer           │
    /// │     UPDATE products SET stock_quantity = stock_quantity - 3         │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Arguments
    /// * `id` - Product ID
    /// * `delta` - Change in stock (negative for checkout decrements)
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn test_product(id: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents,
            stock_quantity: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_price_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&test_product("p1", 1099, 10)).await.unwrap();

        assert_eq!(repo.get_price("p1").await.unwrap(), Some(1099));
        assert_eq!(repo.get_price("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_adjust_stock_is_relative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&test_product("p1", 1099, 10)).await.unwrap();

        repo.adjust_stock("p1", -3).await.unwrap();
        repo.adjust_stock("p1", -2).await.unwrap();
        let product = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 5);

        let err = repo.adjust_stock("missing", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
