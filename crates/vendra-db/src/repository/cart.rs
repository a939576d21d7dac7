//! # Cart Repository
//!
//! Persistence for the one-cart-per-account aggregate. A cart is stored as
//! a parent row plus ordered line rows; `save` replaces the whole document
//! inside a single transaction, so concurrent readers never observe a cart
//! whose stored total disagrees with its lines.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendra_core::{Cart, CartLine};

/// Parent row of the cart document.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CartRow {
    id: String,
    owner_id: String,
    discounted_total_cents: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for cart documents.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the cart owned by `owner_id`, lines in insertion order.
    /// An absent cart is a valid result, not an error.
    pub async fn find_by_owner(&self, owner_id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, owner_id, discounted_total_cents, created_at, updated_at
            FROM carts
            WHERE owner_id = ?1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT product_id, quantity, unit_price_cents, color
            FROM cart_items
            WHERE cart_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Cart {
            id: row.id,
            owner_id: row.owner_id,
            lines,
            discounted_total_cents: row.discounted_total_cents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Writes the cart document: upserts the parent row (keyed by owner) and
    /// replaces the line rows, all in one transaction. The stored total is
    /// recomputed from the lines here, never trusted from a previous read.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        debug!(owner_id = %cart.owner_id, lines = cart.line_count(), "Saving cart");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (
                id, owner_id, cart_total_cents, discounted_total_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(owner_id) DO UPDATE SET
                cart_total_cents = excluded.cart_total_cents,
                discounted_total_cents = excluded.discounted_total_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&cart.id)
        .bind(&cart.owner_id)
        .bind(cart.total_cents())
        .bind(cart.discounted_total_cents)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&mut *tx)
        .await?;

        // The stored row keeps its original id on conflict, so attach line
        // rows to whatever id actually lives in the table.
        let cart_id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM carts WHERE owner_id = ?1",
        )
        .bind(&cart.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart_id)
            .execute(&mut *tx)
            .await?;

        for (position, line) in cart.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (
                    id, cart_id, product_id, quantity, unit_price_cents,
                    color, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&cart_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(&line.color)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Persists a discounted total on the cart (sticky until the next
    /// coupon application or cart deletion).
    pub async fn set_discounted_total(&self, owner_id: &str, cents: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE carts
            SET discounted_total_cents = ?2, updated_at = ?3
            WHERE owner_id = ?1
            "#,
        )
        .bind(owner_id)
        .bind(cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", owner_id));
        }

        Ok(())
    }

    /// Deletes the cart document entirely (line rows cascade).
    /// Returns whether a cart existed.
    pub async fn delete_by_owner(&self, owner_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE owner_id = ?1")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vendra_core::{Account, AccountRole};

    async fn seed_account(db: &Database, id: &str) {
        let now = Utc::now();
        db.accounts()
            .insert(&Account {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                mobile: format!("55512{:04}", id.len()),
                password_hash: "$argon2id$stub".to_string(),
                role: AccountRole::Customer,
                blocked: false,
                refresh_token: None,
                reset_token_hash: None,
                reset_token_expires: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_account(&db, "a1").await;
        let repo = db.carts();

        assert!(repo.find_by_owner("a1").await.unwrap().is_none());

        let mut cart = Cart::new(Uuid::new_v4().to_string(), "a1");
        cart.append_line(CartLine::new("p1", 2, 1000, None)).unwrap();
        cart.append_line(CartLine::new("p2", 1, 500, Some("red".into())))
            .unwrap();
        repo.save(&cart).await.unwrap();

        let loaded = repo.find_by_owner("a1").await.unwrap().unwrap();
        assert_eq!(loaded.line_count(), 2);
        assert_eq!(loaded.lines[0].product_id, "p1");
        assert_eq!(loaded.lines[1].color.as_deref(), Some("red"));
        assert_eq!(loaded.total_cents(), 2500);
        assert_eq!(loaded.discounted_total_cents, None);
    }

    #[tokio::test]
    async fn test_save_replaces_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_account(&db, "a1").await;
        let repo = db.carts();

        let mut cart = Cart::new(Uuid::new_v4().to_string(), "a1");
        cart.append_line(CartLine::new("p1", 2, 1000, None)).unwrap();
        repo.save(&cart).await.unwrap();

        let mut cart = repo.find_by_owner("a1").await.unwrap().unwrap();
        cart.set_quantity("p1", 5);
        repo.save(&cart).await.unwrap();

        let loaded = repo.find_by_owner("a1").await.unwrap().unwrap();
        assert_eq!(loaded.line_count(), 1);
        assert_eq!(loaded.lines[0].quantity, 5);
        assert_eq!(loaded.total_cents(), 5000);
    }

    #[tokio::test]
    async fn test_discounted_total_survives_save() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_account(&db, "a1").await;
        let repo = db.carts();

        let mut cart = Cart::new(Uuid::new_v4().to_string(), "a1");
        cart.append_line(CartLine::new("p1", 1, 10000, None)).unwrap();
        repo.save(&cart).await.unwrap();

        repo.set_discounted_total("a1", 9000).await.unwrap();

        // A later mutation keeps the (now possibly stale) discount in place
        let mut cart = repo.find_by_owner("a1").await.unwrap().unwrap();
        cart.merge_add("p1", 1).unwrap();
        cart.touch();
        repo.save(&cart).await.unwrap();

        let loaded = repo.find_by_owner("a1").await.unwrap().unwrap();
        assert_eq!(loaded.discounted_total_cents, Some(9000));
        assert_eq!(loaded.total_cents(), 20000);
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_account(&db, "a1").await;
        let repo = db.carts();

        let mut cart = Cart::new(Uuid::new_v4().to_string(), "a1");
        cart.append_line(CartLine::new("p1", 1, 1000, None)).unwrap();
        repo.save(&cart).await.unwrap();

        assert!(repo.delete_by_owner("a1").await.unwrap());
        assert!(repo.find_by_owner("a1").await.unwrap().is_none());
        // Idempotent: deleting again reports nothing to delete
        assert!(!repo.delete_by_owner("a1").await.unwrap());

        let err = repo.set_discounted_total("a1", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
