//! # Order Repository
//!
//! Persistence for immutable checkout records. The payment intent is
//! flattened onto the order row; lines are snapshot rows written in the
//! same transaction as the parent. After insert, only the status columns
//! ever change.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendra_core::{Order, OrderLine, OrderStatus, PaymentIntent, PaymentMethod};

/// Flat order row; assembled into the domain aggregate with its lines.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: String,
    owner_id: String,
    order_status: OrderStatus,
    payment_id: String,
    payment_method: PaymentMethod,
    payment_amount_cents: i64,
    payment_status: String,
    payment_created_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            owner_id: self.owner_id,
            lines,
            payment: PaymentIntent {
                id: self.payment_id,
                method: self.payment_method,
                amount_cents: self.payment_amount_cents,
                status: self.payment_status,
                created_at: self.payment_created_at,
            },
            status: self.order_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, owner_id, order_status, payment_id, payment_method, \
     payment_amount_cents, payment_status, payment_created_at, created_at, updated_at";

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and its line snapshot in one transaction.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, owner_id = %order.owner_id, lines = order.lines.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, owner_id, order_status,
                payment_id, payment_method, payment_amount_cents,
                payment_status, payment_created_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order.id)
        .bind(&order.owner_id)
        .bind(order.status)
        .bind(&order.payment.id)
        .bind(order.payment.method)
        .bind(order.payment.amount_cents)
        .bind(&order.payment.status)
        .bind(order.payment.created_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity, unit_price_cents,
                    color, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order.id)
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

    /// Gets an order by ID with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = self.get_lines(&row.id).await?;
        Ok(Some(row.into_order(lines)))
    }

    /// Lists one account's orders, oldest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE owner_id = ?1 ORDER BY created_at"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Lists every order (admin read).
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Transitions the order status; the payment status mirrors it.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET order_status = ?2, payment_status = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT product_id, quantity, unit_price_cents, color
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.get_lines(&row.id).await?;
            orders.push(row.into_order(lines));
        }
        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
