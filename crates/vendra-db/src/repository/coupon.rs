//! # Coupon Repository
//!
//! Read path for named percentage discounts. Coupon management is external;
//! the engine only looks codes up (plus inserts for seeding and tests).

use sqlx::SqlitePool;

use crate::error::DbResult;
use vendra_core::Coupon;

/// Repository for coupons.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon. Duplicate names violate the primary key.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO coupons (name, discount_percent, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&coupon.name)
        .bind(coupon.discount_percent)
        .bind(coupon.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Looks a coupon up by its unique name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT name, discount_percent, created_at FROM coupons WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
