//! Pricing service: coupon application.
//!
//! Applies a named percentage coupon to a cart total and persists the
//! result as the cart's discounted total. Catalog prices are never touched.
//!
//! The discounted total is sticky: later cart mutations do NOT invalidate
//! it. A checkout that opts into the coupon uses whatever discounted total
//! is on the cart at that moment, current or stale (see DESIGN.md).

use std::sync::Arc;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::AppState;
use vendra_core::{validation, Money};

/// Coupon application service.
pub struct PricingService {
    state: Arc<AppState>,
}

impl PricingService {
    /// Create a new pricing service.
    pub fn new(state: Arc<AppState>) -> Self {
        PricingService { state }
    }

    /// Applies a coupon to the account's cart.
    ///
    /// The discounted total is `round2(total × (1 − percent/100))`, half-up
    /// at the cent boundary. It is persisted on the cart and returned.
    pub async fn apply_coupon(&self, owner_id: &str, coupon_name: &str) -> EngineResult<Money> {
        validation::validate_coupon_name(coupon_name)?;

        let coupon = self
            .state
            .db
            .coupons()
            .find_by_name(coupon_name)
            .await?
            .ok_or_else(|| EngineError::InvalidCoupon(coupon_name.to_string()))?;

        let cart = self
            .state
            .db
            .carts()
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| EngineError::CartNotFound(owner_id.to_string()))?;

        let percent = coupon.discount_percent.clamp(0, 100) as u32;
        let discounted = cart.total().apply_percent_discount(percent);

        self.state
            .db
            .carts()
            .set_discounted_total(owner_id, discounted.cents())
            .await?;

        info!(
            owner_id = %owner_id,
            coupon = %coupon.name,
            percent = coupon.discount_percent,
            discounted = %discounted,
            "Coupon applied"
        );

        Ok(discounted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
