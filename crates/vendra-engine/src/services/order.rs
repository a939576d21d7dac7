//! Order service: checkout and order lifecycle.
//!
//! Materializes an immutable order from the account's cart, records the
//! payment intent, and issues per-line stock decrements.
//!
//! ## Partial-failure policy
//! Stock decrements are attempted independently per line and are
//! best-effort: a failed decrement is logged and the order stands. The
//! decrement itself is a single relative UPDATE, so concurrent checkouts
//! never lose stock updates - but there is no reservation step and no
//! rollback of sibling lines.
//!
//! ## Cart afterlife
//! Checkout does NOT clear the cart. Checking out twice without clearing in
//! between creates two orders and decrements stock twice (see DESIGN.md).

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::AppState;
use vendra_core::{Order, OrderLine, OrderStatus, PaymentIntent, PaymentMethod};

// =============================================================================
// Request Types
// =============================================================================

/// Checkout input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Only cash-on-delivery is supported; false is rejected.
    pub cash_on_delivery: bool,

    /// Whether to charge the cart's discounted total (when one is present)
    /// instead of the plain total.
    pub coupon_applied: bool,
}

// =============================================================================
// Order Service
// =============================================================================

/// Checkout and order lifecycle service.
pub struct OrderService {
    state: Arc<AppState>,
}

impl OrderService {
    /// Create a new order service.
    pub fn new(state: Arc<AppState>) -> Self {
        OrderService { state }
    }

    /// Creates an order from the account's cart.
    ///
    /// The final amount is the cart's discounted total when
    /// `coupon_applied` is set and a discounted total is present, else the
    /// plain cart total. Lines are snapshotted verbatim; the live cart is
    /// left in place.
    pub async fn create_order(
        &self,
        owner_id: &str,
        request: CheckoutRequest,
    ) -> EngineResult<Order> {
        if !request.cash_on_delivery {
            return Err(EngineError::PaymentMethodUnsupported(
                "only cash on delivery is supported".to_string(),
            ));
        }

        let cart = self
            .state
            .db
            .carts()
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| EngineError::CartNotFound(owner_id.to_string()))?;

        let amount_cents = match (request.coupon_applied, cart.discounted_total_cents) {
            (true, Some(discounted)) => discounted,
            _ => cart.total_cents(),
        };

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            lines: cart
                .lines
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                    color: line.color.clone(),
                })
                .collect(),
            payment: PaymentIntent {
                id: Uuid::new_v4().to_string(),
                method: PaymentMethod::CashOnDelivery,
                amount_cents,
                status: OrderStatus::CashOnDelivery.as_str().to_string(),
                created_at: now,
            },
            status: OrderStatus::CashOnDelivery,
            created_at: now,
            updated_at: now,
        };

        self.state.db.orders().insert(&order).await?;

        // Best-effort per-line decrement; a failed line does not roll back
        // the order or the other lines.
        for line in &order.lines {
            if let Err(err) = self
                .state
                .db
                .products()
                .adjust_stock(&line.product_id, -line.quantity)
                .await
            {
                warn!(
                    order_id = %order.id,
                    product_id = %line.product_id,
                    error = %err,
                    "Stock decrement failed; order stands"
                );
            }
        }

        info!(
            order_id = %order.id,
            owner_id = %owner_id,
            amount = amount_cents,
            lines = order.lines.len(),
            "Order created"
        );

        Ok(order)
    }

    /// Lists the account's orders.
    pub async fn list_orders(&self, owner_id: &str) -> EngineResult<Vec<Order>> {
        Ok(self.state.db.orders().list_by_owner(owner_id).await?)
    }

    /// Admin read: every order in the system.
    pub async fn list_all_orders(&self) -> EngineResult<Vec<Order>> {
        Ok(self.state.db.orders().list_all().await?)
    }

    /// Admin read: one order by id.
    pub async fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        self.state
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            })
    }

    /// Transitions an order's status. Only values in the enumerated status
    /// set are accepted; anything else fails with `InvalidStatus`.
    pub async fn update_order_status(&self, order_id: &str, status: &str) -> EngineResult<Order> {
        let parsed = OrderStatus::parse(status)
            .ok_or_else(|| EngineError::InvalidStatus(status.to_string()))?;

        self.state.db.orders().update_status(order_id, parsed).await?;

        info!(order_id = %order_id, status = %parsed, "Order status updated");

        self.get_order(order_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cart::{CartItemInput, CartService};
    use crate::services::pricing::PricingService;
    use crate::testing;

    fn item(product_id: &str, quantity: i64) -> CartItemInput {
        CartItemInput {
            product_id: product_id.to_string(),
            quantity,
            color: None,
        }
    }

    fn cod(coupon_applied: bool) -> CheckoutRequest {
        CheckoutRequest {
            cash_on_delivery: true,
            coupon_applied,
        }
    }

    #[tokio::test]
    async fn test_create_order_snapshots_cart() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_product(&state, "p1", 1000, 50).await;
        testing::seed_product(&state, "p2", 500, 20).await;
        let carts = CartService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts
            .add_or_merge_items("a1", &[item("p1", 2), item("p2", 1)])
            .await
            .unwrap();

        let order = orders.create_order("a1", cod(false)).await.unwrap();
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.payment.amount_cents, 2500);
        assert_eq!(order.payment.method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.status, OrderStatus::CashOnDelivery);

        // Stock decremented per line
        let p1 = state.db.products().get_by_id("p1").await.unwrap().unwrap();
        let p2 = state.db.products().get_by_id("p2").await.unwrap().unwrap();
        assert_eq!(p1.stock_quantity, 48);
        assert_eq!(p2.stock_quantity, 19);

        // Later cart mutations don't touch the committed order
        carts.add_or_merge_items("a1", &[item("p1", 5)]).await.unwrap();
        let reloaded = orders.get_order(&order.id).await.unwrap();
        assert_eq!(reloaded.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_rejects_non_cod() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        let orders = OrderService::new(state);

        let err = orders
            .create_order(
                "a1",
                CheckoutRequest {
                    cash_on_delivery: false,
                    coupon_applied: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PaymentMethodUnsupported(_)));
    }

    #[tokio::test]
    async fn test_requires_cart() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        let orders = OrderService::new(state);

        let err = orders.create_order("a1", cod(false)).await.unwrap_err();
        assert!(matches!(err, EngineError::CartNotFound(_)));
    }

    #[tokio::test]
    async fn test_coupon_amount_selection() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_product(&state, "p1", 10000, 50).await;
        testing::seed_coupon(&state, "SAVE10", 10).await;
        let carts = CartService::new(state.clone());
        let pricing = PricingService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts.add_or_merge_items("a1", &[item("p1", 1)]).await.unwrap();
        pricing.apply_coupon("a1", "SAVE10").await.unwrap();

        // coupon_applied uses the discounted total
        let order = orders.create_order("a1", cod(true)).await.unwrap();
        assert_eq!(order.payment.amount_cents, 9000);

        // without the flag, the plain total is charged even though a
        // discounted total is present
        let order = orders.create_order("a1", cod(false)).await.unwrap();
        assert_eq!(order.payment.amount_cents, 10000);
    }

    #[tokio::test]
    async fn test_coupon_flag_without_discount_falls_back() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_product(&state, "p1", 10000, 50).await;
        let carts = CartService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts.add_or_merge_items("a1", &[item("p1", 1)]).await.unwrap();
        let order = orders.create_order("a1", cod(true)).await.unwrap();
        assert_eq!(order.payment.amount_cents, 10000);
    }

    #[tokio::test]
    async fn test_double_checkout_double_decrements() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_product(&state, "p1", 1000, 50).await;
        let carts = CartService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts.add_or_merge_items("a1", &[item("p1", 3)]).await.unwrap();

        // The cart survives checkout, so a second checkout without clearing
        // creates a second order and decrements again - bounded by the two
        // calls, no more.
        orders.create_order("a1", cod(false)).await.unwrap();
        orders.create_order("a1", cod(false)).await.unwrap();

        let p1 = state.db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p1.stock_quantity, 50 - 3 - 3);

        assert_eq!(orders.list_orders("a1").await.unwrap().len(), 2);
        assert!(state.db.carts().find_by_owner("a1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_product_decrement_does_not_fail_order() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_product(&state, "p1", 1000, 50).await;
        let carts = CartService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts.add_or_merge_items("a1", &[item("p1", 1)]).await.unwrap();

        // The product disappears from the catalog between carting and
        // checkout; the decrement fails but the order still commits.
        sqlx::query("DELETE FROM products WHERE id = 'p1'")
            .execute(state.db.pool())
            .await
            .unwrap();

        let order = orders.create_order("a1", cod(false)).await.unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(orders.list_orders("a1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_order_status_guards_the_set() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_product(&state, "p1", 1000, 50).await;
        let carts = CartService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts.add_or_merge_items("a1", &[item("p1", 1)]).await.unwrap();
        let order = orders.create_order("a1", cod(false)).await.unwrap();

        let updated = orders
            .update_order_status(&order.id, "Shipped")
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.payment.status, "Shipped");

        // Free-form strings are rejected
        let err = orders
            .update_order_status(&order.id, "Lost in transit")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatus(_)));

        let err = orders
            .update_order_status("missing", "Shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_all_orders() {
        let state = testing::state().await;
        testing::seed_account(&state, "a1").await;
        testing::seed_account(&state, "a2").await;
        testing::seed_product(&state, "p1", 1000, 50).await;
        let carts = CartService::new(state.clone());
        let orders = OrderService::new(state.clone());

        carts.add_or_merge_items("a1", &[item("p1", 1)]).await.unwrap();
        carts.add_or_merge_items("a2", &[item("p1", 2)]).await.unwrap();
        orders.create_order("a1", cod(false)).await.unwrap();
        orders.create_order("a2", cod(false)).await.unwrap();

        assert_eq!(orders.list_all_orders().await.unwrap().len(), 2);
        assert_eq!(orders.list_orders("a1").await.unwrap().len(), 1);
        assert_eq!(orders.list_orders("a2").await.unwrap().len(), 1);
    }
}
