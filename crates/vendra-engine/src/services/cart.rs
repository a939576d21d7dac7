//! Cart service: per-account cart mutations.
//!
//! ## Concurrency
//! Two simultaneous mutations of one account's cart are the primary hazard:
//! both would read the same lines, mutate independently, and the second
//! save would silently drop the first. Every mutation therefore runs under
//! a per-owner async mutex (load -> mutate -> save is one critical
//! section), and the save itself is a single storage transaction.
//! Different accounts' carts never contend with each other.
//!
//! ## Retry contract
//! `add_or_merge_items` is NOT idempotent: resubmitting the same batch adds
//! the quantities again. Callers must deduplicate retries at the transport
//! layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::AppState;
use vendra_core::{validation, Cart, CartLine};

// =============================================================================
// Request / Response Types
// =============================================================================

/// One incoming cart item from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: String,
    pub quantity: i64,
    pub color: Option<String>,
}

/// Cart read model with product details joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub owner_id: String,
    pub lines: Vec<CartLineView>,
    pub total_cents: i64,
    pub discounted_total_cents: Option<i64>,
}

/// One cart line joined with its product's current details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: String,

    /// Current product name; None if the product has since disappeared
    /// from the catalog.
    pub product_name: Option<String>,

    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub color: Option<String>,
}

// =============================================================================
// Cart Service
// =============================================================================

/// Per-account cart mutations.
pub struct CartService {
    state: Arc<AppState>,

    /// Per-owner mutation locks. The registry itself is guarded by a std
    /// mutex (held only long enough to clone out an entry); the per-owner
    /// locks are async and held across the whole load-mutate-save section.
    locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CartService {
    /// Create a new cart service.
    pub fn new(state: Arc<AppState>) -> Self {
        CartService {
            state,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    fn owner_lock(&self, owner_id: &str) -> Arc<AsyncMutex<()>> {
        let mut registry = self.locks.lock().expect("lock registry poisoned");
        registry
            .entry(owner_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Adds items into the account's cart, creating the cart if missing.
    ///
    /// Lines matched by product id get their quantity INCREASED by the
    /// incoming amount; unmatched items are appended with a price snapshot
    /// read fresh from the catalog. The total is recomputed on save.
    pub async fn add_or_merge_items(
        &self,
        owner_id: &str,
        items: &[CartItemInput],
    ) -> EngineResult<Cart> {
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;

        let mut cart = match self.state.db.carts().find_by_owner(owner_id).await? {
            Some(cart) => cart,
            None => Cart::new(Uuid::new_v4().to_string(), owner_id),
        };

        for item in items {
            validation::validate_quantity(item.quantity)?;

            let merged = cart.merge_add(&item.product_id, item.quantity)?;
            if !merged {
                let price = self
                    .state
                    .db
                    .products()
                    .get_price(&item.product_id)
                    .await?
                    .ok_or_else(|| EngineError::ProductNotFound(item.product_id.clone()))?;
                cart.append_line(CartLine::new(
                    item.product_id.clone(),
                    item.quantity,
                    price,
                    item.color.clone(),
                ))?;
            }
        }

        cart.touch();
        self.state.db.carts().save(&cart).await?;

        info!(owner_id = %owner_id, lines = cart.line_count(), total = cart.total_cents(), "Cart merged");

        Ok(cart)
    }

    /// Replaces quantities in the account's existing cart.
    ///
    /// Unlike `add_or_merge_items`, this fails with `CartNotFound` when no
    /// cart exists yet. Matched lines get their quantity REPLACED; new
    /// items are still appended with a fresh price snapshot.
    pub async fn set_item_quantities(
        &self,
        owner_id: &str,
        items: &[CartItemInput],
    ) -> EngineResult<Cart> {
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;

        let mut cart = self
            .state
            .db
            .carts()
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| EngineError::CartNotFound(owner_id.to_string()))?;

        for item in items {
            validation::validate_quantity(item.quantity)?;

            if !cart.set_quantity(&item.product_id, item.quantity) {
                let price = self
                    .state
                    .db
                    .products()
                    .get_price(&item.product_id)
                    .await?
                    .ok_or_else(|| EngineError::ProductNotFound(item.product_id.clone()))?;
                cart.append_line(CartLine::new(
                    item.product_id.clone(),
                    item.quantity,
                    price,
                    item.color.clone(),
                ))?;
            }
        }

        cart.touch();
        self.state.db.carts().save(&cart).await?;

        info!(owner_id = %owner_id, lines = cart.line_count(), total = cart.total_cents(), "Cart quantities set");

        Ok(cart)
    }

    /// Removes every line for a product from the account's cart.
    pub async fn remove_item(&self, owner_id: &str, product_id: &str) -> EngineResult<Cart> {
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;

        let mut cart = self
            .state
            .db
            .carts()
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| EngineError::CartNotFound(owner_id.to_string()))?;

        if cart.remove_product(product_id) == 0 {
            return Err(EngineError::ProductNotInCart(product_id.to_string()));
        }

        cart.touch();
        self.state.db.carts().save(&cart).await?;

        info!(owner_id = %owner_id, product_id = %product_id, "Cart line removed");

        Ok(cart)
    }

    /// Reads the account's cart with product details joined in.
    /// An absent cart is a valid empty result, not an error.
    pub async fn get_cart(&self, owner_id: &str) -> EngineResult<Option<CartView>> {
        let Some(cart) = self.state.db.carts().find_by_owner(owner_id).await? else {
            return Ok(None);
        };

        let mut lines = Vec::with_capacity(cart.line_count());
        for line in &cart.lines {
            let product = self.state.db.products().get_by_id(&line.product_id).await?;
            lines.push(CartLineView {
                product_id: line.product_id.clone(),
                product_name: product.map(|p| p.name),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total().cents(),
                color: line.color.clone(),
            });
        }

        Ok(Some(CartView {
            owner_id: cart.owner_id.clone(),
            total_cents: cart.total_cents(),
            discounted_total_cents: cart.discounted_total_cents,
            lines,
        }))
    }

    /// Deletes the cart document entirely (explicit empty-cart operation;
    /// also what a post-checkout cleanup would call).
    pub async fn clear_cart(&self, owner_id: &str) -> EngineResult<()> {
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;

        let existed = self.state.db.carts().delete_by_owner(owner_id).await?;
        debug!(owner_id = %owner_id, existed = existed, "Cart cleared");

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
