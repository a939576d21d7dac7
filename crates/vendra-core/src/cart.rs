//! # Cart Aggregate
//!
//! The mutable pre-purchase collection of line items owned by one account.
//!
//! ## Invariants
//! - One cart per account (enforced by storage; modeled here via `owner_id`)
//! - Lines are matched by `product_id`
//! - `total()` is always the sum of `unit_price × quantity` over all lines -
//!   it is derived, never stored independently of the lines
//! - Maximum lines and per-line quantity are capped (see crate constants)
//!
//! ## Merge vs Replace
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  merge_add:    existing line quantity INCREASES by the incoming amount │
//! │                (add {A, qty 2} then {A, qty 3} => one line, qty 5)     │
//! │                                                                         │
//! │  set_quantity: existing line quantity is REPLACED by the incoming      │
//! │                amount (add qty 2 then set qty 5 => qty 5, not 7)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The unit price of a line is a snapshot taken when the line is appended;
//! merging more quantity onto an existing line keeps the original snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// A line item in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub product_id: String,

    /// Quantity in cart, always > 0.
    pub quantity: i64,

    /// Price in cents captured when the line was appended (frozen until the
    /// line is removed; merges do not refresh it).
    pub unit_price_cents: i64,

    /// Optional color variant.
    pub color: Option<String>,
}

impl CartLine {
    pub fn new(
        product_id: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
        color: Option<String>,
    ) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
            unit_price_cents,
            color,
        }
    }

    /// Line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The cart aggregate for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub owner_id: String,

    /// Ordered line items, matched by product id.
    pub lines: Vec<CartLine>,

    /// Discounted total persisted by coupon application. Sticky: cart
    /// mutations leave it in place until a coupon is applied again or the
    /// cart is deleted.
    pub discounted_total_cents: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for an account.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: id.into(),
            owner_id: owner_id.into(),
            lines: Vec::new(),
            discounted_total_cents: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks whether a line for `product_id` exists.
    pub fn has_line(&self, product_id: &str) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }

    /// Adds `quantity` onto an existing line for `product_id`.
    ///
    /// Returns `Ok(true)` when an existing line absorbed the quantity,
    /// `Ok(false)` when no line matched (the caller appends a fresh line
    /// with a current price snapshot instead).
    pub fn merge_add(&mut self, product_id: &str, quantity: i64) -> Result<bool, CoreError> {
        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return Ok(false);
        };
        let merged = line.quantity + quantity;
        if merged > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: merged,
                max: MAX_LINE_QUANTITY,
            });
        }
        line.quantity = merged;
        Ok(true)
    }

    /// Replaces the quantity of an existing line for `product_id`.
    ///
    /// Returns `true` when a line was updated, `false` when no line matched.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
            true
        } else {
            false
        }
    }

    /// Appends a new line, guarding the cart size cap.
    pub fn append_line(&mut self, line: CartLine) -> Result<(), CoreError> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }
        self.lines.push(line);
        Ok(())
    }

    /// Removes every line matching `product_id` (defends against duplicate
    /// line anomalies). Returns the number of lines removed.
    pub fn remove_product(&mut self, product_id: &str) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        before - self.lines.len()
    }

    /// The cart total: sum of line totals. Always derived from the lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The cart total in cents.
    #[inline]
    pub fn total_cents(&self) -> i64 {
        self.total().cents()
    }

    /// The sticky discounted total, if a coupon has been applied.
    pub fn discounted_total(&self) -> Option<Money> {
        self.discounted_total_cents.map(Money::from_cents)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Stamps the cart as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
