//! # Domain Types
//!
//! Core domain types for the commerce engine: accounts, products, coupons,
//! and orders.
//!
//! ## Dual-Key Identity Pattern
//! Entities carry a UUID v4 `id` used for storage relations. Accounts are
//! additionally unique by `email` and `mobile`, coupons by `name` - the
//! business identifiers the outside world uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Account
// =============================================================================

/// Role attached to an account and carried inside access-token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Customer,
    Admin,
}

impl AccountRole {
    /// Stable string form used in storage and token claims.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Customer => "customer",
            AccountRole::Admin => "admin",
        }
    }

    /// Parses the stable string form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(AccountRole::Customer),
            "admin" => Some(AccountRole::Admin),
            _ => None,
        }
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self, AccountRole::Admin)
    }
}

impl Default for AccountRole {
    fn default() -> Self {
        AccountRole::Customer
    }
}

/// An account record as stored.
///
/// `refresh_token` is single-valued: one active session per account, the
/// last login wins. `reset_token_hash` holds only a one-way digest of the
/// password-reset token - the plaintext is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login identifier, unique across accounts.
    pub email: String,

    pub first_name: String,
    pub last_name: String,

    /// Contact number, unique across accounts.
    pub mobile: String,

    /// Salted one-way hash of the password. Never leaves the storage layer
    /// except for verification.
    pub password_hash: String,

    pub role: AccountRole,

    /// Administrative block flag. Toggled by block/unblock operations.
    pub blocked: bool,

    /// The currently active refresh token, if a session exists.
    pub refresh_token: Option<String>,

    /// SHA-256 hex digest of the outstanding password-reset token.
    pub reset_token_hash: Option<String>,

    /// Expiry of the outstanding password-reset token.
    pub reset_token_expires: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// The public subset of the account, safe to return to callers.
    /// Excludes the password hash and all token material.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            mobile: self.mobile.clone(),
            role: self.role,
        }
    }
}

/// Public account projection returned from login and admin reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub role: AccountRole,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. The engine only reads prices and adjusts stock;
/// catalog management itself lives outside this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. Decremented at checkout.
    pub stock_quantity: i64,

    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A named percentage discount. Read-only from the engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Coupon {
    /// Unique coupon code, e.g. "SAVE10".
    pub name: String,

    /// Whole-percentage discount in 0..=100.
    pub discount_percent: i64,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// Supported payment methods. Only cash on delivery is implemented;
/// the enum leaves room for card/wallet intents later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "COD"))]
    CashOnDelivery,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "COD",
        }
    }
}

/// Payment metadata recorded on an order at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Generated unique token identifying this payment.
    pub id: String,

    pub method: PaymentMethod,

    /// Final charged amount in cents (discounted total when a coupon was
    /// applied at checkout, the plain cart total otherwise).
    pub amount_cents: i64,

    /// Free-text payment status; mirrors the order status on transitions.
    pub status: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// Transitions are only accepted for values in this set; anything else is
/// rejected as an invalid status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum OrderStatus {
    Processing,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Cash on Delivery"))]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::CashOnDelivery => "Cash on Delivery",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Parses a status string. Returns `None` for anything outside the
    /// enumerated set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Processing" => Some(OrderStatus::Processing),
            "Cash on Delivery" => Some(OrderStatus::CashOnDelivery),
            "Shipped" => Some(OrderStatus::Shipped),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line in an order. Snapshot pattern: quantity and unit price are copied
/// from the cart at commit time, so later cart or catalog changes never
/// retroactively alter a committed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,

    /// Unit price in cents at commit time (frozen).
    pub unit_price_cents: i64,

    /// Color variant chosen in the cart, if any.
    pub color: Option<String>,
}

impl OrderLine {
    /// Line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// An immutable record of a completed checkout.
///
/// Created exactly once per checkout; only `status` (and the mirrored
/// payment status) transitions afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub owner_id: String,
    pub lines: Vec<OrderLine>,
    pub payment: PaymentIntent,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The charged amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.payment.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(AccountRole::parse("customer"), Some(AccountRole::Customer));
        assert_eq!(AccountRole::parse("admin"), Some(AccountRole::Admin));
        assert_eq!(AccountRole::parse("root"), None);
        assert_eq!(AccountRole::Admin.as_str(), "admin");
        assert!(AccountRole::Admin.is_admin());
        assert!(!AccountRole::Customer.is_admin());
    }

    #[test]
    fn test_role_default() {
        assert_eq!(AccountRole::default(), AccountRole::Customer);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("Processing"), Some(OrderStatus::Processing));
        assert_eq!(
            OrderStatus::parse("Cash on Delivery"),
            Some(OrderStatus::CashOnDelivery)
        );
        assert_eq!(OrderStatus::parse("Shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("Delivered"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("Cancelled"), Some(OrderStatus::Cancelled));
        // Anything outside the set is rejected, including case variants
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("Lost"), None);
    }

    #[test]
    fn test_order_status_display_roundtrip() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::CashOnDelivery,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            product_id: "p1".to_string(),
            quantity: 3,
            unit_price_cents: 299,
            color: None,
        };
        assert_eq!(line.line_total().cents(), 897);
    }

    #[test]
    fn test_profile_excludes_secrets() {
        let account = Account {
            id: "a1".to_string(),
            email: "jo@example.com".to_string(),
            first_name: "Jo".to_string(),
            last_name: "Doe".to_string(),
            mobile: "5551234567".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: AccountRole::Customer,
            blocked: false,
            refresh_token: Some("secret".to_string()),
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = account.profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("secret"));
        assert!(json.contains("jo@example.com"));
    }
}
