//! # vendra-db: Storage Layer for the Vendra Commerce Engine
//!
//! SQLite-backed persistence: connection pooling, embedded migrations, and
//! one repository per aggregate.
//!
//! ## Layout
//! - [`pool`] - `DbConfig` + `Database` handle (connect/disconnect bound to
//!   process lifecycle; repositories are handed out from here)
//! - [`migrations`] - embedded schema migrations
//! - [`error`] - `DbError` with sqlx error mapping
//! - [`repository`] - accounts, products, carts, orders, coupons
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./vendra.db")).await?;
//! let account = db.accounts().get_by_email("jo@example.com").await?;
//! db.close().await; // on shutdown
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::account::AccountRepository;
pub use repository::cart::CartRepository;
pub use repository::coupon::CouponRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
