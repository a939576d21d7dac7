//! # Repositories
//!
//! One repository per aggregate. Repositories are cheap, short-lived values
//! constructed from the pool by the [`Database`](crate::Database) handle.
//!
//! Multi-row writes (cart save, order insert) run inside a single
//! transaction so a partial write is never observable.

pub mod account;
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
