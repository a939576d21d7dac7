//! # Services
//!
//! The engine's operation surface, one service per concern:
//!
//! - [`session`] - login, refresh, logout, password reset, account admin
//! - [`cart`] - per-account cart mutations
//! - [`pricing`] - coupon application
//! - [`order`] - checkout, order reads, status transitions
//!
//! Services are constructed once at startup from the shared
//! [`AppState`](crate::AppState) and are cheap to clone around. Self-scoped
//! operations take an account id that callers must derive from a verified
//! access token (see [`JwtManager::authenticate`](crate::token::JwtManager)),
//! never from a client-supplied field.

pub mod cart;
pub mod order;
pub mod pricing;
pub mod session;
