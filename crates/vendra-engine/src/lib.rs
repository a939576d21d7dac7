//! # vendra-engine
//!
//! The operation surface of the Vendra commerce engine: the authentication
//! lifecycle and the cart -> coupon -> order transaction pipeline.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Engine Services                                 │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ SessionService │  │  CartService   │  │ PricingService             ││
//! │  │                │  │                │  │  • apply_coupon            ││
//! │  │ • login        │  │ • add_or_merge │  └────────────────────────────┘│
//! │  │ • refresh      │  │ • set_qty      │  ┌────────────────────────────┐│
//! │  │ • logout       │  │ • remove/get   │  │ OrderService               ││
//! │  │ • reset/change │  │ • clear        │  │  • create_order            ││
//! │  │ • block/admin  │  └────────────────┘  │  • list/status             ││
//! │  └────────────────┘                      └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                              │  │
//! │  │   SQLite (vendra-db)  •  JWT (token)  •  argon2 (password)       │  │
//! │  │   Notifier capability  •  IdentityProvider capability            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Binding a transport
//! A transport derives the caller identity from the verified access token
//! ([`JwtManager::authenticate`]) and maps [`EngineError::kind`] onto its
//! status codes. The engine itself never trusts a client-supplied account
//! id for self-scoped operations.
//!
//! ## Configuration
//! Environment variables (see [`EngineConfig::load`]):
//! - `DATABASE_PATH` - SQLite database path
//! - `JWT_SECRET` - token signing secret
//! - `ACCESS_TOKEN_TTL_SECS` - access token lifetime (default 24h)
//! - `REFRESH_TOKEN_TTL_SECS` - refresh token lifetime (default 72h)
//! - `RESET_TOKEN_TTL_MINS` - reset token validity (default 30)

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod identity;
pub mod notifier;
pub mod password;
pub mod reset;
pub mod services;
pub mod token;

// Re-exports
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use notifier::{LogNotifier, Notifier};
pub use services::cart::CartService;
pub use services::order::OrderService;
pub use services::pricing::PricingService;
pub use services::session::SessionService;
pub use token::{CallerIdentity, JwtManager};

use vendra_db::Database;

/// Shared application state, constructed once at startup and passed into
/// each service (no global connection state). `db` owns connect/disconnect;
/// call `state.db.close()` on shutdown.
pub struct AppState {
    pub db: Database,
    pub config: EngineConfig,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Bundles the injected pieces into the shared state.
    pub fn new(db: Database, config: EngineConfig, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Arc::new(AppState {
            db,
            config,
            notifier,
        })
    }
}

// =============================================================================
// Test Support
// =============================================================================
