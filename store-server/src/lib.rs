//! Store Server - storefront order & payment backend
//!
//! # Modules
//!
//! ```text
//! store-server/src/
//! ├── config.rs      # environment-driven configuration
//! ├── state.rs       # AppState: injected store + gateway + services
//! ├── api/           # HTTP routes and handlers
//! ├── auth/          # JWT validation, caller identity extractors
//! ├── orders/        # order domain: model, pricing, normalization,
//! │                  #   store contract, in-memory store, services
//! ├── gateway/       # payment gateway adapter (Stripe REST + mock)
//! ├── db/            # SQLite pool and order store
//! └── utils/         # errors, money, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod gateway;
pub mod orders;
pub mod state;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use state::AppState;
pub use utils::{AppError, AppResult};
