//! Application state
//!
//! `AppState` holds the injected service graph: order store, payment
//! gateway, JWT validation and the order service wired over them. No
//! process-wide singletons; everything reaches handlers through this state.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::config::Config;
use crate::db::{DbService, SqliteOrderStore};
use crate::gateway::{MockGateway, PaymentGateway, StripeGateway};
use crate::orders::{CheckoutConfig, MemoryOrderStore, OrderService, OrderStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt: Arc<JwtService>,
    pub orders: OrderService,
}

impl AppState {
    /// Initialize state from configuration: open the store backend, select
    /// the gateway implementation, wire the order service.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn OrderStore> = match config.store_backend.as_str() {
            "memory" => {
                tracing::warn!("Using in-memory order store; orders will not survive restarts");
                Arc::new(MemoryOrderStore::new())
            }
            "sqlite" => {
                let db = DbService::new(&config.database_path).await?;
                Arc::new(SqliteOrderStore::new(db.pool))
            }
            other => return Err(format!("Unknown STORE_BACKEND: {other}").into()),
        };

        let gateway: Arc<dyn PaymentGateway> = if config.stripe_secret_key.is_empty() {
            if !config.is_development() {
                return Err("STRIPE_SECRET_KEY must be set outside development".into());
            }
            tracing::warn!("STRIPE_SECRET_KEY not set; using the mock payment gateway");
            Arc::new(MockGateway::new())
        } else {
            Arc::new(StripeGateway::new(
                config.stripe_secret_key.clone(),
                config.stripe_api_base.clone(),
                config.gateway_timeout_ms,
            ))
        };

        Ok(Self::with_parts(config.clone(), store, gateway))
    }

    /// Assemble state from explicit parts (tests inject their own store and
    /// gateway doubles here).
    pub fn with_parts(
        config: Config,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let checkout = CheckoutConfig {
            currency: config.checkout_currency.clone(),
            success_url: config.checkout_success_url(),
            cancel_url: config.checkout_cancel_url(),
        };
        let jwt = Arc::new(JwtService::new(&config.jwt_secret));
        let orders = OrderService::new(store, gateway, checkout);

        Self {
            config,
            jwt,
            orders,
        }
    }
}
