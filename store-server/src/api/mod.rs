//! API routes
//!
//! - [`health`] - liveness probe
//! - [`orders`] - order lifecycle and administration

pub mod health;
pub mod orders;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router with middleware and state applied
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(orders::router())
        // CORS - the storefront frontend runs on its own origin
        .layer(CorsLayer::permissive())
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
