//! Shared test support: state assembly with injected doubles, auth tokens,
//! request payload builders.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};

use store_server::config::Config;
use store_server::gateway::MockGateway;
use store_server::orders::MemoryOrderStore;
use store_server::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret-32-bytes-min!";

/// Configuration for tests; never reads the environment
pub fn test_config() -> Config {
    Config {
        http_port: 0,
        environment: "development".into(),
        database_path: String::new(),
        store_backend: "memory".into(),
        jwt_secret: JWT_SECRET.into(),
        stripe_secret_key: String::new(),
        stripe_api_base: "https://api.stripe.invalid".into(),
        checkout_currency: "inr".into(),
        frontend_url: "http://localhost:5173/".into(),
        gateway_timeout_ms: 1_000,
    }
}

/// App state over an in-memory store and a mock gateway, both returned for
/// direct manipulation
pub fn test_state() -> (AppState, Arc<MemoryOrderStore>, Arc<MockGateway>) {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(MockGateway::new());
    let state = AppState::with_parts(test_config(), store.clone(), gateway.clone());
    (state, store, gateway)
}

/// Bearer token for a regular customer
pub fn customer_token(state: &AppState, user_id: &str) -> String {
    state
        .jwt
        .generate_token(user_id, user_id, "customer")
        .expect("token generation")
}

/// Bearer token for an administrator
pub fn admin_token(state: &AppState) -> String {
    state
        .jwt
        .generate_token("admin-1", "admin", "admin")
        .expect("token generation")
}

/// A well-formed order creation payload
pub fn order_payload(payment_method: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phoneNumber": "+44 20 7946 0001",
        "address": "12 Analytical Way, London",
        "items": [
            { "productId": "watch-chrono", "name": "Chronograph", "price": 100.00, "qty": 2 },
            { "productId": "watch-field", "name": "Field Watch", "price": 50.00, "qty": 1 },
        ],
        "paymentMethod": payment_method,
    })
}
