//! Payment gateway adapter
//!
//! Contract for the external hosted-checkout provider: create a checkout
//! session, retrieve a session's authoritative payment state. The production
//! implementation talks to the Stripe REST API ([`stripe::StripeGateway`]);
//! [`mock::MockGateway`] is the in-process double for tests and keyless
//! development environments.

pub mod mock;
pub mod stripe;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockGateway;
pub use stripe::StripeGateway;

/// One line of a checkout request, price in minor currency units
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    pub name: String,
    pub unit_minor_amount: i64,
    pub quantity: i64,
}

/// Request for a new hosted checkout session
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Ties the session back to the order during reconciliation
    pub order_id: String,
}

/// A created checkout session
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
    pub payment_ref: Option<String>,
}

/// Authoritative payment state of an existing session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub paid: bool,
    pub payment_ref: Option<String>,
}

/// Gateway failures: unreachable provider or an unexpected response.
/// Both are retryable from the caller's point of view.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected gateway response: {0}")]
    Unexpected(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// External hosted-checkout provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> GatewayResult<CheckoutSession>;

    async fn retrieve_session(&self, session_id: &str) -> GatewayResult<SessionState>;
}
