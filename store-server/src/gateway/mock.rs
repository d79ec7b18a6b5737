//! In-process payment gateway double
//!
//! Stands in for the hosted checkout provider when no secret key is
//! configured (development) and throughout the test suites. Sessions are
//! created unpaid; [`MockGateway::mark_paid`] simulates the customer
//! completing checkout.

use dashmap::DashMap;
use uuid::Uuid;

use super::{
    CheckoutRequest, CheckoutSession, GatewayError, GatewayResult, PaymentGateway, SessionState,
};

#[derive(Debug, Clone)]
struct MockSession {
    order_id: String,
    payment_ref: String,
    paid: bool,
}

#[derive(Debug, Default)]
pub struct MockGateway {
    sessions: DashMap<String, MockSession>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the customer completing the hosted checkout flow
    pub fn mark_paid(&self, session_id: &str) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.paid = true;
        }
    }

    /// Order id a session was created for (test inspection)
    pub fn order_id_for(&self, session_id: &str) -> Option<String> {
        self.sessions.get(session_id).map(|s| s.order_id.clone())
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> GatewayResult<CheckoutSession> {
        let session_id = format!("cs_mock_{}", Uuid::new_v4().simple());
        let payment_ref = format!("pi_mock_{}", Uuid::new_v4().simple());

        self.sessions.insert(
            session_id.clone(),
            MockSession {
                order_id: request.order_id.clone(),
                payment_ref: payment_ref.clone(),
                paid: false,
            },
        );

        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.mock.local/pay/{session_id}"),
            session_id,
            payment_ref: Some(payment_ref),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> GatewayResult<SessionState> {
        let session = self.sessions.get(session_id).ok_or_else(|| {
            GatewayError::Unexpected(format!("No such checkout session: {session_id}"))
        })?;

        Ok(SessionState {
            paid: session.paid,
            payment_ref: Some(session.payment_ref.clone()),
        })
    }
}
