//! Stripe Checkout integration via REST API (no SDK dependency)

use std::time::Duration;

use super::{
    CheckoutRequest, CheckoutSession, GatewayError, GatewayResult, PaymentGateway, SessionState,
};

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    /// Create a gateway client with a hard request timeout; the only
    /// suspension point in order creation is this outbound call.
    pub fn new(secret_key: String, api_base: String, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to build gateway HTTP client");
        Self {
            client,
            secret_key,
            api_base,
        }
    }

    /// Build the form-encoded body for a checkout session create call.
    ///
    /// Stripe's form encoding addresses nested fields with bracketed paths
    /// (`line_items[0][price_data][unit_amount]`).
    fn session_form(request: &CheckoutRequest) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("customer_email".into(), request.customer_email.clone()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("metadata[orderId]".into(), request.order_id.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                request.currency.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_minor_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        form
    }
}

#[async_trait::async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> GatewayResult<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&Self::session_form(request))
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(GatewayError::Unexpected(format!(
                "checkout session create failed ({status}): {message}"
            )));
        }

        let session_id = body["id"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::Unexpected(format!("checkout session without id: {body}"))
            })?
            .to_string();
        let checkout_url = body["url"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::Unexpected(format!("checkout session without url: {body}"))
            })?
            .to_string();
        let payment_ref = body["payment_intent"].as_str().map(String::from);

        Ok(CheckoutSession {
            session_id,
            checkout_url,
            payment_ref,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> GatewayResult<SessionState> {
        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{session_id}",
                self.api_base
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(GatewayError::Unexpected(format!(
                "checkout session retrieve failed ({status}): {message}"
            )));
        }

        Ok(SessionState {
            paid: body["payment_status"].as_str() == Some("paid"),
            payment_ref: body["payment_intent"].as_str().map(String::from),
        })
    }
}
