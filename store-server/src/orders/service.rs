//! Order lifecycle services
//!
//! Orchestrates validation, pricing, gateway session issuance, persistence
//! and reconciliation over injected [`OrderStore`] and [`PaymentGateway`]
//! references. Each call is a stateless unit of work; every durable effect
//! goes through the store.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::gateway::{CheckoutLineItem, CheckoutRequest, PaymentGateway};
use crate::orders::model::{
    Order, OrderFilter, OrderStatus, PaymentMethod, PaymentStatus,
};
use crate::orders::store::{MarkPaidOutcome, OrderStore, RepoError, TransitionOutcome};
use crate::orders::{normalize, pricing};
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN,
    require_text, validate_optional_text,
};
use crate::utils::{AppError, AppResult};

/// Checkout-flow settings passed down from [`crate::config::Config`]
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// ISO currency code for gateway line items
    pub currency: String,
    /// Redirect after completed checkout; the gateway substitutes the
    /// session id placeholder
    pub success_url: String,
    /// Redirect after abandoned checkout
    pub cancel_url: String,
}

/// Order creation payload (admin and storefront clients)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    /// Raw line items; normalized in `orders::normalize`
    pub items: Option<Vec<serde_json::Value>>,
    pub payment_method: Option<String>,
}

/// A freshly created order plus the gateway checkout URL (online orders)
#[derive(Debug)]
pub struct CreatedOrder {
    pub order: Order,
    pub checkout_url: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    checkout: CheckoutConfig,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        checkout: CheckoutConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            checkout,
        }
    }

    // ========== Creation ==========

    /// Create an order: validate, normalize, price, and persist, issuing a
    /// gateway checkout session first for online payment.
    ///
    /// The session is created *before* the order is durably persisted: a
    /// persistence failure leaves an orphaned gateway session (recoverable,
    /// logged below) rather than an order that can never be paid.
    pub async fn create_order(
        &self,
        owner: Option<String>,
        request: CreateOrderRequest,
    ) -> AppResult<CreatedOrder> {
        let name = require_text(request.name.as_deref(), "name", MAX_NAME_LEN)?;
        let email = require_text(request.email.as_deref(), "email", MAX_EMAIL_LEN)?;
        let phone_number = require_text(
            request.phone_number.as_deref(),
            "phoneNumber",
            MAX_SHORT_TEXT_LEN,
        )?;
        let address = require_text(request.address.as_deref(), "address", MAX_ADDRESS_LEN)?;
        validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;

        let raw_items = request
            .items
            .as_deref()
            .ok_or_else(|| AppError::validation("Order items are required"))?;
        let items = normalize::normalize_items(raw_items)?;

        let amounts = pricing::price(&items);
        let order_id = format!("ORD-{}", Uuid::new_v4());
        let payment_method = PaymentMethod::from_request(request.payment_method.as_deref());

        let mut order = Order {
            order_id,
            owner,
            name,
            email,
            phone_number,
            address,
            notes: request.notes.clone(),
            items,
            subtotal: amounts.subtotal,
            tax_amount: amounts.tax_amount,
            shipping_charge: amounts.shipping_charge,
            final_amount: amounts.final_amount,
            payment_method,
            payment_status: PaymentStatus::Unpaid,
            order_status: OrderStatus::Pending,
            gateway_session_ref: None,
            gateway_payment_ref: None,
            created_at: now_millis(),
        };

        let checkout_url = match payment_method {
            PaymentMethod::OnlineGateway => {
                let session = self
                    .gateway
                    .create_checkout_session(&self.checkout_request(&order))
                    .await
                    .map_err(|e| AppError::upstream(e.to_string()))?;

                order.gateway_session_ref = Some(session.session_id.clone());
                order.gateway_payment_ref = session.payment_ref.clone();

                if let Err(e) = self.persist(&order).await {
                    // Accepted trade-off: the session is now orphaned on the
                    // gateway side; an out-of-band sweep can reconcile it
                    tracing::warn!(
                        order_id = %order.order_id,
                        session_ref = %session.session_id,
                        "Order persistence failed after checkout session creation"
                    );
                    return Err(e);
                }

                Some(session.checkout_url)
            }
            PaymentMethod::CashOnDelivery => {
                self.persist(&order).await?;
                None
            }
        };

        tracing::info!(
            order_id = %order.order_id,
            method = payment_method.as_str(),
            amount = order.final_amount,
            "Order created"
        );

        Ok(CreatedOrder {
            order,
            checkout_url,
        })
    }

    async fn persist(&self, order: &Order) -> AppResult<()> {
        self.store.insert(order).await.map_err(map_repo_error)
    }

    /// One gateway line item per order line item, plus a synthetic line for
    /// the aggregate tax when it is non-zero.
    fn checkout_request(&self, order: &Order) -> CheckoutRequest {
        let mut line_items: Vec<CheckoutLineItem> = order
            .items
            .iter()
            .map(|item| CheckoutLineItem {
                name: item.name.clone(),
                unit_minor_amount: item.unit_price,
                quantity: item.quantity,
            })
            .collect();

        if order.tax_amount > 0 {
            line_items.push(CheckoutLineItem {
                name: "Tax (8%)".to_string(),
                unit_minor_amount: order.tax_amount,
                quantity: 1,
            });
        }

        CheckoutRequest {
            currency: self.checkout.currency.clone(),
            line_items,
            customer_email: order.email.clone(),
            success_url: self.checkout.success_url.clone(),
            cancel_url: self.checkout.cancel_url.clone(),
            order_id: order.order_id.clone(),
        }
    }

    // ========== Reconciliation ==========

    /// Synchronize an order with the gateway's authoritative payment state.
    ///
    /// Safe under duplicate invocation: the confirmation write applies only
    /// while the order is still Unpaid/Pending, and an already-paid order is
    /// returned unchanged. Usable from the customer's confirmation page and
    /// from any future gateway callback alike.
    pub async fn confirm_payment(&self, session_id: &str) -> AppResult<Order> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(AppError::validation("session_id is required"));
        }

        let state = self
            .gateway
            .retrieve_session(session_id)
            .await
            .map_err(|e| AppError::upstream(e.to_string()))?;

        if !state.paid {
            // Client-retryable: checkout simply has not completed yet
            return Err(AppError::validation("Payment not completed"));
        }

        let outcome = self
            .store
            .mark_paid(session_id, state.payment_ref.as_deref())
            .await
            .map_err(map_repo_error)?;

        match outcome {
            MarkPaidOutcome::Updated(order) => {
                tracing::info!(order_id = %order.order_id, "Payment confirmed");
                Ok(order)
            }
            MarkPaidOutcome::AlreadyPaid(order) => Ok(order),
            MarkPaidOutcome::StatusConflict(order) => Err(AppError::conflict(format!(
                "Order {} is {} and can no longer be confirmed",
                order.order_id, order.order_status
            ))),
            MarkPaidOutcome::NotFound => {
                // Possibly a replayed or forged session reference
                tracing::warn!(session_ref = %session_id, "Paid session matches no order");
                Err(AppError::not_found("Order not found"))
            }
        }
    }

    // ========== Query ==========

    /// Orders belonging to the authenticated owner, most recent first
    pub async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<Order>> {
        self.store
            .find_by_owner(owner_id)
            .await
            .map_err(map_repo_error)
    }

    /// Administrative listing with optional status filter and free-text search
    pub async fn list_all(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        self.store
            .find_filtered(&filter)
            .await
            .map_err(map_repo_error)
    }

    // ========== Administration ==========

    /// Transition an order's status, validated against the state machine.
    ///
    /// The write is conditional on the status observed here, so a concurrent
    /// writer surfaces as a conflict instead of a silent overwrite.
    pub async fn set_status(&self, order_id: &str, next: OrderStatus) -> AppResult<Order> {
        let current = self
            .store
            .find_by_id(order_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        let from = current.order_status;
        if !from.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Illegal status transition: {from} -> {next}"
            )));
        }

        let outcome = self
            .store
            .transition_status(order_id, from, next)
            .await
            .map_err(map_repo_error)?;

        match outcome {
            TransitionOutcome::Updated(order) => {
                tracing::info!(order_id = %order_id, prev = %from, next = %next, "Order status updated");
                Ok(order)
            }
            TransitionOutcome::Conflict(current) => Err(AppError::conflict(format!(
                "Order {} was concurrently updated (now {})",
                order_id, current.order_status
            ))),
            TransitionOutcome::NotFound => {
                Err(AppError::not_found(format!("Order {order_id} not found")))
            }
        }
    }

    /// Unconditionally delete an order.
    ///
    /// Any associated gateway session is deliberately left alone.
    pub async fn delete_order(&self, order_id: &str) -> AppResult<()> {
        let removed = self
            .store
            .delete_by_id(order_id)
            .await
            .map_err(map_repo_error)?;
        if !removed {
            return Err(AppError::not_found(format!("Order {order_id} not found")));
        }
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}

/// Map repository errors onto the public error kinds
fn map_repo_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::not_found(msg),
        // Store uniqueness violation: retryable creation failure
        RepoError::Duplicate(msg) => AppError::conflict(msg),
        RepoError::Database(msg) => AppError::database(msg),
    }
}
