//! In-memory order store
//!
//! Reference implementation of [`OrderStore`] over a `DashMap`. Used by the
//! service-level tests and selectable with `STORE_BACKEND=memory` for local
//! development. Conditional updates run under the map's per-key entry lock,
//! which is the serialization point the contract requires.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use async_trait::async_trait;

use crate::orders::model::{Order, OrderFilter, OrderStatus, PaymentStatus};
use crate::orders::store::{
    MarkPaidOutcome, OrderStore, RepoError, RepoResult, TransitionOutcome, matches_search,
};

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: DashMap<String, Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted(&self, mut pred: impl FnMut(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Resolve the key of the order holding a session ref, if any
    fn key_for_session(&self, session_ref: &str) -> Option<String> {
        self.orders
            .iter()
            .find(|entry| entry.value().gateway_session_ref.as_deref() == Some(session_ref))
            .map(|entry| entry.key().clone())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> RepoResult<()> {
        match self.orders.entry(order.order_id.clone()) {
            Entry::Occupied(_) => Err(RepoError::Duplicate(format!(
                "Order {} already exists",
                order.order_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, order_id: &str) -> RepoResult<Option<Order>> {
        Ok(self.orders.get(order_id).map(|entry| entry.value().clone()))
    }

    async fn find_by_session_ref(&self, session_ref: &str) -> RepoResult<Option<Order>> {
        Ok(self
            .key_for_session(session_ref)
            .and_then(|key| self.orders.get(&key).map(|entry| entry.value().clone())))
    }

    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Order>> {
        Ok(self.collect_sorted(|order| order.owner.as_deref() == Some(owner_id)))
    }

    async fn find_filtered(&self, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        Ok(self.collect_sorted(|order| {
            if let Some(status) = filter.status
                && order.order_status != status
            {
                return false;
            }
            match &needle {
                Some(needle) => matches_search(order, needle),
                None => true,
            }
        }))
    }

    async fn mark_paid(
        &self,
        session_ref: &str,
        payment_ref: Option<&str>,
    ) -> RepoResult<MarkPaidOutcome> {
        let Some(key) = self.key_for_session(session_ref) else {
            return Ok(MarkPaidOutcome::NotFound);
        };

        // Re-check under the entry lock: the lookup above raced freely
        match self.orders.entry(key) {
            Entry::Vacant(_) => Ok(MarkPaidOutcome::NotFound),
            Entry::Occupied(mut slot) => {
                let order = slot.get_mut();
                if order.payment_status == PaymentStatus::Paid {
                    return Ok(MarkPaidOutcome::AlreadyPaid(order.clone()));
                }
                if order.order_status != OrderStatus::Pending {
                    return Ok(MarkPaidOutcome::StatusConflict(order.clone()));
                }
                order.payment_status = PaymentStatus::Paid;
                order.order_status = OrderStatus::Confirmed;
                if let Some(payment_ref) = payment_ref {
                    order.gateway_payment_ref = Some(payment_ref.to_string());
                }
                Ok(MarkPaidOutcome::Updated(order.clone()))
            }
        }
    }

    async fn transition_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<TransitionOutcome> {
        match self.orders.entry(order_id.to_string()) {
            Entry::Vacant(_) => Ok(TransitionOutcome::NotFound),
            Entry::Occupied(mut slot) => {
                let order = slot.get_mut();
                if order.order_status != expected {
                    return Ok(TransitionOutcome::Conflict(order.clone()));
                }
                order.order_status = next;
                Ok(TransitionOutcome::Updated(order.clone()))
            }
        }
    }

    async fn delete_by_id(&self, order_id: &str) -> RepoResult<bool> {
        Ok(self.orders.remove(order_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::model::{LineItem, PaymentMethod};
    use crate::utils::time::now_millis;

    fn order(order_id: &str, session: Option<&str>) -> Order {
        Order {
            order_id: order_id.to_string(),
            owner: Some("user-1".into()),
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone_number: "555".into(),
            address: "1 Harbor Rd".into(),
            notes: None,
            items: vec![LineItem {
                product_id: "p1".into(),
                name: "Field Watch".into(),
                unit_price: 1_000,
                quantity: 1,
                description: None,
                image: None,
            }],
            subtotal: 1_000,
            tax_amount: 80,
            shipping_charge: 0,
            final_amount: 1_080,
            payment_method: PaymentMethod::OnlineGateway,
            payment_status: PaymentStatus::Unpaid,
            order_status: OrderStatus::Pending,
            gateway_session_ref: session.map(str::to_string),
            gateway_payment_ref: None,
            created_at: now_millis(),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = MemoryOrderStore::new();
        store.insert(&order("ORD-1", None)).await.unwrap();
        let err = store.insert(&order("ORD-1", None)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let store = MemoryOrderStore::new();
        store.insert(&order("ORD-1", Some("cs_1"))).await.unwrap();

        let first = store.mark_paid("cs_1", Some("pi_1")).await.unwrap();
        let MarkPaidOutcome::Updated(updated) = first else {
            panic!("expected Updated");
        };
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.order_status, OrderStatus::Confirmed);

        let second = store.mark_paid("cs_1", Some("pi_1")).await.unwrap();
        let MarkPaidOutcome::AlreadyPaid(same) = second else {
            panic!("expected AlreadyPaid");
        };
        assert_eq!(same, updated);
    }

    #[tokio::test]
    async fn test_mark_paid_after_cancellation_conflicts() {
        let store = MemoryOrderStore::new();
        store.insert(&order("ORD-1", Some("cs_1"))).await.unwrap();
        store
            .transition_status("ORD-1", OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();

        let outcome = store.mark_paid("cs_1", None).await.unwrap();
        let MarkPaidOutcome::StatusConflict(current) = outcome else {
            panic!("expected StatusConflict");
        };
        assert_eq!(current.order_status, OrderStatus::Cancelled);
        assert_eq!(current.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_transition_detects_stale_expectation() {
        let store = MemoryOrderStore::new();
        store.insert(&order("ORD-1", None)).await.unwrap();

        store
            .transition_status("ORD-1", OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap();

        // A second writer still believing the order is Pending loses cleanly
        let outcome = store
            .transition_status("ORD-1", OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        let TransitionOutcome::Conflict(current) = outcome else {
            panic!("expected Conflict");
        };
        assert_eq!(current.order_status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let store = MemoryOrderStore::new();
        assert!(matches!(
            store.mark_paid("cs_missing", None).await.unwrap(),
            MarkPaidOutcome::NotFound
        ));
        assert!(matches!(
            store
                .transition_status("ORD-x", OrderStatus::Pending, OrderStatus::Confirmed)
                .await
                .unwrap(),
            TransitionOutcome::NotFound
        ));
        assert!(!store.delete_by_id("ORD-x").await.unwrap());
    }
}
