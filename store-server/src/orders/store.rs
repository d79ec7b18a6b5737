//! Order store contract
//!
//! Durable order persistence sits behind this trait so the services stay
//! backend-agnostic: production runs on SQLite (`db::orders`), the reference
//! implementation lives in memory (`orders::memory`). Both conditional
//! operations are single atomic compare-and-set writes, the per-order
//! serialization point that keeps racing reconciliation and administrative
//! updates from clobbering each other.

use async_trait::async_trait;
use thiserror::Error;

use crate::orders::model::{Order, OrderFilter, OrderStatus};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome of the conditional payment confirmation write
#[derive(Debug)]
pub enum MarkPaidOutcome {
    /// Transitioned Unpaid/Pending -> Paid/Confirmed
    Updated(Order),
    /// Already paid: the idempotent no-op case (duplicate webhook, refresh)
    AlreadyPaid(Order),
    /// Order exists but left `Pending` through another writer (e.g. an
    /// administrative cancellation won the race)
    StatusConflict(Order),
    /// No order carries this session reference
    NotFound,
}

/// Outcome of the conditional status transition write
#[derive(Debug)]
pub enum TransitionOutcome {
    Updated(Order),
    /// The observed status no longer matches; carries the current row so the
    /// caller can report what won the race
    Conflict(Order),
    NotFound,
}

/// Durable, key-indexed order persistence
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create a new order. The `order_id` unique key is the authoritative
    /// duplicate-creation guard; violations surface as [`RepoError::Duplicate`].
    async fn insert(&self, order: &Order) -> RepoResult<()>;

    async fn find_by_id(&self, order_id: &str) -> RepoResult<Option<Order>>;

    async fn find_by_session_ref(&self, session_ref: &str) -> RepoResult<Option<Order>>;

    /// Orders owned by a user, most recent first
    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Order>>;

    /// Filtered listing (admin), most recent first
    async fn find_filtered(&self, filter: &OrderFilter) -> RepoResult<Vec<Order>>;

    /// Conditional update: set `Paid`/`Confirmed` + the gateway payment ref on
    /// the order holding `session_ref`, only while it is still Unpaid and
    /// Pending.
    async fn mark_paid(
        &self,
        session_ref: &str,
        payment_ref: Option<&str>,
    ) -> RepoResult<MarkPaidOutcome>;

    /// Conditional update: move `order_id` from `expected` to `next`, failing
    /// cleanly when a concurrent writer already changed the status.
    async fn transition_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<TransitionOutcome>;

    /// Unconditional delete; returns whether a row was removed
    async fn delete_by_id(&self, order_id: &str) -> RepoResult<bool>;
}

/// Case-insensitive substring match over the searchable order fields.
///
/// Shared by the in-memory store and tests; the SQLite implementation
/// expresses the same predicate in SQL.
pub fn matches_search(order: &Order, needle_lower: &str) -> bool {
    order.order_id.to_lowercase().contains(needle_lower)
        || order.name.to_lowercase().contains(needle_lower)
        || order.email.to_lowercase().contains(needle_lower)
        || order
            .items
            .iter()
            .any(|item| item.name.to_lowercase().contains(needle_lower))
}
