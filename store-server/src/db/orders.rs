//! SQLite order store
//!
//! Production [`OrderStore`] implementation. The `order_id` primary key is
//! the duplicate-creation guard; both conditional updates are single
//! `UPDATE ... WHERE` statements so SQLite's write serialization is the
//! per-order synchronization point.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::orders::model::{Order, OrderFilter, OrderStatus, PaymentStatus};
use crate::orders::store::{
    MarkPaidOutcome, OrderStore, RepoError, RepoResult, TransitionOutcome,
};

#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        row.map(OrderRow::into_order).transpose()
    }

    async fn fetch_by_session(&self, session_ref: &str) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE gateway_session_ref = $1")
                .bind(session_ref)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        row.map(OrderRow::into_order).transpose()
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert(&self, order: &Order) -> RepoResult<()> {
        let items = serde_json::to_string(&order.items)
            .map_err(|e| RepoError::Database(format!("Failed to encode items: {e}")))?;

        let result = sqlx::query(
            "INSERT INTO orders (
                order_id, owner_id, customer_name, email, phone_number, address, notes,
                items, subtotal_cents, tax_cents, shipping_cents, final_cents,
                payment_method, payment_status, order_status,
                gateway_session_ref, gateway_payment_ref, created_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(&order.order_id)
        .bind(&order.owner)
        .bind(&order.name)
        .bind(&order.email)
        .bind(&order.phone_number)
        .bind(&order.address)
        .bind(&order.notes)
        .bind(&items)
        .bind(order.subtotal)
        .bind(order.tax_amount)
        .bind(order.shipping_charge)
        .bind(order.final_amount)
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.order_status.as_str())
        .bind(&order.gateway_session_ref)
        .bind(&order.gateway_payment_ref)
        .bind(order.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation()) =>
            {
                Err(RepoError::Duplicate(format!(
                    "Order {} already exists",
                    order.order_id
                )))
            }
            Err(e) => Err(db_error(e)),
        }
    }

    async fn find_by_id(&self, order_id: &str) -> RepoResult<Option<Order>> {
        self.fetch_by_id(order_id).await
    }

    async fn find_by_session_ref(&self, session_ref: &str) -> RepoResult<Option<Order>> {
        self.fetch_by_session(session_ref).await
    }

    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT * FROM orders WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }

    async fn find_filtered(&self, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
        // instr() gives plain substring semantics with no LIKE wildcard
        // interpretation of user input; item names sit inside the JSON
        // items column
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT * FROM orders
             WHERE ($1 IS NULL OR order_status = $1)
               AND ($2 IS NULL
                    OR instr(lower(order_id), $2) > 0
                    OR instr(lower(customer_name), $2) > 0
                    OR instr(lower(email), $2) > 0
                    OR EXISTS (
                        SELECT 1 FROM json_each(orders.items) AS item
                        WHERE instr(lower(json_extract(item.value, '$.name')), $2) > 0))
             ORDER BY created_at DESC",
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.search.as_ref().map(|s| s.to_lowercase()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }

    async fn mark_paid(
        &self,
        session_ref: &str,
        payment_ref: Option<&str>,
    ) -> RepoResult<MarkPaidOutcome> {
        let result = sqlx::query(
            "UPDATE orders
             SET payment_status = 'Paid',
                 order_status = 'Confirmed',
                 gateway_payment_ref = COALESCE($1, gateway_payment_ref)
             WHERE gateway_session_ref = $2
               AND payment_status = 'Unpaid'
               AND order_status = 'Pending'",
        )
        .bind(payment_ref)
        .bind(session_ref)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let current = self.fetch_by_session(session_ref).await?;
        if result.rows_affected() > 0 {
            let order = current.ok_or_else(|| {
                RepoError::Database("Order vanished after payment confirmation".to_string())
            })?;
            return Ok(MarkPaidOutcome::Updated(order));
        }

        Ok(match current {
            None => MarkPaidOutcome::NotFound,
            Some(order) if order.payment_status == PaymentStatus::Paid => {
                MarkPaidOutcome::AlreadyPaid(order)
            }
            Some(order) => MarkPaidOutcome::StatusConflict(order),
        })
    }

    async fn transition_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<TransitionOutcome> {
        let result = sqlx::query(
            "UPDATE orders SET order_status = $1
             WHERE order_id = $2 AND order_status = $3",
        )
        .bind(next.as_str())
        .bind(order_id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let current = self.fetch_by_id(order_id).await?;
        if result.rows_affected() > 0 {
            let order = current.ok_or_else(|| {
                RepoError::Database("Order vanished after status transition".to_string())
            })?;
            return Ok(TransitionOutcome::Updated(order));
        }

        Ok(match current {
            None => TransitionOutcome::NotFound,
            Some(order) => TransitionOutcome::Conflict(order),
        })
    }

    async fn delete_by_id(&self, order_id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

fn db_error(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Raw orders row; enum and JSON columns are decoded in `into_order`
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    owner_id: Option<String>,
    customer_name: String,
    email: String,
    phone_number: String,
    address: String,
    notes: Option<String>,
    items: String,
    subtotal_cents: i64,
    tax_cents: i64,
    shipping_cents: i64,
    final_cents: i64,
    payment_method: String,
    payment_status: String,
    order_status: String,
    gateway_session_ref: Option<String>,
    gateway_payment_ref: Option<String>,
    created_at: i64,
}

impl OrderRow {
    fn into_order(self) -> RepoResult<Order> {
        let items = serde_json::from_str(&self.items)
            .map_err(|e| RepoError::Database(format!("Corrupt items column: {e}")))?;

        Ok(Order {
            order_id: self.order_id,
            owner: self.owner_id,
            name: self.customer_name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            notes: self.notes,
            items,
            subtotal: self.subtotal_cents,
            tax_amount: self.tax_cents,
            shipping_charge: self.shipping_cents,
            final_amount: self.final_cents,
            payment_method: self
                .payment_method
                .parse()
                .map_err(RepoError::Database)?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(RepoError::Database)?,
            order_status: self.order_status.parse().map_err(RepoError::Database)?,
            gateway_session_ref: self.gateway_session_ref,
            gateway_payment_ref: self.gateway_payment_ref,
            created_at: self.created_at,
        })
    }
}
