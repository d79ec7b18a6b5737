//! Order API handlers
//!
//! JSON surface over the order service. Every response body carries a
//! `success` flag; errors use the envelope from `utils::error`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::auth::{AdminUser, CurrentUser};
use crate::orders::model::{Order, OrderFilter};
use crate::orders::service::CreateOrderRequest;
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

/// Order router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create).get(list_all))
        .route("/orders/confirm", get(confirm))
        .route("/orders/my", get(list_mine))
        .route("/orders/{id}", put(update_status).delete(remove))
}

// ========== Request / response shapes ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: Order,
    /// Gateway checkout URL; `null` for cash-on-delivery orders
    pub checkout_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_status: Option<String>,
}

// ========== Handlers ==========

/// Create an order (online or cash on delivery)
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
    let created = state
        .orders
        .create_order(Some(user.id), payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            order: created.order,
            checkout_url: created.checkout_url,
        }),
    ))
}

/// Reconcile an order against the gateway's payment state.
///
/// Public: the customer lands here from the gateway redirect, before any
/// session of ours exists. Safe to call repeatedly.
async fn confirm(
    State(state): State<AppState>,
    Query(query): Query<ConfirmQuery>,
) -> AppResult<Json<OrderResponse>> {
    let session_id = query
        .session_id
        .ok_or_else(|| AppError::validation("session_id is required"))?;

    let order = state.orders.confirm_payment(&session_id).await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// List the caller's own orders, most recent first
async fn list_mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<OrdersResponse>> {
    let orders = state.orders.list_for_owner(&user.id).await?;
    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// List all orders with optional status filter and free-text search (admin)
async fn list_all(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrdersResponse>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|e: String| AppError::validation(e))
        })
        .transpose()?;

    let filter = OrderFilter {
        status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let orders = state.orders.list_all(filter).await?;
    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// Transition an order's status (admin)
async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderResponse>> {
    let next = payload
        .order_status
        .as_deref()
        .ok_or_else(|| AppError::validation("orderStatus is required"))?
        .parse()
        .map_err(|e: String| AppError::validation(e))?;

    let order = state.orders.set_status(&id, next).await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// Delete an order (admin)
async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.orders.delete_order(&id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Order deleted successfully".to_string(),
    }))
}
