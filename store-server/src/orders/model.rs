//! Order entity and value types
//!
//! The order is the central entity of the system. Amounts are integer cents
//! internally and 2dp decimal numbers on the wire (see `utils::money::cents`).
//! Wire field names are camelCase to match the storefront frontend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::money;

// =============================================================================
// Enums
// =============================================================================

/// How the customer pays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Hosted checkout through the external payment gateway
    #[serde(rename = "Online")]
    OnlineGateway,
    /// Deferred cash settlement on delivery
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Lenient parse of the client-supplied method string.
    ///
    /// Anything other than an explicit cash-on-delivery request is treated
    /// as an online payment, matching the storefront's historical behavior.
    pub fn from_request(value: Option<&str>) -> Self {
        match value {
            Some("Cash on Delivery") => PaymentMethod::CashOnDelivery,
            _ => PaymentMethod::OnlineGateway,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::OnlineGateway => "Online",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" => Ok(PaymentMethod::OnlineGateway),
            "Cash on Delivery" => Ok(PaymentMethod::CashOnDelivery),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Payment state. Monotonic: once `Paid`, never reverts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(PaymentStatus::Unpaid),
            "Paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Order fulfilment state
///
/// Transitions are validated against an explicit table; `Delivered` and
/// `Cancelled` are terminal:
///
/// | From | Allowed to |
/// |---|---|
/// | Pending | Confirmed, Cancelled |
/// | Confirmed | Processing, Cancelled |
/// | Processing | Shipped, Cancelled |
/// | Shipped | Delivered |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `self -> next` is an allowed transition
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// One priced, quantified entry within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    #[serde(with = "money::cents")]
    pub unit_price: i64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Customer order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// External key, `"ORD-" + uuid`, immutable
    pub order_id: String,
    /// Owning user id (JWT subject); absent for guest flows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(with = "money::cents")]
    pub subtotal: i64,
    #[serde(with = "money::cents")]
    pub tax_amount: i64,
    #[serde(with = "money::cents")]
    pub shipping_charge: i64,
    #[serde(with = "money::cents")]
    pub final_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_session_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_payment_ref: Option<String>,
    /// Creation timestamp, epoch millis, default sort key (newest first)
    pub created_at: i64,
}

/// Admin listing filter
///
/// No pagination yet; new fields (limit/offset) belong here when it lands.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Exact match on order status
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring over order id, contact name, email and
    /// item names
    pub search: Option<String>,
}
