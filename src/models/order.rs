use crate::models::payment::PaymentSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Order lifecycle. Forward path is pending_payment → paid → preparing →
/// ready → completed; cancelled may be entered from any state before
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_payment" => Some(OrderStatus::PendingPayment),
            "paid" => Some(OrderStatus::Paid),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Serving temperature option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Temp {
    Hot,
    Ice,
}

/// Selected options on a cart line / order item. Stored as JSON on the
/// snapshot; the size code is validated against the variant catalog at
/// order-creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<Temp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ItemOptions {
    pub fn is_empty(&self) -> bool {
        self.temp.is_none() && self.size.is_none()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub order_no: String,
    pub status: OrderStatus,
    pub fulfillment: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
    pub subtotal_idr: i64,
    pub discount_idr: i64,
    pub total_idr: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-view shape returned to shoppers and admins.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct OrderSummary {
    pub id: String,
    pub order_no: String,
    pub status: OrderStatus,
    pub total_idr: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithPayment {
    #[serde(flatten)]
    pub order: OrderSummary,
    pub payment: Option<PaymentSummary>,
}

/// Immutable snapshot of a cart line taken at order creation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_idr: i64,
    pub qty: i64,
    pub options: Option<String>,
    pub line_total_idr: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_idr: i64,
    pub qty: i64,
    pub options: Option<ItemOptions>,
    pub line_total_idr: i64,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(it: OrderItem) -> Self {
        let options = it
            .options
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        Self {
            id: it.id,
            product_id: it.product_id,
            product_name: it.product_name,
            unit_price_idr: it.unit_price_idr,
            qty: it.qty,
            options,
            line_total_idr: it.line_total_idr,
            created_at: it.created_at,
        }
    }
}

/// Detail view: order, snapshot items, and the payment record if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub items: Vec<OrderItemResponse>,
    pub payment: Option<crate::models::Payment>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemInput {
    pub product_id: String,
    pub qty: i64,
    #[serde(default)]
    pub options: Option<ItemOptions>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
    pub items: Vec<CartItemInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
}

impl UpdateOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none() && self.customer_phone.is_none() && self.note.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminOrderQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<String>,
    /// Matches against order_no and customer_name.
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub note: Option<String>,
}

impl AdminUpdateOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.note.is_none()
    }
}
