use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PROVIDER_MANUAL: &str = "manual";
pub const PROVIDER_MIDTRANS: &str = "midtrans";

pub const METHOD_PAY_AT_PICKUP: &str = "pay_at_pickup";
pub const METHOD_ADMIN_MARK_PAID: &str = "admin_mark_paid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub provider: String,
    pub provider_order_id: String,
    pub method: Option<String>,
    pub status: PaymentStatus,
    pub gross_amount_idr: i64,
    pub snap_token: Option<String>,
    pub snap_redirect_url: Option<String>,
    pub transaction_status: Option<String>,
    pub fraud_status: Option<String>,
    pub provider_payload: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact shape attached to order listings.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PaymentSummary {
    pub order_id: String,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub gross_amount_idr: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSnapRequest {
    pub order_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SnapTokenResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reused: bool,
}

/// Midtrans HTTP notification body. Only the fields the reconciler needs
/// are typed; the full raw payload is persisted separately for audit.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MidtransNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}
