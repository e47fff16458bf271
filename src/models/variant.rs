use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Price deltas are bounded so a typo cannot swing a price by more than
/// Rp100.000 either way.
pub const MAX_PRICE_DELTA_IDR: i64 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Variant {
    pub id: String,
    pub product_id: String,
    pub code: String,
    pub label: String,
    pub price_delta_idr: i64,
    pub is_default: bool,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shopper-facing variant shape embedded under a product.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct VariantSummary {
    pub product_id: String,
    pub code: String,
    pub label: String,
    pub price_delta_idr: i64,
    pub is_default: bool,
    pub sort_order: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VariantQuery {
    pub product_id: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVariantRequest {
    pub product_id: String,
    pub code: String,
    pub label: String,
    pub price_delta_idr: i64,
    pub sort_order: Option<i64>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVariantRequest {
    pub code: Option<String>,
    pub label: Option<String>,
    pub price_delta_idr: Option<i64>,
    pub sort_order: Option<i64>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateVariantRequest {
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.label.is_none()
            && self.price_delta_idr.is_none()
            && self.sort_order.is_none()
            && self.is_default.is_none()
            && self.is_active.is_none()
    }
}
