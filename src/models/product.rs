use crate::models::variant::VariantSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_idr: i64,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shopper-facing shape: active product plus its active variants.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithVariants {
    pub id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_idr: i64,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub variants: Vec<VariantSummary>,
}

impl ProductWithVariants {
    pub fn new(p: Product, variants: Vec<VariantSummary>) -> Self {
        Self {
            id: p.id,
            category_id: p.category_id,
            name: p.name,
            slug: p.slug,
            description: p.description,
            price_idr: p.price_idr,
            image_path: p.image_path,
            created_at: p.created_at,
            variants,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub q: Option<String>,
    /// Category slug filter; an unknown slug yields an empty list.
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminProductQuery {
    pub q: Option<String>,
    pub category_id: Option<String>,
    /// "true" | "false"; anything else means no filter.
    pub active: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_idr: i64,
    pub image_path: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    // Two-level Option: key absent = untouched, explicit null = set NULL.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category_id: Option<Option<String>>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_idr: Option<i64>,
    pub image_path: Option<String>,
    pub is_active: Option<bool>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.price_idr.is_none()
            && self.image_path.is_none()
            && self.is_active.is_none()
    }
}
