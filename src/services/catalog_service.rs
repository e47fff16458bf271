use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::PageParams;
use std::collections::HashMap;

/// Read-only shopper view of the catalog: active rows only, no mutation.
#[derive(Clone)]
pub struct CatalogService {
    pool: DbPool,
}

impl CatalogService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategorySummary>> {
        let categories = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT id, name, slug, sort_order
            FROM categories
            WHERE is_active = 1
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> AppResult<Vec<ProductWithVariants>> {
        let page = PageParams {
            limit: query.limit,
            offset: query.offset,
        };
        let limit = page.limit_or(24, 60);
        let offset = page.offset_or_zero();

        // Resolve the category slug first; an unknown slug is an empty
        // result, not an error.
        let mut category_id: Option<String> = None;
        if let Some(slug) = query.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let found = sqlx::query_scalar::<_, String>(
                "SELECT id FROM categories WHERE slug = ? AND is_active = 1",
            )
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

            match found {
                Some(id) => category_id = Some(id),
                None => return Ok(Vec::new()),
            }
        }

        let q = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut sql = String::from("SELECT * FROM products WHERE is_active = 1");
        if category_id.is_some() {
            sql.push_str(" AND category_id = ?");
        }
        if q.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut db_query = sqlx::query_as::<_, Product>(&sql);
        if let Some(id) = &category_id {
            db_query = db_query.bind(id);
        }
        if let Some(q) = q {
            db_query = db_query.bind(format!("%{q}%"));
        }
        let products = db_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        self.attach_variants(products).await
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> AppResult<ProductWithVariants> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE slug = ? AND is_active = 1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let mut with_variants = self.attach_variants(vec![product]).await?;
        Ok(with_variants.remove(0))
    }

    async fn attach_variants(
        &self,
        products: Vec<Product>,
    ) -> AppResult<Vec<ProductWithVariants>> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT product_id, code, label, price_delta_idr, is_default, sort_order
            FROM product_variants
            WHERE is_active = 1 AND product_id IN ({placeholders})
            ORDER BY sort_order ASC
            "#
        );

        let mut db_query = sqlx::query_as::<_, VariantSummary>(&sql);
        for id in &ids {
            db_query = db_query.bind(*id);
        }
        let variants = db_query.fetch_all(&self.pool).await?;

        let mut grouped: HashMap<String, Vec<VariantSummary>> = HashMap::new();
        for v in variants {
            grouped.entry(v.product_id.clone()).or_default().push(v);
        }

        Ok(products
            .into_iter()
            .map(|p| {
                let vs = grouped.remove(&p.id).unwrap_or_default();
                ProductWithVariants::new(p, vs)
            })
            .collect())
    }
}
