use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_slug;
use chrono::Utc;
use uuid::Uuid;

/// Privileged CRUD over categories, products, and variants. Callers are
/// expected to have passed the admin guard already.
#[derive(Clone)]
pub struct AdminCatalogService {
    pool: DbPool,
}

impl AdminCatalogService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // --- Categories -------------------------------------------------------

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY sort_order ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_category(&self, req: &CreateCategoryRequest) -> AppResult<Category> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("name is required".to_string()));
        }
        validate_slug(&req.slug)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(req.name.trim())
        .bind(&req.slug)
        .bind(req.sort_order.unwrap_or(0))
        .bind(req.is_active.unwrap_or(true))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)
        .map_err(map_slug_conflict)?;

        self.get_category(&id).await
    }

    pub async fn get_category(&self, id: &str) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn update_category(
        &self,
        id: &str,
        patch: &UpdateCategoryRequest,
    ) -> AppResult<Category> {
        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No changes provided".to_string(),
            ));
        }
        if let Some(slug) = &patch.slug {
            validate_slug(slug)?;
        }
        self.get_category(id).await?;

        sqlx::query(
            r#"
            UPDATE categories SET
                name = COALESCE(?, name),
                slug = COALESCE(?, slug),
                sort_order = COALESCE(?, sort_order),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(patch.sort_order)
        .bind(patch.is_active)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)
        .map_err(map_slug_conflict)?;

        self.get_category(id).await
    }

    /// Deletion is refused while products still reference the category;
    /// the admin reassigns or deletes those products first.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        self.get_category(id).await?;

        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if referencing > 0 {
            return Err(AppError::Conflict(format!(
                "Category is still referenced by {referencing} product(s)"
            )));
        }

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- Products ---------------------------------------------------------

    pub async fn list_products(&self, query: &AdminProductQuery) -> AppResult<Vec<Product>> {
        let q = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let category_id = query
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let active = parse_active_filter(query.active.as_deref());

        let mut sql = String::from("SELECT * FROM products WHERE 1 = 1");
        if category_id.is_some() {
            sql.push_str(" AND category_id = ?");
        }
        if let Some(flag) = active {
            sql.push_str(if flag {
                " AND is_active = 1"
            } else {
                " AND is_active = 0"
            });
        }
        if q.is_some() {
            sql.push_str(" AND (name LIKE ? OR slug LIKE ?)");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut db_query = sqlx::query_as::<_, Product>(&sql);
        if let Some(id) = category_id {
            db_query = db_query.bind(id);
        }
        if let Some(q) = q {
            let pattern = format!("%{q}%");
            db_query = db_query.bind(pattern.clone()).bind(pattern);
        }

        Ok(db_query.fetch_all(&self.pool).await?)
    }

    pub async fn create_product(&self, req: &CreateProductRequest) -> AppResult<Product> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("name is required".to_string()));
        }
        validate_slug(&req.slug)?;
        if req.price_idr < 0 {
            return Err(AppError::ValidationError(
                "price_idr must be non-negative".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products
                (id, category_id, name, slug, description, price_idr, image_path,
                 is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.category_id)
        .bind(req.name.trim())
        .bind(&req.slug)
        .bind(&req.description)
        .bind(req.price_idr)
        .bind(&req.image_path)
        .bind(req.is_active.unwrap_or(true))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)
        .map_err(map_slug_conflict)?;

        self.get_product(&id).await
    }

    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn update_product(
        &self,
        id: &str,
        patch: &UpdateProductRequest,
    ) -> AppResult<Product> {
        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No changes provided".to_string(),
            ));
        }
        if let Some(slug) = &patch.slug {
            validate_slug(slug)?;
        }
        if let Some(price) = patch.price_idr {
            if price < 0 {
                return Err(AppError::ValidationError(
                    "price_idr must be non-negative".to_string(),
                ));
            }
        }
        let current = self.get_product(id).await?;

        // category_id distinguishes "leave alone" from "set NULL".
        let category_id = match &patch.category_id {
            Some(value) => value.clone(),
            None => current.category_id.clone(),
        };

        sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?,
                name = COALESCE(?, name),
                slug = COALESCE(?, slug),
                description = COALESCE(?, description),
                price_idr = COALESCE(?, price_idr),
                image_path = COALESCE(?, image_path),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(category_id)
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(&patch.description)
        .bind(patch.price_idr)
        .bind(&patch.image_path)
        .bind(patch.is_active)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)
        .map_err(map_slug_conflict)?;

        self.get_product(id).await
    }

    /// Variants go first; storage-side cascade is not assumed.
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        self.get_product(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM product_variants WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // --- Variants ---------------------------------------------------------

    pub async fn list_variants(&self, query: &VariantQuery) -> AppResult<Vec<Variant>> {
        let product_id = query
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let active = parse_active_filter(query.active.as_deref());

        let mut sql = String::from("SELECT * FROM product_variants WHERE 1 = 1");
        if product_id.is_some() {
            sql.push_str(" AND product_id = ?");
        }
        if let Some(flag) = active {
            sql.push_str(if flag {
                " AND is_active = 1"
            } else {
                " AND is_active = 0"
            });
        }
        sql.push_str(" ORDER BY product_id ASC, sort_order ASC");

        let mut db_query = sqlx::query_as::<_, Variant>(&sql);
        if let Some(id) = product_id {
            db_query = db_query.bind(id);
        }

        Ok(db_query.fetch_all(&self.pool).await?)
    }

    pub async fn create_variant(&self, req: &CreateVariantRequest) -> AppResult<Variant> {
        validate_variant_fields(Some(&req.code), Some(&req.label), Some(req.price_delta_idr))?;
        // Owning product must exist.
        self.get_product(&req.product_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let is_default = req.is_default.unwrap_or(false);

        let mut tx = self.pool.begin().await?;

        // Single-default invariant: clear siblings before setting.
        if is_default {
            sqlx::query("UPDATE product_variants SET is_default = 0 WHERE product_id = ?")
                .bind(&req.product_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO product_variants
                (id, product_id, code, label, price_delta_idr, is_default,
                 sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.product_id)
        .bind(&req.code)
        .bind(&req.label)
        .bind(req.price_delta_idr)
        .bind(is_default)
        .bind(req.sort_order.unwrap_or(0))
        .bind(req.is_active.unwrap_or(true))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)
        .map_err(map_variant_conflict)?;

        tx.commit().await?;

        self.get_variant(&id).await
    }

    pub async fn get_variant(&self, id: &str) -> AppResult<Variant> {
        sqlx::query_as::<_, Variant>("SELECT * FROM product_variants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Variant not found".to_string()))
    }

    pub async fn update_variant(
        &self,
        id: &str,
        patch: &UpdateVariantRequest,
    ) -> AppResult<Variant> {
        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No changes provided".to_string(),
            ));
        }
        validate_variant_fields(
            patch.code.as_deref(),
            patch.label.as_deref(),
            patch.price_delta_idr,
        )?;

        let current = self.get_variant(id).await?;

        let mut tx = self.pool.begin().await?;

        if patch.is_default == Some(true) {
            sqlx::query("UPDATE product_variants SET is_default = 0 WHERE product_id = ?")
                .bind(&current.product_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            UPDATE product_variants SET
                code = COALESCE(?, code),
                label = COALESCE(?, label),
                price_delta_idr = COALESCE(?, price_delta_idr),
                sort_order = COALESCE(?, sort_order),
                is_default = COALESCE(?, is_default),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.code)
        .bind(&patch.label)
        .bind(patch.price_delta_idr)
        .bind(patch.sort_order)
        .bind(patch.is_default)
        .bind(patch.is_active)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)
        .map_err(map_variant_conflict)?;

        tx.commit().await?;

        self.get_variant(id).await
    }

    pub async fn delete_variant(&self, id: &str) -> AppResult<()> {
        self.get_variant(id).await?;
        sqlx::query("DELETE FROM product_variants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn validate_variant_fields(
    code: Option<&str>,
    label: Option<&str>,
    price_delta: Option<i64>,
) -> AppResult<()> {
    if let Some(code) = code {
        if code.is_empty() || code.len() > 20 {
            return Err(AppError::ValidationError(
                "code must be 1-20 characters".to_string(),
            ));
        }
    }
    if let Some(label) = label {
        if label.is_empty() || label.len() > 50 {
            return Err(AppError::ValidationError(
                "label must be 1-50 characters".to_string(),
            ));
        }
    }
    if let Some(delta) = price_delta {
        if delta.abs() > MAX_PRICE_DELTA_IDR {
            return Err(AppError::ValidationError(format!(
                "price_delta_idr must be within ±{MAX_PRICE_DELTA_IDR}"
            )));
        }
    }
    Ok(())
}

fn parse_active_filter(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

fn map_slug_conflict(e: AppError) -> AppError {
    if e.is_unique_violation() {
        AppError::ValidationError("Slug already exists".to_string())
    } else {
        e
    }
}

fn map_variant_conflict(e: AppError) -> AppError {
    if e.is_unique_violation() {
        AppError::ValidationError("Variant code already exists for this product".to_string())
    } else {
        e
    }
}
