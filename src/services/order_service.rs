use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{PageMeta, PageParams, generate_order_no};
use chrono::Utc;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const ORDER_NO_ATTEMPTS: u32 = 3;
const MAX_NOTE_LEN: usize = 300;
// Keeps line totals far away from i64 overflow; nobody picks up 1000
// coffees.
const MAX_ITEM_QTY: i64 = 999;

/// Snapshot line computed from authoritative catalog data. Client-supplied
/// prices never reach this point.
struct SnapshotLine {
    product_id: String,
    product_name: String,
    unit_price_idr: i64,
    qty: i64,
    options: Option<ItemOptions>,
    line_total_idr: i64,
}

#[derive(Clone)]
pub struct OrderService {
    pool: DbPool,
}

impl OrderService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Checkout: validate against the catalog, recompute every price, then
    /// write order + items + payment in one transaction. The order number
    /// is retried a bounded number of times on unique collision.
    pub async fn create_order(
        &self,
        user_id: &str,
        req: &CreateOrderRequest,
    ) -> AppResult<OrderSummary> {
        self.validate_payload(req)?;

        let lines = self.build_snapshot_lines(&req.items).await?;

        let subtotal: i64 = lines.iter().map(|l| l.line_total_idr).sum();
        let discount: i64 = 0;
        let total = (subtotal - discount).max(0);

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        // Insert the order, regenerating the order number on collision.
        let mut order_no = generate_order_no();
        let mut inserted = false;
        for attempt in 0..ORDER_NO_ATTEMPTS {
            let result = sqlx::query(
                r#"
                INSERT INTO orders
                    (id, user_id, order_no, status, fulfillment, customer_name,
                     customer_phone, note, subtotal_idr, discount_idr, total_idr,
                     created_at, updated_at)
                VALUES (?, ?, ?, ?, 'pickup', ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&order_id)
            .bind(user_id)
            .bind(&order_no)
            .bind(OrderStatus::PendingPayment.as_str())
            .bind(req.customer_name.trim())
            .bind(&req.customer_phone)
            .bind(&req.note)
            .bind(subtotal)
            .bind(discount)
            .bind(total)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from);

            match result {
                Ok(_) => {
                    inserted = true;
                    break;
                }
                Err(e) if e.is_unique_violation() && attempt + 1 < ORDER_NO_ATTEMPTS => {
                    log::warn!("Order number collision on {order_no}, regenerating");
                    order_no = generate_order_no();
                }
                Err(e) => return Err(e),
            }
        }
        if !inserted {
            return Err(AppError::InternalError(
                "Failed to create order".to_string(),
            ));
        }

        for line in &lines {
            let options_json = match &line.options {
                Some(opts) if !opts.is_empty() => Some(serde_json::to_string(opts)?),
                _ => None,
            };
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, product_id, product_name, unit_price_idr,
                     qty, options, line_total_idr, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order_id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.unit_price_idr)
            .bind(line.qty)
            .bind(options_json)
            .bind(line.line_total_idr)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // Pay-at-pickup placeholder; the Midtrans bridge replaces it when
        // the shopper chooses online payment.
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, order_id, provider, provider_order_id, method, status,
                 gross_amount_idr, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&order_id)
        .bind(PROVIDER_MANUAL)
        .bind(&order_no)
        .bind(METHOD_PAY_AT_PICKUP)
        .bind(PaymentStatus::Pending.as_str())
        .bind(total)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Created order {order_no} for user {user_id}: total {total} IDR");

        let summary = sqlx::query_as::<_, OrderSummary>(
            "SELECT id, order_no, status, total_idr, created_at FROM orders WHERE id = ?",
        )
        .bind(&order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    fn validate_payload(&self, req: &CreateOrderRequest) -> AppResult<()> {
        if req.customer_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "customer_name is required".to_string(),
            ));
        }
        if let Some(note) = &req.note {
            if note.len() > MAX_NOTE_LEN {
                return Err(AppError::ValidationError(
                    "note must be at most 300 characters".to_string(),
                ));
            }
        }
        if req.items.is_empty() {
            return Err(AppError::ValidationError(
                "items must not be empty".to_string(),
            ));
        }
        for item in &req.items {
            if item.qty < 1 || item.qty > MAX_ITEM_QTY {
                return Err(AppError::ValidationDetail {
                    message: format!("qty must be between 1 and {MAX_ITEM_QTY}"),
                    detail: json!({ "product_id": item.product_id }),
                });
            }
        }
        Ok(())
    }

    /// Load authoritative products and variants, reject anything missing or
    /// inactive, and recompute unit prices.
    async fn build_snapshot_lines(
        &self,
        items: &[CartItemInput],
    ) -> AppResult<Vec<SnapshotLine>> {
        let product_ids: Vec<&str> = {
            let mut seen = HashSet::new();
            items
                .iter()
                .map(|i| i.product_id.as_str())
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let sql = format!("SELECT * FROM products WHERE id IN ({placeholders})");
        let mut db_query = sqlx::query_as::<_, Product>(&sql);
        for id in &product_ids {
            db_query = db_query.bind(*id);
        }
        let products = db_query.fetch_all(&self.pool).await?;

        let product_map: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        for item in items {
            match product_map.get(item.product_id.as_str()) {
                Some(p) if p.is_active => {}
                _ => {
                    return Err(AppError::ValidationDetail {
                        message: "Product not available".to_string(),
                        detail: json!({ "product_id": item.product_id }),
                    });
                }
            }
        }

        // Load only the referenced variants.
        let size_codes: Vec<&str> = {
            let mut seen = HashSet::new();
            items
                .iter()
                .filter_map(|i| i.options.as_ref().and_then(|o| o.size.as_deref()))
                .filter(|c| seen.insert(*c))
                .collect()
        };

        let mut variant_map: HashMap<(String, String), Variant> = HashMap::new();
        if !size_codes.is_empty() {
            let pid_ph = vec!["?"; product_ids.len()].join(", ");
            let code_ph = vec!["?"; size_codes.len()].join(", ");
            let sql = format!(
                "SELECT * FROM product_variants WHERE product_id IN ({pid_ph}) AND code IN ({code_ph})"
            );
            let mut db_query = sqlx::query_as::<_, Variant>(&sql);
            for id in &product_ids {
                db_query = db_query.bind(*id);
            }
            for code in &size_codes {
                db_query = db_query.bind(*code);
            }
            let variants = db_query.fetch_all(&self.pool).await?;
            for v in variants {
                variant_map.insert((v.product_id.clone(), v.code.clone()), v);
            }
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = product_map[item.product_id.as_str()];
            let mut unit = product.price_idr;

            if let Some(size) = item.options.as_ref().and_then(|o| o.size.as_deref()) {
                let key = (item.product_id.clone(), size.to_string());
                match variant_map.get(&key) {
                    Some(v) if v.is_active => unit = (unit + v.price_delta_idr).max(0),
                    _ => {
                        return Err(AppError::ValidationDetail {
                            message: "Invalid variant".to_string(),
                            detail: json!({ "product_id": item.product_id, "size": size }),
                        });
                    }
                }
            }

            lines.push(SnapshotLine {
                product_id: item.product_id.clone(),
                product_name: product.name.clone(),
                unit_price_idr: unit,
                qty: item.qty,
                options: item.options.clone(),
                line_total_idr: unit * item.qty,
            });
        }

        Ok(lines)
    }

    pub async fn list_orders(
        &self,
        user_id: &str,
        query: &OrderQuery,
    ) -> AppResult<(Vec<OrderWithPayment>, PageMeta)> {
        let page = PageParams {
            limit: query.limit,
            offset: query.offset,
        };
        let limit = page.limit_or(20, 50);
        let offset = page.offset_or_zero();
        let status = normalize_status_filter(query.status.as_deref())?;

        let mut sql = String::from(
            "SELECT id, order_no, status, total_idr, created_at FROM orders WHERE user_id = ?",
        );
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut db_query = sqlx::query_as::<_, OrderSummary>(&sql).bind(user_id);
        if let Some(s) = status {
            db_query = db_query.bind(s.as_str());
        }
        let orders = db_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let with_payments = self.attach_payments(orders).await?;
        let meta = PageMeta {
            limit,
            offset,
            status: status.map(|s| s.as_str().to_string()),
            q: None,
        };
        Ok((with_payments, meta))
    }

    pub async fn get_order(&self, user_id: &str, order_id: &str) -> AppResult<OrderDetailResponse> {
        let order = self.load_order(order_id).await?;
        if order.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        self.load_detail(order).await
    }

    /// Shopper edits are limited to contact fields and only before payment.
    pub async fn update_order(
        &self,
        user_id: &str,
        order_id: &str,
        patch: &UpdateOrderRequest,
    ) -> AppResult<Order> {
        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No changes provided".to_string(),
            ));
        }
        if let Some(name) = &patch.customer_name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "customer_name must not be empty".to_string(),
                ));
            }
        }
        if let Some(note) = &patch.note {
            if note.len() > MAX_NOTE_LEN {
                return Err(AppError::ValidationError(
                    "note must be at most 300 characters".to_string(),
                ));
            }
        }

        let order = self.load_order(order_id).await?;
        if order.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if order.status != OrderStatus::PendingPayment {
            return Err(AppError::Conflict(
                "Order can no longer be edited".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE orders SET
                customer_name = COALESCE(?, customer_name),
                customer_phone = COALESCE(?, customer_phone),
                note = COALESCE(?, note),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.customer_name)
        .bind(&patch.customer_phone)
        .bind(&patch.note)
        .bind(Utc::now())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        self.load_order(order_id).await
    }

    // --- Admin operations -------------------------------------------------

    pub async fn admin_list_orders(
        &self,
        query: &AdminOrderQuery,
    ) -> AppResult<(Vec<OrderWithPayment>, PageMeta)> {
        let page = PageParams {
            limit: query.limit,
            offset: query.offset,
        };
        let limit = page.limit_or(25, 100);
        let offset = page.offset_or_zero();
        let status = normalize_status_filter(query.status.as_deref())?;
        let q = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut sql = String::from(
            "SELECT id, order_no, status, total_idr, created_at FROM orders WHERE 1 = 1",
        );
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if q.is_some() {
            sql.push_str(" AND (order_no LIKE ? OR customer_name LIKE ?)");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut db_query = sqlx::query_as::<_, OrderSummary>(&sql);
        if let Some(s) = status {
            db_query = db_query.bind(s.as_str());
        }
        if let Some(q) = q {
            let pattern = format!("%{q}%");
            db_query = db_query.bind(pattern.clone()).bind(pattern);
        }
        let orders = db_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let with_payments = self.attach_payments(orders).await?;
        let meta = PageMeta {
            limit,
            offset,
            status: status.map(|s| s.as_str().to_string()),
            q: q.map(str::to_string),
        };
        Ok((with_payments, meta))
    }

    pub async fn admin_get_order(&self, order_id: &str) -> AppResult<OrderDetailResponse> {
        let order = self.load_order(order_id).await?;
        self.load_detail(order).await
    }

    /// Status/note update. Marking an order paid also upserts a paid
    /// manual payment so cash sales stay consistent with gateway ones.
    pub async fn admin_update_order(
        &self,
        order_id: &str,
        patch: &AdminUpdateOrderRequest,
    ) -> AppResult<Order> {
        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No changes provided".to_string(),
            ));
        }

        let order = self.load_order(order_id).await?;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE orders SET
                status = COALESCE(?, status),
                note = COALESCE(?, note),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.status.map(|s| s.as_str()))
        .bind(&patch.note)
        .bind(now)
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        if patch.status == Some(OrderStatus::Paid) {
            sqlx::query(
                r#"
                INSERT INTO payments
                    (id, order_id, provider, provider_order_id, method, status,
                     gross_amount_idr, paid_at, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(order_id) DO UPDATE SET
                    provider = excluded.provider,
                    provider_order_id = excluded.provider_order_id,
                    method = excluded.method,
                    status = excluded.status,
                    gross_amount_idr = excluded.gross_amount_idr,
                    paid_at = excluded.paid_at,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(order_id)
            .bind(PROVIDER_MANUAL)
            .bind(&order.order_no)
            .bind(METHOD_ADMIN_MARK_PAID)
            .bind(PaymentStatus::Paid.as_str())
            .bind(order.total_idr)
            .bind(now)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }

        self.load_order(order_id).await
    }

    /// Hard delete. Children first, in explicit order, because storage-side
    /// cascade is not guaranteed to be configured.
    pub async fn admin_delete_order(&self, order_id: &str) -> AppResult<()> {
        // 404 before deleting anything.
        self.load_order(order_id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM payments WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        log::info!("Deleted order {order_id} with items and payment");
        Ok(())
    }

    // --- Shared loaders ---------------------------------------------------

    async fn load_order(&self, order_id: &str) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    async fn load_detail(&self, order: Order) -> AppResult<OrderDetailResponse> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY created_at ASC",
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await?;

        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
            .bind(&order.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(OrderDetailResponse {
            order,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            payment,
        })
    }

    async fn attach_payments(
        &self,
        orders: Vec<OrderSummary>,
    ) -> AppResult<Vec<OrderWithPayment>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT order_id, status, method, paid_at, gross_amount_idr
            FROM payments
            WHERE order_id IN ({placeholders})
            "#
        );
        let mut db_query = sqlx::query_as::<_, PaymentSummary>(&sql);
        for id in &ids {
            db_query = db_query.bind(*id);
        }
        let payments = db_query.fetch_all(&self.pool).await?;

        let mut pay_map: HashMap<String, PaymentSummary> = payments
            .into_iter()
            .map(|p| (p.order_id.clone(), p))
            .collect();

        Ok(orders
            .into_iter()
            .map(|o| {
                let payment = pay_map.remove(&o.id);
                OrderWithPayment { order: o, payment }
            })
            .collect())
    }
}

fn normalize_status_filter(raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => OrderStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::ValidationError(format!("Unknown status filter: {s}"))),
    }
}
