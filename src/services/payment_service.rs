use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::external::{
    CustomerDetails, ItemDetail, MidtransService, SnapTransactionRequest, TransactionDetails,
};
use crate::models::*;
use chrono::Utc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentService {
    pool: DbPool,
    midtrans: MidtransService,
}

impl PaymentService {
    pub fn new(pool: DbPool, midtrans: MidtransService) -> Self {
        Self { pool, midtrans }
    }

    /// Obtain a Snap token for an order owned by the caller. A still-pending
    /// token is reused so repeated "Pay" clicks don't open duplicate
    /// gateway transactions.
    pub async fn create_snap_token(
        &self,
        user_id: &str,
        order_id: &str,
        email: Option<&str>,
    ) -> AppResult<SnapTokenResponse> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let existing = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
            .bind(&order.id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(p) = &existing {
            if p.provider == PROVIDER_MIDTRANS
                && p.status == PaymentStatus::Pending
                && p.snap_token.is_some()
            {
                return Ok(SnapTokenResponse {
                    token: p.snap_token.clone().unwrap_or_default(),
                    redirect_url: p.snap_redirect_url.clone(),
                    reused: true,
                });
            }
        }

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY created_at ASC",
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await?;

        let request = SnapTransactionRequest {
            transaction_details: TransactionDetails {
                order_id: order.order_no.clone(),
                gross_amount: order.total_idr,
            },
            item_details: items
                .iter()
                .map(|it| ItemDetail {
                    id: it.product_id.clone(),
                    name: it.product_name.clone(),
                    price: it.unit_price_idr,
                    quantity: it.qty,
                })
                .collect(),
            customer_details: CustomerDetails {
                first_name: order.customer_name.clone(),
                phone: order.customer_phone.clone(),
                email: email.map(str::to_string),
            },
        };

        let snap = self.midtrans.create_snap_transaction(&request).await?;

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, order_id, provider, provider_order_id, status,
                 gross_amount_idr, snap_token, snap_redirect_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(order_id) DO UPDATE SET
                provider = excluded.provider,
                provider_order_id = excluded.provider_order_id,
                status = excluded.status,
                gross_amount_idr = excluded.gross_amount_idr,
                snap_token = excluded.snap_token,
                snap_redirect_url = excluded.snap_redirect_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&order.id)
        .bind(PROVIDER_MIDTRANS)
        .bind(&order.order_no)
        .bind(PaymentStatus::Pending.as_str())
        .bind(order.total_idr)
        .bind(&snap.token)
        .bind(&snap.redirect_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        log::info!("Issued Snap token for order {}", order.order_no);

        Ok(SnapTokenResponse {
            token: snap.token,
            redirect_url: snap.redirect_url,
            reused: false,
        })
    }
}
