use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::external::MidtransService;
use crate::models::*;
use chrono::Utc;
use uuid::Uuid;

/// Outcome reported back to the gateway. Unknown orders are acknowledged
/// without mutation so the gateway does not retry-storm us over test
/// traffic.
#[derive(Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied,
    UnknownOrder,
}

#[derive(Clone)]
pub struct WebhookService {
    pool: DbPool,
    midtrans: MidtransService,
}

impl WebhookService {
    pub fn new(pool: DbPool, midtrans: MidtransService) -> Self {
        Self { pool, midtrans }
    }

    /// Verify the gateway signature, then reconcile payment and order
    /// state. Repeated deliveries of the same terminal status are no-ops;
    /// a terminal payment status never regresses on a late callback.
    pub async fn handle_notification(
        &self,
        notification: &MidtransNotification,
        raw_payload: &serde_json::Value,
    ) -> AppResult<ReconcileOutcome> {
        let valid = self.midtrans.verify_notification_signature(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            &notification.signature_key,
        );
        if !valid {
            return Err(AppError::AuthError("Invalid signature".to_string()));
        }

        // The gateway's order_id is our human order number.
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_no = ?")
            .bind(&notification.order_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(order) = order else {
            log::warn!(
                "Webhook for unknown order {}, acknowledging without mutation",
                notification.order_id
            );
            return Ok(ReconcileOutcome::UnknownOrder);
        };

        let status = classify_transaction_status(&notification.transaction_status);

        let existing = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
            .bind(&order.id)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(p) = &existing {
            if p.status != PaymentStatus::Pending && p.status != status {
                log::warn!(
                    "Ignoring webhook for order {}: payment already {}, got {}",
                    order.order_no,
                    p.status.as_str(),
                    notification.transaction_status
                );
                return Ok(ReconcileOutcome::Applied);
            }
        }

        let now = Utc::now();
        let paid_at = if status == PaymentStatus::Paid {
            Some(now)
        } else {
            None
        };

        sqlx::query(
            r#"
            INSERT INTO payments
                (id, order_id, provider, provider_order_id, status,
                 gross_amount_idr, transaction_status, fraud_status,
                 provider_payload, paid_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(order_id) DO UPDATE SET
                provider = excluded.provider,
                provider_order_id = excluded.provider_order_id,
                status = excluded.status,
                transaction_status = excluded.transaction_status,
                fraud_status = excluded.fraud_status,
                provider_payload = excluded.provider_payload,
                paid_at = excluded.paid_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&order.id)
        .bind(PROVIDER_MIDTRANS)
        .bind(&notification.order_id)
        .bind(status.as_str())
        .bind(order.total_idr)
        .bind(&notification.transaction_status)
        .bind(&notification.fraud_status)
        .bind(serde_json::to_string(raw_payload)?)
        .bind(paid_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        match status {
            PaymentStatus::Paid => {
                self.set_order_status(&order.id, OrderStatus::Paid, now)
                    .await?;
                log::info!("Order {} marked paid via webhook", order.order_no);
            }
            PaymentStatus::Failed => {
                self.set_order_status(&order.id, OrderStatus::Cancelled, now)
                    .await?;
                log::info!("Order {} cancelled via webhook", order.order_no);
            }
            // Pending leaves the order untouched.
            PaymentStatus::Pending => {}
        }

        Ok(ReconcileOutcome::Applied)
    }

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Fixed mapping from the gateway's transaction_status vocabulary to ours.
pub fn classify_transaction_status(transaction_status: &str) -> PaymentStatus {
    match transaction_status {
        "settlement" | "capture" => PaymentStatus::Paid,
        "cancel" | "deny" | "expire" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_statuses() {
        assert_eq!(classify_transaction_status("settlement"), PaymentStatus::Paid);
        assert_eq!(classify_transaction_status("capture"), PaymentStatus::Paid);
    }

    #[test]
    fn test_failed_statuses() {
        assert_eq!(classify_transaction_status("cancel"), PaymentStatus::Failed);
        assert_eq!(classify_transaction_status("deny"), PaymentStatus::Failed);
        assert_eq!(classify_transaction_status("expire"), PaymentStatus::Failed);
    }

    #[test]
    fn test_anything_else_is_pending() {
        assert_eq!(classify_transaction_status("pending"), PaymentStatus::Pending);
        assert_eq!(classify_transaction_status("authorize"), PaymentStatus::Pending);
        assert_eq!(classify_transaction_status(""), PaymentStatus::Pending);
    }
}
