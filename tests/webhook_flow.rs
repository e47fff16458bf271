mod common;

use common::*;
use kopi_backend::database::DbPool;
use kopi_backend::error::AppError;
use kopi_backend::external::signature_hash;
use kopi_backend::models::*;
use kopi_backend::services::{OrderService, ReconcileOutcome, WebhookService};
use serde_json::json;

/// Notification body and raw payload for one order, signed with the test
/// server key. Midtrans formats gross_amount with two decimals.
fn signed_notification(
    order_no: &str,
    total_idr: i64,
    transaction_status: &str,
) -> (MidtransNotification, serde_json::Value) {
    let gross_amount = format!("{total_idr}.00");
    let signature = signature_hash(order_no, "200", &gross_amount, TEST_SERVER_KEY);
    let raw = json!({
        "order_id": order_no,
        "status_code": "200",
        "gross_amount": gross_amount,
        "signature_key": signature,
        "transaction_status": transaction_status,
        "fraud_status": "accept",
        "payment_type": "qris",
    });
    let notification: MidtransNotification = serde_json::from_value(raw.clone()).unwrap();
    (notification, raw)
}

async fn place_order(pool: &DbPool) -> OrderSummary {
    seed_user(pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(pool).await;
    OrderService::new(pool.clone())
        .create_order("user-1", &order_request(&product_id, 2, Some("L")))
        .await
        .unwrap()
}

async fn load_order(pool: &DbPool, order_id: &str) -> Order {
    sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn load_payment(pool: &DbPool, order_id: &str) -> Payment {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[actix_web::test]
async fn test_settlement_marks_order_paid() {
    let pool = test_pool().await;
    let order = place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (notification, raw) = signed_notification(&order.order_no, order.total_idr, "settlement");
    let outcome = service.handle_notification(&notification, &raw).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let reloaded = load_order(&pool, &order.id).await;
    assert_eq!(reloaded.status, OrderStatus::Paid);

    let payment = load_payment(&pool, &order.id).await;
    assert_eq!(payment.status, PaymentStatus::Paid);
    assert_eq!(payment.provider, PROVIDER_MIDTRANS);
    assert_eq!(payment.transaction_status.as_deref(), Some("settlement"));
    assert!(payment.paid_at.is_some());
    assert!(payment.provider_payload.is_some());
    // Only one payment row per order, upserted in place.
    assert_eq!(count_rows(&pool, "payments").await, 1);
}

#[actix_web::test]
async fn test_expire_cancels_order() {
    let pool = test_pool().await;
    let order = place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (notification, raw) = signed_notification(&order.order_no, order.total_idr, "expire");
    service.handle_notification(&notification, &raw).await.unwrap();

    let reloaded = load_order(&pool, &order.id).await;
    assert_eq!(reloaded.status, OrderStatus::Cancelled);
    let payment = load_payment(&pool, &order.id).await;
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert!(payment.paid_at.is_none());
}

#[actix_web::test]
async fn test_pending_status_leaves_order_untouched() {
    let pool = test_pool().await;
    let order = place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (notification, raw) = signed_notification(&order.order_no, order.total_idr, "pending");
    service.handle_notification(&notification, &raw).await.unwrap();

    let reloaded = load_order(&pool, &order.id).await;
    assert_eq!(reloaded.status, OrderStatus::PendingPayment);
    let payment = load_payment(&pool, &order.id).await;
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[actix_web::test]
async fn test_invalid_signature_is_rejected_without_mutation() {
    let pool = test_pool().await;
    let order = place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (mut notification, raw) =
        signed_notification(&order.order_no, order.total_idr, "settlement");
    notification.signature_key = "0".repeat(128);

    let err = service
        .handle_notification(&notification, &raw)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));

    let reloaded = load_order(&pool, &order.id).await;
    assert_eq!(reloaded.status, OrderStatus::PendingPayment);
}

#[actix_web::test]
async fn test_unknown_order_is_acknowledged_without_mutation() {
    let pool = test_pool().await;
    place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (notification, raw) = signed_notification("CSH-20250825-ZZZZZZ", 85_000, "settlement");
    let outcome = service.handle_notification(&notification, &raw).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::UnknownOrder);

    assert_eq!(count_rows(&pool, "orders").await, 1);
    assert_eq!(count_rows(&pool, "payments").await, 1);
}

#[actix_web::test]
async fn test_terminal_status_never_regresses() {
    let pool = test_pool().await;
    let order = place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (settle, settle_raw) =
        signed_notification(&order.order_no, order.total_idr, "settlement");
    service.handle_notification(&settle, &settle_raw).await.unwrap();

    // A late expire callback after settlement is acknowledged but ignored.
    let (expire, expire_raw) = signed_notification(&order.order_no, order.total_idr, "expire");
    let outcome = service.handle_notification(&expire, &expire_raw).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let reloaded = load_order(&pool, &order.id).await;
    assert_eq!(reloaded.status, OrderStatus::Paid);
    let payment = load_payment(&pool, &order.id).await;
    assert_eq!(payment.status, PaymentStatus::Paid);
    assert_eq!(payment.transaction_status.as_deref(), Some("settlement"));
}

#[actix_web::test]
async fn test_repeated_settlement_is_idempotent() {
    let pool = test_pool().await;
    let order = place_order(&pool).await;
    let service = WebhookService::new(pool.clone(), test_midtrans());

    let (notification, raw) = signed_notification(&order.order_no, order.total_idr, "settlement");
    service.handle_notification(&notification, &raw).await.unwrap();
    let outcome = service.handle_notification(&notification, &raw).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);

    let reloaded = load_order(&pool, &order.id).await;
    assert_eq!(reloaded.status, OrderStatus::Paid);
    assert_eq!(count_rows(&pool, "payments").await, 1);
}
