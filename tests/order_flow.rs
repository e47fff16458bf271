mod common;

use common::*;
use kopi_backend::error::AppError;
use kopi_backend::models::*;
use kopi_backend::services::OrderService;

#[actix_web::test]
async fn test_checkout_recomputes_prices_from_catalog() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    // Large is base 25_000 + delta 5_000; whatever the client thinks the
    // price is never enters the request shape at all.
    let mut req = order_request(&product_id, 2, Some("L"));
    req.items.push(CartItemInput {
        product_id: product_id.clone(),
        qty: 1,
        options: None,
    });

    let summary = service.create_order("user-1", &req).await.unwrap();
    assert!(summary.order_no.starts_with("CSH-"));
    assert_eq!(summary.status, OrderStatus::PendingPayment);
    assert_eq!(summary.total_idr, 2 * 30_000 + 25_000);

    let detail = service.get_order("user-1", &summary.id).await.unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].unit_price_idr, 30_000);
    assert_eq!(detail.items[0].line_total_idr, 60_000);
    assert_eq!(detail.items[1].unit_price_idr, 25_000);
    assert_eq!(detail.items[1].options, None);
    assert_eq!(detail.order.subtotal_idr, 85_000);
    assert_eq!(detail.order.discount_idr, 0);

    // Checkout seeds a pending pay-at-pickup payment.
    let payment = detail.payment.unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.method.as_deref(), Some(METHOD_PAY_AT_PICKUP));
    assert_eq!(payment.gross_amount_idr, 85_000);
}

#[actix_web::test]
async fn test_checkout_snapshot_options_survive_round_trip() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    let summary = service
        .create_order("user-1", &order_request(&product_id, 1, Some("S")))
        .await
        .unwrap();

    let detail = service.get_order("user-1", &summary.id).await.unwrap();
    let options = detail.items[0].options.clone().unwrap();
    assert_eq!(options.size.as_deref(), Some("S"));
    assert_eq!(options.temp, Some(Temp::Ice));
}

#[actix_web::test]
async fn test_checkout_rejects_unknown_product_and_writes_nothing() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    let err = service
        .create_order("user-1", &order_request("no-such-product", 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationDetail { .. }));

    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "order_items").await, 0);
    assert_eq!(count_rows(&pool, "payments").await, 0);
}

#[actix_web::test]
async fn test_checkout_rejects_inactive_product() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?")
        .bind(&product_id)
        .execute(&pool)
        .await
        .unwrap();

    let service = OrderService::new(pool.clone());
    let err = service
        .create_order("user-1", &order_request(&product_id, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationDetail { .. }));
    assert_eq!(count_rows(&pool, "orders").await, 0);
}

#[actix_web::test]
async fn test_checkout_rejects_unknown_size() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;

    let service = OrderService::new(pool.clone());
    let err = service
        .create_order("user-1", &order_request(&product_id, 1, Some("XL")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationDetail { .. }));
    assert_eq!(count_rows(&pool, "orders").await, 0);
}

#[actix_web::test]
async fn test_checkout_rejects_zero_qty_and_empty_cart() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    let err = service
        .create_order("user-1", &order_request(&product_id, 0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationDetail { .. }));

    let empty = CreateOrderRequest {
        customer_name: "Budi".to_string(),
        customer_phone: None,
        note: None,
        items: vec![],
    };
    let err = service.create_order("user-1", &empty).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[actix_web::test]
async fn test_checkout_rejects_absurd_qty_before_pricing() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    // Large enough that unit * qty would overflow i64 if it ever reached
    // the pricing arithmetic.
    let qty = i64::MAX / 25_000 + 1;
    let err = service
        .create_order("user-1", &order_request(&product_id, qty, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationDetail { .. }));

    // Just past the allowed ceiling is rejected the same way.
    let err = service
        .create_order("user-1", &order_request(&product_id, 1_000, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationDetail { .. }));

    // The ceiling itself is fine.
    let summary = service
        .create_order("user-1", &order_request(&product_id, 999, None))
        .await
        .unwrap();
    assert_eq!(summary.total_idr, 999 * 25_000);
}

#[actix_web::test]
async fn test_order_row_rolls_back_when_item_insert_fails() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    // Sabotage the snapshot insert after validation and pricing succeed.
    sqlx::query("DROP TABLE order_items")
        .execute(&pool)
        .await
        .unwrap();

    let err = service
        .create_order("user-1", &order_request(&product_id, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DatabaseError(_)));

    // The whole transaction rolled back: no order, no payment.
    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "payments").await, 0);
}

#[actix_web::test]
async fn test_order_detail_is_owner_only() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    seed_user(&pool, "user-2", "siti@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    let summary = service
        .create_order("user-1", &order_request(&product_id, 1, None))
        .await
        .unwrap();

    let err = service.get_order("user-2", &summary.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[actix_web::test]
async fn test_shopper_edit_only_while_pending_payment() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    let summary = service
        .create_order("user-1", &order_request(&product_id, 1, None))
        .await
        .unwrap();

    let patch = UpdateOrderRequest {
        customer_name: Some("Budi Santoso".to_string()),
        customer_phone: None,
        note: Some("less sugar".to_string()),
    };
    let updated = service
        .update_order("user-1", &summary.id, &patch)
        .await
        .unwrap();
    assert_eq!(updated.customer_name, "Budi Santoso");
    assert_eq!(updated.note.as_deref(), Some("less sugar"));

    service
        .admin_update_order(
            &summary.id,
            &AdminUpdateOrderRequest {
                status: Some(OrderStatus::Paid),
                note: None,
            },
        )
        .await
        .unwrap();

    let err = service
        .update_order("user-1", &summary.id, &patch)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_web::test]
async fn test_list_orders_scoped_to_user_with_payment_attached() {
    let pool = test_pool().await;
    seed_user(&pool, "user-1", "budi@example.com", ROLE_USER).await;
    seed_user(&pool, "user-2", "siti@example.com", ROLE_USER).await;
    let product_id = seed_catalog(&pool).await;
    let service = OrderService::new(pool.clone());

    service
        .create_order("user-1", &order_request(&product_id, 1, None))
        .await
        .unwrap();
    service
        .create_order("user-2", &order_request(&product_id, 3, None))
        .await
        .unwrap();

    let query = OrderQuery {
        limit: None,
        offset: None,
        status: None,
    };
    let (orders, meta) = service.list_orders("user-1", &query).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(meta.limit, 20);
    let payment = orders[0].payment.as_ref().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let bad = OrderQuery {
        limit: None,
        offset: None,
        status: Some("shipped".to_string()),
    };
    let err = service.list_orders("user-1", &bad).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
