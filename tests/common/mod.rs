use chrono::Utc;
use kopi_backend::config::MidtransConfig;
use kopi_backend::database::DbPool;
use kopi_backend::external::MidtransService;
use kopi_backend::models::*;
use kopi_backend::services::AdminCatalogService;
use sqlx::sqlite::SqlitePoolOptions;

pub const TEST_SERVER_KEY: &str = "test-server-key";

/// Single-connection pool: every connection to `sqlite::memory:` is its
/// own database, so the pool must not open a second one.
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

pub fn test_midtrans() -> MidtransService {
    MidtransService::new(MidtransConfig {
        server_key: TEST_SERVER_KEY.to_string(),
        base_url: "http://localhost:1".to_string(),
        request_timeout_secs: 1,
    })
}

pub async fn seed_user(pool: &DbPool, user_id: &str, email: &str, role: &str) {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, email, password_hash, full_name, phone, role, created_at, updated_at)
        VALUES (?, ?, 'not-a-real-hash', 'Test User', NULL, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("seed user");
}

/// One product (Rp25.000) with S (+0, default) and L (+5.000) sizes.
/// Returns the product id.
pub async fn seed_catalog(pool: &DbPool) -> String {
    let admin = AdminCatalogService::new(pool.clone());

    let product = admin
        .create_product(&CreateProductRequest {
            category_id: None,
            name: "Es Kopi Susu".to_string(),
            slug: "es-kopi-susu".to_string(),
            description: None,
            price_idr: 25_000,
            image_path: None,
            is_active: Some(true),
        })
        .await
        .expect("seed product");

    admin
        .create_variant(&CreateVariantRequest {
            product_id: product.id.clone(),
            code: "S".to_string(),
            label: "Small".to_string(),
            price_delta_idr: 0,
            sort_order: Some(0),
            is_default: Some(true),
            is_active: Some(true),
        })
        .await
        .expect("seed variant S");

    admin
        .create_variant(&CreateVariantRequest {
            product_id: product.id.clone(),
            code: "L".to_string(),
            label: "Large".to_string(),
            price_delta_idr: 5_000,
            sort_order: Some(1),
            is_default: Some(false),
            is_active: Some(true),
        })
        .await
        .expect("seed variant L");

    product.id
}

pub fn order_request(product_id: &str, qty: i64, size: Option<&str>) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: "Budi".to_string(),
        customer_phone: Some("+628123456789".to_string()),
        note: None,
        items: vec![CartItemInput {
            product_id: product_id.to_string(),
            qty,
            options: size.map(|code| ItemOptions {
                temp: Some(Temp::Ice),
                size: Some(code.to_string()),
            }),
        }],
    }
}

pub async fn count_rows(pool: &DbPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count")
}
