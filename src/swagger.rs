use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;
use crate::utils::{PageMeta, PageParams};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::sign_up,
        handlers::auth::sign_in,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::catalog::get_categories,
        handlers::catalog::get_products,
        handlers::catalog::get_product,
        handlers::order::create_order,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::update_order,
        handlers::payment::create_snap_token,
        handlers::webhook::midtrans_webhook,
        handlers::admin::list_categories,
        handlers::admin::list_products,
        handlers::admin::list_orders,
        handlers::admin::update_order,
    ),
    components(
        schemas(
            SignUpRequest,
            SignInRequest,
            RefreshRequest,
            AuthResponse,
            UserResponse,
            Category,
            CategorySummary,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            Product,
            ProductWithVariants,
            CreateProductRequest,
            UpdateProductRequest,
            Variant,
            VariantSummary,
            CreateVariantRequest,
            UpdateVariantRequest,
            Order,
            OrderStatus,
            OrderSummary,
            OrderWithPayment,
            OrderDetailResponse,
            OrderItemResponse,
            ItemOptions,
            Temp,
            CartItemInput,
            CreateOrderRequest,
            UpdateOrderRequest,
            AdminUpdateOrderRequest,
            Payment,
            PaymentStatus,
            PaymentSummary,
            CreateSnapRequest,
            SnapTokenResponse,
            MidtransNotification,
            PageParams,
            PageMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "catalog", description = "Public catalog API"),
        (name = "order", description = "Order API"),
        (name = "payment", description = "Payment gateway bridge"),
        (name = "webhook", description = "Gateway callbacks"),
        (name = "admin", description = "Back-office API"),
    ),
    info(
        title = "Kopi Backend API",
        version = "1.0.0",
        description = "Pickup-only coffee shop storefront and back-office REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
