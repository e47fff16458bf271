use crate::error::AppError;
use crate::middlewares::auth_user;
use crate::models::*;
use crate::services::{AdminCatalogService, AuthService, OrderService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Shared gate for every /admin route: valid token plus admin role.
async fn require_admin(auth_service: &AuthService, req: &HttpRequest) -> Result<(), AppError> {
    let user = auth_user(req)?;
    auth_service.require_admin(&user.user_id).await?;
    Ok(())
}

// --- Categories -----------------------------------------------------------

#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories including inactive"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_categories(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.list_categories().await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "categories": categories }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_category(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    body: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.create_category(&body).await {
        Ok(category) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "category": category }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_category(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.get_category(&path).await {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "category": category }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_category(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.update_category(&path, &body).await {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "category": category }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_category(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.delete_category(&path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "deleted": true }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// --- Products -------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/admin/products",
    tag = "admin",
    params(
        ("q" = Option<String>, Query, description = "Name/slug search"),
        ("category_id" = Option<String>, Query, description = "Category filter"),
        ("active" = Option<String>, Query, description = "true | false")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Products, newest first"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_products(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    query: web::Query<AdminProductQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.list_products(&query).await {
        Ok(products) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "products": products }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_product(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.create_product(&body).await {
        Ok(product) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "product": product }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_product(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.get_product(&path).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "product": product }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_product(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.update_product(&path, &body).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "product": product }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_product(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.delete_product(&path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "deleted": true }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// --- Variants -------------------------------------------------------------

pub async fn list_variants(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    query: web::Query<VariantQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.list_variants(&query).await {
        Ok(variants) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "variants": variants }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_variant(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    body: web::Json<CreateVariantRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.create_variant(&body).await {
        Ok(variant) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "variant": variant }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_variant(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.get_variant(&path).await {
        Ok(variant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "variant": variant }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_variant(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateVariantRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.update_variant(&path, &body).await {
        Ok(variant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "variant": variant }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_variant(
    auth_service: web::Data<AuthService>,
    admin_service: web::Data<AdminCatalogService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match admin_service.delete_variant(&path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "deleted": true }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// --- Orders ---------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/admin/orders",
    tag = "admin",
    params(
        ("limit" = Option<u32>, Query, description = "Page size, max 100"),
        ("offset" = Option<u32>, Query, description = "Page offset"),
        ("status" = Option<String>, Query, description = "Status filter"),
        ("q" = Option<String>, Query, description = "Search order_no / customer_name")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders with payment summaries"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_orders(
    auth_service: web::Data<AuthService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<AdminOrderQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match order_service.admin_list_orders(&query).await {
        Ok((orders, meta)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "orders": orders, "meta": meta }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_order(
    auth_service: web::Data<AuthService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match order_service.admin_get_order(&path).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/admin/orders/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Order id")),
    request_body = AdminUpdateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order updated; marking paid also upserts the payment"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Unknown order")
    )
)]
pub async fn update_order(
    auth_service: web::Data<AuthService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<AdminUpdateOrderRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match order_service.admin_update_order(&path, &body).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "order": order }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_order(
    auth_service: web::Data<AuthService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&auth_service, &req).await {
        return Ok(e.error_response());
    }
    match order_service.admin_delete_order(&path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "deleted": true }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/categories", web::get().to(list_categories))
            .route("/categories", web::post().to(create_category))
            .route("/categories/{id}", web::get().to(get_category))
            .route("/categories/{id}", web::patch().to(update_category))
            .route("/categories/{id}", web::delete().to(delete_category))
            .route("/products", web::get().to(list_products))
            .route("/products", web::post().to(create_product))
            .route("/products/{id}", web::get().to(get_product))
            .route("/products/{id}", web::patch().to(update_product))
            .route("/products/{id}", web::delete().to(delete_product))
            .route("/variants", web::get().to(list_variants))
            .route("/variants", web::post().to(create_variant))
            .route("/variants/{id}", web::get().to(get_variant))
            .route("/variants/{id}", web::patch().to(update_variant))
            .route("/variants/{id}", web::delete().to(delete_variant))
            .route("/orders", web::get().to(list_orders))
            .route("/orders/{id}", web::get().to(get_order))
            .route("/orders/{id}", web::patch().to(update_order))
            .route("/orders/{id}", web::delete().to(delete_order)),
    );
}
