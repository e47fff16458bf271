use crate::middlewares::auth_user;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order created"),
        (status = 400, description = "Invalid payload or unavailable product/variant"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user = match auth_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.create_order(&user.user_id, &body).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "order": order }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("limit" = Option<u32>, Query, description = "Page size, max 50"),
        ("offset" = Option<u32>, Query, description = "Page offset"),
        ("status" = Option<String>, Query, description = "Status filter")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's orders, newest first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = match auth_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.list_orders(&user.user_id, &query).await {
        Ok((orders, meta)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "orders": orders, "meta": meta }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = String, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order with items and payment"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown order")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user = match auth_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.get_order(&user.user_id, &path).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order updated"),
        (status = 409, description = "Order is past pending_payment")
    )
)]
pub async fn update_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    let user = match auth_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.update_order(&user.user_id, &path, &body).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "order": order }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(get_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::patch().to(update_order)),
    );
}
