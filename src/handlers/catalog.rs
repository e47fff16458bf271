use crate::models::ProductQuery;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/categories",
    tag = "catalog",
    responses(
        (status = 200, description = "Active categories, sorted")
    )
)]
pub async fn get_categories(catalog_service: web::Data<CatalogService>) -> Result<HttpResponse> {
    match catalog_service.list_categories().await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "categories": categories }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "catalog",
    params(
        ("q" = Option<String>, Query, description = "Name search"),
        ("category" = Option<String>, Query, description = "Category slug filter"),
        ("limit" = Option<u32>, Query, description = "Page size, max 60"),
        ("offset" = Option<u32>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Active products with active variants")
    )
)]
pub async fn get_products(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse> {
    match catalog_service.list_products(&query).await {
        Ok(products) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "products": products,
                "meta": {
                    "q": query.q,
                    "category": query.category,
                    "limit": query.limit,
                    "offset": query.offset
                }
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/products/{slug}",
    tag = "catalog",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product detail"),
        (status = 404, description = "Unknown or inactive product")
    )
)]
pub async fn get_product(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match catalog_service.get_product_by_slug(&path).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "product": product }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/categories", web::get().to(get_categories))
        .service(
            web::scope("/products")
                .route("", web::get().to(get_products))
                .route("/{slug}", web::get().to(get_product)),
        );
}
