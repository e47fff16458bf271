use crate::middlewares::auth_user;
use crate::models::CreateSnapRequest;
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/payments/midtrans",
    tag = "payment",
    request_body = CreateSnapRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Snap token, possibly reused"),
        (status = 403, description = "Not the order owner"),
        (status = 404, description = "Unknown order"),
        (status = 502, description = "Gateway rejected the request")
    )
)]
pub async fn create_snap_token(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    body: web::Json<CreateSnapRequest>,
) -> Result<HttpResponse> {
    let user = match auth_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .create_snap_token(&user.user_id, &body.order_id, Some(&user.email))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments").route("/midtrans", web::post().to(create_snap_token)),
    );
}
