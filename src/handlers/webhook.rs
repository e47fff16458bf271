use crate::models::MidtransNotification;
use crate::services::WebhookService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Gateway-signed payment notification. The SHA-512 signature inside the
/// body is the only authentication on this route.
#[utoipa::path(
    post,
    path = "/webhooks/midtrans",
    tag = "webhook",
    responses(
        (status = 200, description = "Notification processed or acknowledged"),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Signature mismatch")
    )
)]
pub async fn midtrans_webhook(
    webhook_service: web::Data<WebhookService>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    // Parse once as raw JSON (persisted for audit) and once typed.
    let raw: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "data": { "message": "Invalid body" }
            })));
        }
    };
    let notification: MidtransNotification = match serde_json::from_value(raw.clone()) {
        Ok(n) => n,
        Err(e) => {
            log::warn!("Webhook body missing required fields: {e}");
            return Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "data": { "message": "Invalid body" }
            })));
        }
    };

    match webhook_service.handle_notification(&notification, &raw).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "ok": true }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhooks").route("/midtrans", web::post().to(midtrans_webhook)),
    );
}
