use crate::middlewares::auth_user;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created, tokens issued"),
        (status = 400, description = "Invalid payload or email taken")
    )
)]
pub async fn sign_up(
    auth_service: web::Data<AuthService>,
    body: web::Json<SignUpRequest>,
) -> Result<HttpResponse> {
    match auth_service.sign_up(&body).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Tokens issued"),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn sign_in(
    auth_service: web::Data<AuthService>,
    body: web::Json<SignInRequest>,
) -> Result<HttpResponse> {
    match auth_service.sign_in(&body).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token"),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh(&body.refresh_token).await {
        Ok(access_token) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "access_token": access_token }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller profile"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(auth_service: web::Data<AuthService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = match auth_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match auth_service.get_profile(&user.user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "user": UserResponse::from(profile) }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/sign-up", web::post().to(sign_up))
            .route("/sign-in", web::post().to(sign_in))
            .route("/refresh", web::post().to(refresh)),
    )
    .route("/me", web::get().to(me));
}
