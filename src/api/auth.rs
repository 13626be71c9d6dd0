use actix_web::{web, HttpResponse, ResponseError};
use crate::{
    database::MongoDB,
    services::{auth_service, CredentialService, SessionClaims},
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = auth_service::RegisterRequest,
    responses(
        (status = 201, description = "User created", body = crate::models::UserInfo),
        (status = 400, description = "Invalid request body"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    request: web::Json<auth_service::RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/register - username: {}", request.username);

    match auth_service::register(&db, &request).await {
        Ok(user) => {
            log::info!("✅ Registration successful: {}", user.username);
            HttpResponse::Created().json(user)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.username, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = auth_service::LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = auth_service::LoginResponse),
        (status = 400, description = "Login failed")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    credentials: web::Data<CredentialService>,
    request: web::Json<auth_service::LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/login - username: {}", request.username);

    match auth_service::login(&db, &credentials, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.username);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.username, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "User information retrieved", body = crate::models::CurrentUser),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    claims: web::ReqData<SessionClaims>,
    db: web::Data<MongoDB>,
) -> HttpResponse {
    log::info!("👤 GET /auth/me - user {}", claims.user_id);

    match auth_service::get_current_user(&db, claims.user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => {
            log::error!("❌ Failed to get user {}: {}", claims.user_id, e);
            e.error_response()
        }
    }
}
