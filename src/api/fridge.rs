use actix_web::{web, HttpResponse, ResponseError};
use crate::{
    database::MongoDB,
    services::{availability_service, fridge_service, SessionClaims},
};

/// GET /api/v1/fridge - Lists the caller's fridge entries
#[utoipa::path(
    get,
    path = "/api/v1/fridge",
    tag = "Fridge",
    responses(
        (status = 200, description = "Fridge contents", body = fridge_service::FridgeResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_fridge(
    claims: web::ReqData<SessionClaims>,
    db: web::Data<MongoDB>,
) -> HttpResponse {
    let user_id = claims.user_id;
    log::info!("📋 GET /fridge - user {}", user_id);

    match fridge_service::list_fridge(&db, user_id).await {
        Ok(response) => {
            log::info!("✅ Listed {} fridge entries", response.count);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::error!("❌ Error listing fridge for user {}: {}", user_id, e);
            e.error_response()
        }
    }
}

/// PUT /api/v1/fridge - Replaces the caller's fridge contents
#[utoipa::path(
    put,
    path = "/api/v1/fridge",
    tag = "Fridge",
    request_body = fridge_service::SetFridgeRequest,
    responses(
        (status = 200, description = "Fridge replaced", body = fridge_service::FridgeResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_fridge(
    claims: web::ReqData<SessionClaims>,
    db: web::Data<MongoDB>,
    request: web::Json<fridge_service::SetFridgeRequest>,
) -> HttpResponse {
    let user_id = claims.user_id;
    log::info!("🧊 PUT /fridge - {} products for user {}", request.product_ids.len(), user_id);

    match fridge_service::set_fridge_contents(&db, user_id, request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::error!("❌ Failed to replace fridge for user {}: {}", user_id, e);
            e.error_response()
        }
    }
}

/// POST /api/v1/fridge/items - Adds one product to the caller's fridge
#[utoipa::path(
    post,
    path = "/api/v1/fridge/items",
    tag = "Fridge",
    request_body = fridge_service::AddFridgeItemRequest,
    responses(
        (status = 201, description = "Entry created", body = crate::models::FridgeEntryResponse),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Unknown product")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_fridge_item(
    claims: web::ReqData<SessionClaims>,
    db: web::Data<MongoDB>,
    request: web::Json<fridge_service::AddFridgeItemRequest>,
) -> HttpResponse {
    let user_id = claims.user_id;
    log::info!("➕ POST /fridge/items - product {} for user {}", request.product_id, user_id);

    match fridge_service::add_fridge_item(&db, user_id, request.into_inner()).await {
        Ok(entry) => HttpResponse::Created().json(entry),
        Err(e) => {
            log::warn!("⚠️ Failed to add fridge item for user {}: {}", user_id, e);
            e.error_response()
        }
    }
}

/// DELETE /api/v1/fridge - Removes entries by id from the caller's fridge
#[utoipa::path(
    delete,
    path = "/api/v1/fridge",
    tag = "Fridge",
    request_body = fridge_service::RemoveFridgeEntriesRequest,
    responses(
        (status = 200, description = "Entries removed", body = fridge_service::RemoveFridgeEntriesResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_fridge_entries(
    claims: web::ReqData<SessionClaims>,
    db: web::Data<MongoDB>,
    request: web::Json<fridge_service::RemoveFridgeEntriesRequest>,
) -> HttpResponse {
    let user_id = claims.user_id;
    log::info!("🗑️  DELETE /fridge - {} entries for user {}", request.ids.len(), user_id);

    match fridge_service::remove_fridge_entries(&db, user_id, request.into_inner()).await {
        Ok(response) => {
            log::info!("✅ Removed {} fridge entries", response.deleted);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::error!("❌ Failed to remove fridge entries for user {}: {}", user_id, e);
            e.error_response()
        }
    }
}

/// GET /api/v1/fridge/matching-recipes - Recipes the caller can make right now
#[utoipa::path(
    get,
    path = "/api/v1/fridge/matching-recipes",
    tag = "Fridge",
    responses(
        (status = 200, description = "Ids of fully satisfiable recipes", body = availability_service::MatchingRecipesResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn matching_recipes(
    claims: web::ReqData<SessionClaims>,
    db: web::Data<MongoDB>,
) -> HttpResponse {
    let user_id = claims.user_id;
    log::info!("🍳 GET /fridge/matching-recipes - user {}", user_id);

    match availability_service::matching_recipes_for_user(&db, user_id).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::error!("❌ Failed to match recipes for user {}: {}", user_id, e);
            e.error_response()
        }
    }
}
