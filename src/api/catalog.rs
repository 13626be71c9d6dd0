use actix_web::{web, HttpResponse, ResponseError};
use crate::{database::MongoDB, services::catalog_service};

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Catalog",
    responses(
        (status = 200, description = "All products", body = [crate::models::ProductResponse])
    )
)]
pub async fn get_products(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("🥕 GET /products");

    match catalog_service::list_products(&db).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            log::error!("❌ Failed to list products: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    tag = "Catalog",
    responses(
        (status = 200, description = "All recipes with category and ingredients", body = [crate::models::RecipeResponse])
    )
)]
pub async fn get_recipes(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📖 GET /recipes");

    match catalog_service::list_recipes(&db).await {
        Ok(recipes) => HttpResponse::Ok().json(recipes),
        Err(e) => {
            log::error!("❌ Failed to list recipes: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/ingredients",
    tag = "Catalog",
    responses(
        (status = 200, description = "Every recipe/product ingredient link", body = [crate::models::RecipeIngredientLink])
    )
)]
pub async fn get_recipe_ingredients(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("🔗 GET /recipes/ingredients");

    match catalog_service::list_recipe_ingredients(&db).await {
        Ok(links) => HttpResponse::Ok().json(links),
        Err(e) => {
            log::error!("❌ Failed to list recipe ingredients: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/random",
    tag = "Catalog",
    responses(
        (status = 200, description = "A random recipe", body = crate::models::RecipeResponse),
        (status = 404, description = "Catalog is empty")
    )
)]
pub async fn get_random_recipe(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("🎲 GET /recipes/random");

    match catalog_service::random_recipe(&db).await {
        Ok(recipe) => HttpResponse::Ok().json(recipe),
        Err(e) => {
            log::warn!("⚠️ No random recipe: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{recipe_id}",
    tag = "Catalog",
    params(
        ("recipe_id" = String, Path, description = "Numeric recipe id")
    ),
    responses(
        (status = 200, description = "Recipe detail", body = crate::models::RecipeResponse),
        (status = 400, description = "Recipe id is not a number"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn get_recipe(db: web::Data<MongoDB>, recipe_id: web::Path<String>) -> HttpResponse {
    log::info!("📖 GET /recipes/{}", recipe_id);

    let recipe_id = match catalog_service::parse_recipe_id(&recipe_id) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match catalog_service::recipe_detail(&db, recipe_id).await {
        Ok(recipe) => HttpResponse::Ok().json(recipe),
        Err(e) => {
            log::warn!("⚠️ Recipe {} unavailable: {}", recipe_id, e);
            e.error_response()
        }
    }
}
