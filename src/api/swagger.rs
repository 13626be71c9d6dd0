use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fridge Service API",
        version = "1.0.0",
        description = "Backend for the fridge / recipe matching app.\n\n**Authentication:** fridge and account endpoints require a JWT Bearer token obtained from `/api/v1/auth/login`. Tokens are valid for 10 days."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::get_me,

        // Fridge
        crate::api::fridge::list_fridge,
        crate::api::fridge::set_fridge,
        crate::api::fridge::add_fridge_item,
        crate::api::fridge::remove_fridge_entries,
        crate::api::fridge::matching_recipes,

        // Catalog
        crate::api::catalog::get_products,
        crate::api::catalog::get_recipes,
        crate::api::catalog::get_recipe_ingredients,
        crate::api::catalog::get_random_recipe,
        crate::api::catalog::get_recipe,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::LoginResponse,
            crate::models::UserInfo,
            crate::models::CurrentUser,

            // Fridge
            crate::services::fridge_service::SetFridgeRequest,
            crate::services::fridge_service::AddFridgeItemRequest,
            crate::services::fridge_service::RemoveFridgeEntriesRequest,
            crate::services::fridge_service::FridgeResponse,
            crate::services::fridge_service::RemoveFridgeEntriesResponse,
            crate::services::availability_service::MatchingRecipesResponse,
            crate::models::FridgeEntryResponse,

            // Catalog
            crate::models::ProductResponse,
            crate::models::CategoryResponse,
            crate::models::IngredientResponse,
            crate::models::RecipeResponse,
            crate::models::RecipeIngredientLink,

            // Health
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and the current user."),
        (name = "Fridge", description = "The caller's owned products and the recipes they can make with them."),
        (name = "Catalog", description = "Public product and recipe catalog."),
        (name = "Health", description = "Service health."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/v1/auth/login"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/v1/auth/login",
            "/api/v1/fridge",
            "/api/v1/fridge/matching-recipes",
            "/api/v1/recipes/{recipe_id}",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
