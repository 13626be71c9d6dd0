mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer, ResponseError};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::CredentialService;
use crate::utils::AppError;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::other(e)
    })?;

    log::info!("🚀 Starting Fridge Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::io::Error::other(e)
        })?;
    log::info!("✅ MongoDB connected successfully");

    let db_data = web::Data::new(db);
    let credentials = web::Data::new(CredentialService::new(&config.jwt_secret));

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    let cors_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(credentials.clone())
            .app_data(json_config())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .route("/health", web::get().to(api::health::health_check))
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Registers every `/api/v1` route. Fridge and account routes sit behind
/// `AuthMiddleware`; the catalog is public.
fn routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth endpoints
        .service(
            web::scope("/api/v1/auth")
                .route("/register", web::post().to(api::auth::register))
                .route("/login", web::post().to(api::auth::login))
                .service(
                    web::resource("/me")
                        .wrap(middleware::AuthMiddleware)
                        .route(web::get().to(api::auth::get_me))
                )
        )
        // Fridge: the caller's owned products (requires JWT)
        .service(
            web::scope("/api/v1/fridge")
                .wrap(middleware::AuthMiddleware)
                .route("", web::get().to(api::fridge::list_fridge))
                .route("", web::put().to(api::fridge::set_fridge))
                .route("", web::delete().to(api::fridge::remove_fridge_entries))
                .route("/items", web::post().to(api::fridge::add_fridge_item))
                .route("/matching-recipes", web::get().to(api::fridge::matching_recipes))
        )
        // Catalog (public, read only)
        .route("/api/v1/products", web::get().to(api::catalog::get_products))
        .service(
            web::scope("/api/v1/recipes")
                .route("", web::get().to(api::catalog::get_recipes))
                .route("/random", web::get().to(api::catalog::get_random_recipe))
                .route("/ingredients", web::get().to(api::catalog::get_recipe_ingredients))
                .route("/{recipe_id}", web::get().to(api::catalog::get_recipe))  // catch-all, keep last
        );
}

/// Malformed JSON bodies get the same error envelope as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("❌ Rejected request body: {}", message);
        let response: HttpResponse = AppError::InvalidRequest(message).error_response();
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use serde_json::Map;

    const SECRET: &str = "routing-test-secret";

    // The database handle never connects; only behaviour decided before the
    // first query is asserted here.
    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(
                        database::MongoDB::lazy("mongodb://127.0.0.1:27017").await.unwrap(),
                    ))
                    .app_data(web::Data::new(CredentialService::new(SECRET)))
                    .app_data(json_config())
                    .configure(routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_fridge_routes_require_token() {
        let app = test_app!();

        for req in [
            test::TestRequest::get().uri("/api/v1/fridge").to_request(),
            test::TestRequest::put().uri("/api/v1/fridge").to_request(),
            test::TestRequest::delete().uri("/api/v1/fridge").to_request(),
            test::TestRequest::post().uri("/api/v1/fridge/items").to_request(),
            test::TestRequest::get().uri("/api/v1/fridge/matching-recipes").to_request(),
            test::TestRequest::get().uri("/api/v1/auth/me").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn test_expired_token_is_rejected() {
        let app = test_app!();
        let issued = chrono::Utc::now() - chrono::Duration::days(11);
        let token = CredentialService::new(SECRET).mint_at(1, Map::new(), issued).unwrap();

        let req = test::TestRequest::get()
            .uri("/api/v1/fridge/matching-recipes")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = test_app!();
        let token = CredentialService::new(SECRET).mint(1, Map::new()).unwrap();

        let req = test::TestRequest::put()
            .uri("/api/v1/fridge")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .insert_header(("Content-Type", "application/json"))
            .set_payload(r#"{"productIds": "milk"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_non_numeric_recipe_id_is_bad_request() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/v1/recipes/abc").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Wrong request! Recipe ID needed!");
    }
}
