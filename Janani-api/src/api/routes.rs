use axum::{
    routing::{get, post},
    Extension,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use janani_domain::health::HealthServiceTrait;
use crate::api::handlers::{health, health_score};
use crate::openapi::configure_swagger_routes;

/// Create the application router with the default services
pub async fn create_app() -> Router {
    debug!("Creating application router");

    // Create health score service using factory function
    let health_score_service = health_score::create_service();

    // Create health service using factory function
    let health_service = health::create_health_service();

    // Initialize health check service startup time
    health::initialize_server_start_time();
    debug!("Health check service initialized");

    create_router(health_score_service, health_service)
}

/// Assemble routes and middleware around the given services
pub fn create_router(
    health_score_service: health_score::HealthScoreService,
    health_service: Arc<dyn HealthServiceTrait + Send + Sync>,
) -> Router {
    // Static segments are distinct from the user id routes by length
    let api_routes = Router::new()
        .route("/health-score/calculate", post(health_score::calculate_health_score))
        .route("/health-score/factors", post(health_score::derive_health_factors))
        .route("/health-score/:user_id/latest", get(health_score::get_latest_health_score))
        .route("/health-score/:user_id/history", get(health_score::get_health_score_history))
        .with_state(health_score_service);

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes);

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);
    debug!("Swagger UI merged");

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    // Get Swagger UI routes
    let swagger = configure_swagger_routes();

    // Merge Swagger UI with the app router
    app.merge(swagger)
}
