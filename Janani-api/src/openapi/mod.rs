use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Health score endpoints
        crate::api::handlers::health_score::calculate_health_score,
        crate::api::handlers::health_score::derive_health_factors,
        crate::api::handlers::health_score::get_latest_health_score,
        crate::api::handlers::health_score::get_health_score_history,
    ),
    components(
        schemas(
            // Entities
            crate::entities::health_score::CalculateHealthScoreRequest,
            crate::entities::health_score::HealthScoreEntry,
            crate::entities::common::ErrorResponse,
            crate::entities::common::HealthScorePaginatedResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,

            // Domain schemas
            janani_domain::entities::HealthFactors,
            janani_domain::entities::PartialHealthFactors,
            janani_domain::entities::ScoringMode,
            janani_domain::entities::HealthStatus,
            janani_domain::entities::BalanceStatus,
            janani_domain::entities::FlowerLevel,
            janani_domain::entities::ScoreCalculationResponse,
            janani_domain::entities::RawObservations,
            janani_domain::entities::VitalSigns,
            janani_domain::entities::ActivityLog,
            janani_domain::entities::NutritionLog,
            janani_domain::entities::PcosManagement,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "health_score", description = "Maternal health score calculation and history")
    ),
    info(
        title = "JANANI Health Score API",
        version = "0.1.0",
        description = "Scores maternal health factors and keeps a per-user score history",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
