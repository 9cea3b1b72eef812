use axum::{http::StatusCode, response::IntoResponse, Json, Extension};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use std::time::{SystemTime, UNIX_EPOCH};
use std::sync::{Once, Arc};
use once_cell::sync::OnceCell;
// Use the trait from domain layer
use janani_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthService, HealthServiceTrait, SystemHealth,
    SystemStatus,
};

/// Health check response model with system information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Details about various components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Score history storage status
    pub database: ComponentHealthStatus,
    /// Scoring engine self-check status
    pub scoring: ComponentHealthStatus,
    /// Additional components (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<serde_json::Value>,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Track the time when the server started using a thread-safe OnceCell
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

// Initialize the server start time
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = SERVER_START_TIME.set(start_time);
    });
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy or running on in-memory history", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait + Send + Sync>>,
) -> impl IntoResponse {
    info!("Health check requested");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Calculate uptime if server start time is available
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;
    let response = build_health_response(&system_health, now, uptime);

    // A degraded database still serves scores from memory
    let status = match system_health.status {
        SystemStatus::Healthy | SystemStatus::Degraded => StatusCode::OK,
        SystemStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(response))
}

fn build_health_response(system_health: &SystemHealth, now: u64, uptime: Option<u64>) -> HealthResponse {
    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let component = |name: &str| ComponentHealthStatus {
        status: system_health.components.get(name)
            .map(|c| map_component_status(&c.status))
            .unwrap_or_else(|| "ok".to_string()),
        message: system_health.components.get(name)
            .and_then(|c| c.details.clone()),
    };

    let additional: serde_json::Map<String, serde_json::Value> = system_health.components.iter()
        .filter(|(name, _)| name.as_str() != "database" && name.as_str() != "scoring")
        .map(|(name, component)| {
            (name.clone(), serde_json::json!({
                "status": map_component_status(&component.status),
                "message": component.details,
            }))
        })
        .collect();

    HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            database: component("database"),
            scoring: component("scoring"),
            additional: if additional.is_empty() { None } else { Some(additional.into()) },
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }.to_string()
}

/// Factory function to create a health service
pub fn create_health_service() -> Arc<dyn HealthServiceTrait + Send + Sync> {
    Arc::new(HealthService)
}
