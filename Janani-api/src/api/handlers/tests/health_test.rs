use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, Extension};
use janani_domain::health::{ComponentStatus, HealthServiceTrait};
use janani_domain::testing::MockHealthService;

use crate::api::handlers::health::{health_check, initialize_server_start_time, HealthResponse};

async fn call(service: MockHealthService) -> (StatusCode, HealthResponse) {
    initialize_server_start_time();

    let service: Arc<dyn HealthServiceTrait + Send + Sync> = Arc::new(service);
    let response = health_check(Extension(service)).await.into_response();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_healthy_service_reports_ok() {
    let (status, body) = call(MockHealthService::new()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
    assert_eq!(body.components.database.status, "ok");
    assert_eq!(body.components.scoring.status, "ok");
    assert!(body.components.additional.is_none());
    assert!(body.uptime.is_some());
}

#[tokio::test]
async fn test_in_memory_history_is_degraded_but_available() {
    let (status, body) = call(MockHealthService::new().with_degraded_database()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "degraded");
    assert_eq!(body.components.database.status, "degraded");
    assert_eq!(
        body.components.database.message.as_deref(),
        Some("Score history is kept in memory")
    );
}

#[tokio::test]
async fn test_unhealthy_database_is_server_error() {
    let (status, body) = call(MockHealthService::new().with_unhealthy_database()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.status, "error");
    assert_eq!(body.components.database.status, "error");
}

#[tokio::test]
async fn test_extra_components_are_reported() {
    let service = MockHealthService::new()
        .with_component("remote_scoring", ComponentStatus::Degraded, Some("timeout".to_string()));
    let (_, body) = call(service).await;

    let additional = body.components.additional.expect("additional components");
    assert_eq!(additional["remote_scoring"]["status"], "degraded");
    assert_eq!(additional["remote_scoring"]["message"], "timeout");
}
