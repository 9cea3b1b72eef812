use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use janani_domain::services::create_mock_health_score_service;
use janani_domain::testing::MockHealthService;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::api::routes::create_router;

fn test_app() -> Router {
    create_router(
        Arc::new(create_mock_health_score_service()),
        Arc::new(MockHealthService::new()),
    )
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_route() {
    let response = test_app().oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_calculate_route() {
    let request = json_request(
        Method::POST,
        "/api/v1/health-score/calculate",
        json!({
            "factors": {
                "symptomScore": 10, "vitalScore": 10, "activityScore": 10,
                "nutritionScore": 10, "pcosScore": 10
            },
            "userId": "alice",
            "mode": "weighted"
        }),
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["score"], 10.0);
    assert_eq!(body["balanceStatus"], "Harmonious");
    assert_eq!(body["flowerLevel"], "Hibiscus");
    assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_calculate_route_rejects_missing_factor() {
    let request = json_request(
        Method::POST,
        "/api/v1/health-score/calculate",
        json!({
            "factors": { "symptomScore": 8, "vitalScore": 10 },
            "userId": "alice"
        }),
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("activityScore"));
}

#[tokio::test]
async fn test_factors_route() {
    let request = json_request(
        Method::POST,
        "/api/v1/health-score/factors",
        json!({
            "symptoms": ["fatigue"],
            "vitals": { "systolic": 120, "diastolic": 80, "bloodSugar": 90 },
            "activity": { "steps": 6000, "exerciseMinutes": 20 },
            "nutrition": { "waterGlasses": 6, "mealQuality": 4 },
            "pcos": { "hasPcos": true, "managementActions": 2 }
        }),
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["symptomScore"], 8.0);
    assert_eq!(body["vitalScore"], 10.0);
    assert_eq!(body["activityScore"], 8.0);
    assert_eq!(body["nutritionScore"], 8.0);
    assert_eq!(body["pcosScore"], 6.0);
}

#[tokio::test]
async fn test_implausible_observations_are_rejected() {
    let request = json_request(
        Method::POST,
        "/api/v1/health-score/factors",
        json!({
            "vitals": { "systolic": 400, "diastolic": 76, "bloodSugar": 95 },
            "activity": { "steps": 7000, "exerciseMinutes": 20 },
            "nutrition": { "waterGlasses": 8, "mealQuality": 4 }
        }),
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("vitals.systolic"));
}

#[tokio::test]
async fn test_latest_route_not_found() {
    let response = test_app()
        .oneshot(get_request("/api/v1/health-score/nobody/latest"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_route_for_unknown_user_is_empty() {
    let response = test_app()
        .oneshot(get_request("/api/v1/health-score/nobody/history?limit=5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_history_route_with_huge_offset() {
    let app = test_app();
    let calculate = json_request(
        Method::POST,
        "/api/v1/health-score/calculate",
        json!({
            "factors": {
                "symptomScore": 8, "vitalScore": 10, "activityScore": 8,
                "nutritionScore": 8, "pcosScore": 6
            },
            "userId": "alice",
            "mode": "weighted"
        }),
    );
    assert_eq!(app.clone().oneshot(calculate).await.unwrap().status(), StatusCode::OK);

    let uri = format!("/api/v1/health-score/alice/history?offset={}", usize::MAX);
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"], json!([]));
    assert!(body.get("next").is_none());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = test_app()
        .oneshot(get_request("/api-docs/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["paths"]["/api/v1/health-score/calculate"].is_object());
}
