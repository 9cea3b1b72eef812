use std::sync::Arc;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};
use validator::Validate;

// Import domain entities and services
use janani_domain::entities::observations::describe_validation_errors;
use janani_domain::entities::{HealthFactors, RawObservations, ScoreCalculationResponse};
use janani_domain::errors::ScoringError;
use janani_domain::services::{
    create_default_health_score_service, HealthScoreServiceError, HealthScoreServiceTrait,
};

// Import our entities
use crate::entities::common::{
    ErrorResponse, HealthScorePaginatedResponse, PaginatedResponse, PaginationParams,
};
use crate::entities::health_score::{CalculateHealthScoreRequest, HealthScoreEntry};

/// Service type for dependency injection
pub type HealthScoreService = Arc<dyn HealthScoreServiceTrait + Send + Sync>;

/// Create a default service for the handlers to use
pub fn create_service() -> HealthScoreService {
    Arc::new(create_default_health_score_service())
}

/// Map a service error to the public error body
pub fn map_service_error(err: HealthScoreServiceError) -> ErrorResponse {
    match err {
        HealthScoreServiceError::Scoring(
            e @ (ScoringError::InvalidFactor { .. }
            | ScoringError::MissingFactor(_)
            | ScoringError::InvalidObservation(_)),
        ) => {
            warn!("Rejected scoring input: {}", e);
            ErrorResponse::validation_error(&e.to_string(), None)
        }
        HealthScoreServiceError::ValidationError(msg) => {
            warn!("Validation failed: {}", msg);
            ErrorResponse::validation_error(&msg, None)
        }
        HealthScoreServiceError::NotFound(msg) => {
            info!("{}", msg);
            ErrorResponse::not_found(&msg)
        }
        other => {
            error!("Health score request failed: {}", other);
            ErrorResponse::internal_error()
        }
    }
}

/// Calculate a health score and record it in the user's history
#[utoipa::path(
    post,
    path = "/api/v1/health-score/calculate",
    request_body = CalculateHealthScoreRequest,
    responses(
        (status = 200, description = "Health score calculated", body = ScoreCalculationResponse),
        (status = 400, description = "Invalid or missing factors", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "health_score"
)]
#[instrument(skip(service, request))]
pub async fn calculate_health_score(
    State(service): State<HealthScoreService>,
    Json(request): Json<CalculateHealthScoreRequest>,
) -> Result<impl IntoResponse, Response> {
    if let Err(errors) = request.validate() {
        let message = describe_validation_errors(&errors);
        warn!("Invalid health score request: {}", message);
        return Err(ErrorResponse::validation_error(&message, None).into_response());
    }

    let factors = HealthFactors::try_from(request.factors)
        .map_err(|e| map_service_error(e.into()).into_response())?;
    let mode = request.mode.unwrap_or_default();

    info!("Calculating {} health score for user {}", mode, request.user_id);

    let calculation = service
        .calculate_and_record(&request.user_id, factors, mode)
        .await
        .map_err(|e| map_service_error(e).into_response())?;

    Ok((StatusCode::OK, Json(ScoreCalculationResponse::from(&calculation))))
}

/// Derive the five factor scores from raw observations
#[utoipa::path(
    post,
    path = "/api/v1/health-score/factors",
    request_body = RawObservations,
    responses(
        (status = 200, description = "Factors derived", body = HealthFactors),
        (status = 400, description = "Implausible observations", body = ErrorResponse),
    ),
    tag = "health_score"
)]
#[instrument(skip(service, observations))]
pub async fn derive_health_factors(
    State(service): State<HealthScoreService>,
    Json(observations): Json<RawObservations>,
) -> Result<impl IntoResponse, Response> {
    let factors = service
        .derive_factors(&observations)
        .map_err(|e| map_service_error(e).into_response())?;

    Ok((StatusCode::OK, Json(factors)))
}

/// Get the most recent health score of a user
#[utoipa::path(
    get,
    path = "/api/v1/health-score/{userId}/latest",
    params(
        ("userId" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Latest health score", body = HealthScoreEntry),
        (status = 404, description = "No score recorded for the user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "health_score"
)]
#[instrument(skip(service))]
pub async fn get_latest_health_score(
    State(service): State<HealthScoreService>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, Response> {
    info!("Fetching latest health score");

    let record = service
        .get_latest_score(&user_id)
        .await
        .map_err(|e| map_service_error(e).into_response())?;

    Ok((StatusCode::OK, Json(HealthScoreEntry::from(record))))
}

/// Get a page of a user's health score history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/health-score/{userId}/history",
    params(
        ("userId" = String, Path, description = "User identifier"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Health score history retrieved", body = HealthScorePaginatedResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "health_score"
)]
#[instrument(skip(service))]
pub async fn get_health_score_history(
    State(service): State<HealthScoreService>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, Response> {
    let limit = params.effective_limit();
    let offset = params.effective_offset();

    let (records, total) = service
        .get_score_history(&user_id, Some(limit), Some(offset))
        .await
        .map_err(|e| map_service_error(e).into_response())?;

    let base_url = format!("/api/v1/health-score/{}/history", user_id);
    let entries = records.into_iter().map(HealthScoreEntry::from).collect();

    Ok((StatusCode::OK, Json::<HealthScorePaginatedResponse>(PaginatedResponse::new(
        entries, total, limit, offset, &base_url,
    ))))
}
