use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::health_score::HealthScoreEntry;

/// Default page size for history queries
pub const DEFAULT_PAGE_LIMIT: usize = 20;
/// Largest page size a caller may request
pub const MAX_PAGE_LIMIT: usize = 100;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(message: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    /// HTTP status matching the error code
    pub fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Query parameters for paginated requests
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Number of results to return (default: 20, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<usize>,

    /// Number of results to skip (default: 0)
    #[param(minimum = 0)]
    pub offset: Option<usize>,
}

impl PaginationParams {
    /// Effective limit after applying the default and the cap
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Paginated response format
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(HealthScorePaginatedResponse = PaginatedResponse<HealthScoreEntry>)]
pub struct PaginatedResponse<T> {
    /// The data items for this page
    pub data: Vec<T>,

    /// Total number of items
    pub total: usize,

    /// Number of items returned
    pub count: usize,

    /// Number of items to skip
    pub offset: usize,

    /// Number of items per page
    pub limit: usize,

    /// URL for the next page, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// URL for the previous page, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl<T> PaginatedResponse<T> {
    /// Build a page with next/previous links relative to `base_url`
    pub fn new(data: Vec<T>, total: usize, limit: usize, offset: usize, base_url: &str) -> Self {
        let (next, previous) = pagination_links(total, limit, offset, base_url);
        Self {
            count: data.len(),
            data,
            total,
            offset,
            limit,
            next,
            previous,
        }
    }
}

/// Generate next/previous page links for a limit/offset window
pub fn pagination_links(
    total: usize,
    limit: usize,
    offset: usize,
    base_url: &str,
) -> (Option<String>, Option<String>) {
    let next = match offset.checked_add(limit) {
        Some(next_offset) if next_offset < total => {
            Some(format!("{}?limit={}&offset={}", base_url, limit, next_offset))
        }
        _ => None,
    };

    let previous = if offset > 0 {
        Some(format!("{}?limit={}&offset={}", base_url, limit, offset.saturating_sub(limit)))
    } else {
        None
    };

    (next, previous)
}
