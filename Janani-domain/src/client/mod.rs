//! HTTP client for a remote scoring service.
//!
//! The remote service speaks the same calculate endpoint this workspace
//! serves, so another deployment can act as the primary scorer.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::entities::health_score::{ScoreCalculationRequest, ScoreCalculationResponse};
use crate::errors::ScoringClientError;
use crate::services::health_score::RemoteScorer;

/// Default request timeout for the remote scorer
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const CALCULATE_PATH: &str = "/api/v1/health-score/calculate";

/// reqwest-backed [`RemoteScorer`]
#[derive(Debug, Clone)]
pub struct RemoteScoringClient {
    client: Client,
    base_url: String,
}

impl RemoteScoringClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScoringClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringClientError::DependencyUnavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build from `REMOTE_SCORING_URL` and `REMOTE_SCORING_TIMEOUT_SECS`.
    ///
    /// Returns None when no URL is configured or the client cannot be built.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("REMOTE_SCORING_URL").ok().filter(|url| !url.trim().is_empty())?;

        let timeout_secs = env::var("REMOTE_SCORING_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        match Self::new(&base_url, Duration::from_secs(timeout_secs)) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Remote scoring disabled: {}", e);
                None
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn calculate_url(&self) -> String {
        format!("{}{}", self.base_url, CALCULATE_PATH)
    }
}

#[async_trait]
impl RemoteScorer for RemoteScoringClient {
    async fn calculate(
        &self,
        request: &ScoreCalculationRequest,
    ) -> Result<ScoreCalculationResponse, ScoringClientError> {
        let url = self.calculate_url();
        debug!("Requesting remote health score from {}", url);

        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ScoringClientError::DependencyUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScoringClientError::DependencyUnavailable(format!(
                "scoring service returned {}",
                response.status()
            )));
        }

        response
            .json::<ScoreCalculationResponse>()
            .await
            .map_err(|e| ScoringClientError::InvalidResponse(e.to_string()))
    }
}
