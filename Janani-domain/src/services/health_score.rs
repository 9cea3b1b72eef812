use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use janani_data::repository::{HealthScoreRepositoryTrait, RepositoryError};

use crate::entities::conversions;
use crate::entities::equilibrium::EquilibriumConfig;
use crate::entities::health_factors::HealthFactors;
use crate::entities::health_score::{
    HealthScoreRecord, ScoreCalculation, ScoreCalculationRequest, ScoreCalculationResponse,
    ScoreSource, ScoringMode,
};
use crate::entities::observations::RawObservations;
use crate::errors::{ScoringClientError, ScoringError};
use crate::services::equilibrium::compute_score_iterative;
use crate::services::factors;
use crate::services::scoring::compute_score;

/// Health score service errors
#[derive(Debug, Error)]
pub enum HealthScoreServiceError {
    /// The engine rejected the input or configuration
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Health score not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// A scoring service reachable over the network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteScorer {
    /// Ask the remote service to score the factors
    async fn calculate(
        &self,
        request: &ScoreCalculationRequest,
    ) -> Result<ScoreCalculationResponse, ScoringClientError>;
}

/// Shared handle to a remote scorer
pub type RemoteScorerHandle = Arc<dyn RemoteScorer + Send + Sync>;

/// Trait for health score service operations
#[async_trait]
pub trait HealthScoreServiceTrait {
    /// Validate raw observations and derive the five factors
    fn derive_factors(&self, observations: &RawObservations) -> Result<HealthFactors, HealthScoreServiceError>;

    /// Score factors locally with the selected algorithm
    fn score(&self, factors: &HealthFactors, mode: ScoringMode) -> Result<ScoreCalculation, HealthScoreServiceError>;

    /// Score through the remote service when one is configured, falling back
    /// to the local weighted score when it fails or no user is known
    async fn score_with_fallback(
        &self,
        factors: &HealthFactors,
        user_id: Option<&str>,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, HealthScoreServiceError>;

    /// Score the factors for a user and store the result in their history
    async fn calculate_and_record(
        &self,
        user_id: &str,
        factors: HealthFactors,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, HealthScoreServiceError>;

    /// Most recent stored score of a user
    async fn get_latest_score(&self, user_id: &str) -> Result<HealthScoreRecord, HealthScoreServiceError>;

    /// A page of a user's history, newest first, with the total count
    async fn get_score_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), HealthScoreServiceError>;
}

/// Health score service for domain logic
pub struct HealthScoreService<R: HealthScoreRepositoryTrait> {
    repository: R,
    config: EquilibriumConfig,
    remote: Option<RemoteScorerHandle>,
}

impl<R: HealthScoreRepositoryTrait> HealthScoreService<R> {
    /// Create a service with the default refinement parameters and no remote scorer
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            config: EquilibriumConfig::default(),
            remote: None,
        }
    }

    /// Use different refinement parameters
    pub fn with_config(mut self, config: EquilibriumConfig) -> Self {
        self.config = config;
        self
    }

    /// Consult a remote scorer first
    pub fn with_remote(mut self, remote: RemoteScorerHandle) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> HealthScoreServiceError {
        match err {
            RepositoryError::NotFound(msg) => HealthScoreServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => HealthScoreServiceError::ValidationError(msg),
            _ => HealthScoreServiceError::RepositoryError(err.to_string()),
        }
    }

    fn validate_user_id(user_id: &str) -> Result<(), HealthScoreServiceError> {
        if user_id.trim().is_empty() {
            return Err(HealthScoreServiceError::ValidationError(
                "userId must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn fallback(&self, factors: &HealthFactors) -> ScoreCalculation {
        ScoreCalculation {
            factors: *factors,
            result: compute_score(factors),
            mode: ScoringMode::Weighted,
            equilibrium_reached: None,
            iterations: None,
            equilibrium: None,
            source: ScoreSource::Fallback,
            calculated_at: Utc::now(),
        }
    }

    async fn score_remotely(
        &self,
        remote: &RemoteScorerHandle,
        factors: &HealthFactors,
        user_id: &str,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, ScoringClientError> {
        let request = ScoreCalculationRequest {
            factors: *factors,
            user_id: user_id.to_string(),
            mode: Some(mode),
        };

        let response = remote.calculate(&request).await?;
        let result = conversions::convert_response_to_domain_result(&response)
            .map_err(ScoringClientError::InvalidResponse)?;

        Ok(ScoreCalculation {
            factors: *factors,
            result,
            mode,
            equilibrium_reached: response.equilibrium_reached,
            iterations: response.iterations,
            equilibrium: None,
            source: ScoreSource::Remote,
            calculated_at: response.calculated_at,
        })
    }
}

#[async_trait]
impl<R: HealthScoreRepositoryTrait + Send + Sync> HealthScoreServiceTrait for HealthScoreService<R> {
    fn derive_factors(&self, observations: &RawObservations) -> Result<HealthFactors, HealthScoreServiceError> {
        Ok(factors::derive_factors(observations)?)
    }

    fn score(&self, factors: &HealthFactors, mode: ScoringMode) -> Result<ScoreCalculation, HealthScoreServiceError> {
        let calculated_at = Utc::now();

        let calculation = match mode {
            ScoringMode::Weighted => ScoreCalculation {
                factors: *factors,
                result: compute_score(factors),
                mode,
                equilibrium_reached: None,
                iterations: None,
                equilibrium: None,
                source: ScoreSource::Local,
                calculated_at,
            },
            ScoringMode::Iterative => {
                let iterative = compute_score_iterative(factors, &self.config)?;
                if !iterative.report.equilibrium_reached {
                    info!(
                        "Equilibrium not reached after {} iterations ({:?})",
                        iterative.report.iterations, iterative.report.convergence
                    );
                }
                ScoreCalculation {
                    factors: *factors,
                    result: iterative.result,
                    mode,
                    equilibrium_reached: Some(iterative.report.equilibrium_reached),
                    iterations: Some(iterative.report.iterations),
                    equilibrium: Some(iterative.report),
                    source: ScoreSource::Local,
                    calculated_at,
                }
            }
        };

        Ok(calculation)
    }

    async fn score_with_fallback(
        &self,
        factors: &HealthFactors,
        user_id: Option<&str>,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, HealthScoreServiceError> {
        let remote = match &self.remote {
            Some(remote) => remote,
            None => return self.score(factors, mode),
        };

        let user_id = match user_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                warn!("No user id available for remote scoring, using local weighted score");
                return Ok(self.fallback(factors));
            }
        };

        match self.score_remotely(remote, factors, user_id, mode).await {
            Ok(calculation) => {
                debug!("Remote scorer returned {}", calculation.result.final_score);
                Ok(calculation)
            }
            Err(e) => {
                warn!("Remote scoring failed, using local weighted score: {}", e);
                Ok(self.fallback(factors))
            }
        }
    }

    async fn calculate_and_record(
        &self,
        user_id: &str,
        factors: HealthFactors,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, HealthScoreServiceError> {
        Self::validate_user_id(user_id)?;

        let calculation = self.score_with_fallback(&factors, Some(user_id), mode).await?;

        let data_record = conversions::convert_to_data_create_record(user_id, &calculation);
        let stored = self.repository.insert(data_record)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!(
            "Recorded health score {} for user {}: {} ({})",
            stored.id, user_id, calculation.result.final_score, calculation.result.status
        );

        Ok(calculation)
    }

    async fn get_latest_score(&self, user_id: &str) -> Result<HealthScoreRecord, HealthScoreServiceError> {
        Self::validate_user_id(user_id)?;

        let data_record = self.repository.get_latest(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| HealthScoreServiceError::NotFound(
                format!("No health score recorded for user {}", user_id)
            ))?;

        conversions::convert_to_domain_record(data_record)
            .map_err(HealthScoreServiceError::RepositoryError)
    }

    async fn get_score_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), HealthScoreServiceError> {
        Self::validate_user_id(user_id)?;

        let (data_records, total) = self.repository.get_history(user_id, limit, offset)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let records = data_records
            .into_iter()
            .map(conversions::convert_to_domain_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(HealthScoreServiceError::RepositoryError)?;

        Ok((records, total))
    }
}

/// Create a default health score service using the repository from the data layer.
///
/// Reads the refinement parameters from the environment and, when
/// `REMOTE_SCORING_URL` is set, consults that scorer first.
pub fn create_default_health_score_service() -> impl HealthScoreServiceTrait + Send + Sync {
    let repository = janani_data::repository::HealthScoreRepository::new();
    let service = HealthScoreService::new(repository)
        .with_config(EquilibriumConfig::from_env_or_default());

    #[cfg(feature = "with-remote")]
    let service = match crate::client::RemoteScoringClient::from_env() {
        Some(client) => {
            info!("Remote scoring enabled at {}", client.base_url());
            service.with_remote(Arc::new(client))
        }
        None => service,
    };

    service
}

/// Create a mock health score service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_health_score_service() -> impl HealthScoreServiceTrait + Send + Sync {
    crate::testing::MockHealthScoreService::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::equilibrium::ConvergenceOutcome;
    use crate::entities::health_score::{BalanceStatus, FlowerLevel, HealthStatus};
    use crate::entities::observations::{ActivityLog, NutritionLog, PcosManagement, VitalSigns};
    use crate::entities::conversions::convert_to_data_create_record;
    use chrono::TimeZone;
    use janani_data::repository::tests::MockHealthScoreRepository;

    fn factors(values: [f64; 5]) -> HealthFactors {
        HealthFactors::new(values[0], values[1], values[2], values[3], values[4]).unwrap()
    }

    fn service_calculation(input: HealthFactors) -> ScoreCalculation {
        HealthScoreService::new(MockHealthScoreRepository::new())
            .score(&input, ScoringMode::Weighted)
            .unwrap()
    }

    fn remote_response(score: f64) -> ScoreCalculationResponse {
        ScoreCalculationResponse {
            success: true,
            score,
            status: HealthStatus::from_score(score),
            balance_status: BalanceStatus::Harmonious,
            equilibrium_factor: 1.7,
            flower_level: FlowerLevel::from_score(score, BalanceStatus::Harmonious),
            flower_emoji: String::new(),
            raw_score: score,
            standard_deviation: 1.26,
            equilibrium_reached: Some(true),
            recommendations: vec![],
            iterations: Some(3),
            calculated_at: Utc::now(),
        }
    }

    #[test]
    fn test_score_weighted_has_no_convergence_data() {
        let service = HealthScoreService::new(MockHealthScoreRepository::new());
        let calculation = service.score(&factors([8.0, 10.0, 8.0, 8.0, 6.0]), ScoringMode::Weighted).unwrap();

        assert_eq!(calculation.result.final_score, 8.0);
        assert_eq!(calculation.source, ScoreSource::Local);
        assert!(calculation.equilibrium_reached.is_none());
        assert!(calculation.iterations.is_none());
        assert!(calculation.equilibrium.is_none());
    }

    #[test]
    fn test_score_iterative_reports_convergence() {
        let service = HealthScoreService::new(MockHealthScoreRepository::new())
            .with_config(EquilibriumConfig::new(1, 0.001).unwrap());
        let calculation = service.score(&factors([2.0, 10.0, 10.0, 10.0, 10.0]), ScoringMode::Iterative).unwrap();

        assert_eq!(calculation.equilibrium_reached, Some(false));
        assert_eq!(calculation.iterations, Some(1));
        assert_eq!(
            calculation.equilibrium.map(|e| e.convergence),
            Some(ConvergenceOutcome::IterationCapReached)
        );
    }

    #[test]
    fn test_derive_factors_maps_observation_errors() {
        let service = HealthScoreService::new(MockHealthScoreRepository::new());
        let observations = RawObservations {
            symptoms: vec![],
            vitals: VitalSigns { systolic: 20, diastolic: 80, blood_sugar: 90.0 },
            activity: ActivityLog { steps: 0, exercise_minutes: 0 },
            nutrition: NutritionLog { water_glasses: 0, meal_quality: 3 },
            pcos: PcosManagement::default(),
        };

        let err = service.derive_factors(&observations).unwrap_err();
        assert!(matches!(err, HealthScoreServiceError::Scoring(ScoringError::InvalidObservation(_))));
    }

    #[tokio::test]
    async fn test_calculate_and_record_persists_history() {
        let service = HealthScoreService::new(MockHealthScoreRepository::new());

        let calculation = service
            .calculate_and_record("alice", factors([8.0, 10.0, 8.0, 8.0, 6.0]), ScoringMode::Weighted)
            .await
            .unwrap();
        assert_eq!(calculation.result.final_score, 8.0);

        let latest = service.get_latest_score("alice").await.unwrap();
        assert_eq!(latest.user_id, "alice");
        assert_eq!(latest.result, calculation.result);
        assert_eq!(latest.mode, ScoringMode::Weighted);

        let (history, total) = service.get_score_history("alice", None, None).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_history_reads_seeded_records_newest_first() {
        let stored = |id: &str, day: u32| {
            let mut calculation = service_calculation(factors([8.0, 10.0, 8.0, 8.0, 6.0]));
            calculation.calculated_at = Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap();
            convert_to_data_create_record("alice", &calculation).into_record(id.to_string())
        };
        let repository = MockHealthScoreRepository::with_records(vec![stored("a", 1), stored("b", 3), stored("c", 2)]);
        let service = HealthScoreService::new(repository);

        let (history, total) = service.get_score_history("alice", Some(2), None).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        assert_eq!(service.get_latest_score("alice").await.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_latest_score_not_found() {
        let service = HealthScoreService::new(MockHealthScoreRepository::new());
        let err = service.get_latest_score("nobody").await.unwrap_err();
        assert!(matches!(err, HealthScoreServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_user_id_is_rejected() {
        let service = HealthScoreService::new(MockHealthScoreRepository::new());
        let err = service
            .calculate_and_record(" ", factors([5.0; 5]), ScoringMode::Weighted)
            .await
            .unwrap_err();
        assert!(matches!(err, HealthScoreServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let service = HealthScoreService::new(MockHealthScoreRepository::failing());
        let err = service
            .calculate_and_record("alice", factors([5.0; 5]), ScoringMode::Weighted)
            .await
            .unwrap_err();
        assert!(matches!(err, HealthScoreServiceError::RepositoryError(_)));
    }

    #[tokio::test]
    async fn test_remote_result_is_used_when_available() {
        let mut remote = MockRemoteScorer::new();
        remote
            .expect_calculate()
            .withf(|request| request.user_id == "alice" && request.mode == Some(ScoringMode::Iterative))
            .times(1)
            .returning(|_| Ok(remote_response(9.1)));

        let service = HealthScoreService::new(MockHealthScoreRepository::new()).with_remote(Arc::new(remote));
        let calculation = service
            .score_with_fallback(&factors([9.0; 5]), Some("alice"), ScoringMode::Iterative)
            .await
            .unwrap();

        assert_eq!(calculation.source, ScoreSource::Remote);
        assert_eq!(calculation.result.final_score, 9.1);
        assert_eq!(calculation.iterations, Some(3));
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_weighted() {
        let mut remote = MockRemoteScorer::new();
        remote
            .expect_calculate()
            .times(1)
            .returning(|_| Err(ScoringClientError::DependencyUnavailable("connection refused".to_string())));

        let service = HealthScoreService::new(MockHealthScoreRepository::new()).with_remote(Arc::new(remote));
        let input = factors([2.0, 10.0, 10.0, 10.0, 10.0]);
        let calculation = service
            .score_with_fallback(&input, Some("alice"), ScoringMode::Iterative)
            .await
            .unwrap();

        assert_eq!(calculation.source, ScoreSource::Fallback);
        assert_eq!(calculation.mode, ScoringMode::Weighted);
        // Same constants as the local weighted path
        assert_eq!(calculation.result, compute_score(&input));
        assert!(calculation.equilibrium_reached.is_none());
    }

    #[tokio::test]
    async fn test_invalid_remote_response_falls_back() {
        let mut remote = MockRemoteScorer::new();
        remote.expect_calculate().returning(|_| Ok(remote_response(97.0)));

        let service = HealthScoreService::new(MockHealthScoreRepository::new()).with_remote(Arc::new(remote));
        let calculation = service
            .score_with_fallback(&factors([9.0; 5]), Some("alice"), ScoringMode::Iterative)
            .await
            .unwrap();

        assert_eq!(calculation.source, ScoreSource::Fallback);
    }

    #[tokio::test]
    async fn test_remote_labels_contradicting_score_fall_back() {
        let mut remote = MockRemoteScorer::new();
        remote.expect_calculate().returning(|_| {
            let mut response = remote_response(9.1);
            response.status = HealthStatus::Critical;
            response.flower_level = FlowerLevel::Seedling;
            Ok(response)
        });

        let service = HealthScoreService::new(MockHealthScoreRepository::new()).with_remote(Arc::new(remote));
        let input = factors([9.0; 5]);
        let calculation = service
            .calculate_and_record("alice", input, ScoringMode::Iterative)
            .await
            .unwrap();

        assert_eq!(calculation.source, ScoreSource::Fallback);
        assert_eq!(calculation.result, compute_score(&input));

        let latest = service.get_latest_score("alice").await.unwrap();
        assert_eq!(latest.result.status, HealthStatus::Stable);
        assert_ne!(latest.result.flower_level, FlowerLevel::Seedling);
    }

    #[tokio::test]
    async fn test_missing_user_id_skips_remote() {
        let mut remote = MockRemoteScorer::new();
        remote.expect_calculate().times(0);

        let service = HealthScoreService::new(MockHealthScoreRepository::new()).with_remote(Arc::new(remote));
        let calculation = service
            .score_with_fallback(&factors([9.0; 5]), None, ScoringMode::Iterative)
            .await
            .unwrap();

        assert_eq!(calculation.source, ScoreSource::Fallback);
    }
}
