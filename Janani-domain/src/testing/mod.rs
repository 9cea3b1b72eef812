// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use janani_data::repository::tests::MockHealthScoreRepository;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::entities::health_factors::HealthFactors;
use crate::entities::health_score::{HealthScoreRecord, ScoreCalculation, ScoreSource, ScoringMode};
use crate::entities::observations::RawObservations;
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::factors;
use crate::services::health_score::{HealthScoreServiceError, HealthScoreServiceTrait};
use crate::services::scoring::compute_score;

/// Mock implementation of the HealthScoreServiceTrait for testing.
///
/// Scores with the real weighted formula and keeps history in memory.
pub struct MockHealthScoreService {
    history: RwLock<Vec<HealthScoreRecord>>,
    should_fail_storage: bool,
}

impl Default for MockHealthScoreService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthScoreService {
    /// Create a new mock health score service
    pub fn new() -> Self {
        Self {
            history: RwLock::new(Vec::new()),
            should_fail_storage: false,
        }
    }

    /// Configure the mock to fail every storage operation
    pub fn with_storage_failure(mut self) -> Self {
        self.should_fail_storage = true;
        self
    }

    /// Add pre-defined history records
    pub fn with_records(self, records: Vec<HealthScoreRecord>) -> Self {
        if let Ok(mut history) = self.history.write() {
            history.extend(records);
        }
        self
    }

    fn check_storage(&self) -> Result<(), HealthScoreServiceError> {
        if self.should_fail_storage {
            Err(HealthScoreServiceError::RepositoryError(
                "Repository error - mock is configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn lock_error<T>(_: T) -> HealthScoreServiceError {
        HealthScoreServiceError::RepositoryError("mock history lock poisoned".to_string())
    }
}

#[async_trait]
impl HealthScoreServiceTrait for MockHealthScoreService {
    fn derive_factors(&self, observations: &RawObservations) -> Result<HealthFactors, HealthScoreServiceError> {
        Ok(factors::derive_factors(observations)?)
    }

    fn score(&self, factors: &HealthFactors, mode: ScoringMode) -> Result<ScoreCalculation, HealthScoreServiceError> {
        // Iterative requests get fixed convergence data
        let (equilibrium_reached, iterations) = match mode {
            ScoringMode::Weighted => (None, None),
            ScoringMode::Iterative => (Some(true), Some(3)),
        };

        Ok(ScoreCalculation {
            factors: *factors,
            result: compute_score(factors),
            mode,
            equilibrium_reached,
            iterations,
            equilibrium: None,
            source: ScoreSource::Local,
            calculated_at: Utc::now(),
        })
    }

    async fn score_with_fallback(
        &self,
        factors: &HealthFactors,
        _user_id: Option<&str>,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, HealthScoreServiceError> {
        self.score(factors, mode)
    }

    async fn calculate_and_record(
        &self,
        user_id: &str,
        factors: HealthFactors,
        mode: ScoringMode,
    ) -> Result<ScoreCalculation, HealthScoreServiceError> {
        if user_id.trim().is_empty() {
            return Err(HealthScoreServiceError::ValidationError("userId must not be empty".to_string()));
        }
        self.check_storage()?;

        let calculation = self.score(&factors, mode)?;
        let record = HealthScoreRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            factors,
            result: calculation.result.clone(),
            mode,
            equilibrium_reached: calculation.equilibrium_reached,
            iterations: calculation.iterations,
            calculated_at: calculation.calculated_at,
        };

        self.history.write().map_err(Self::lock_error)?.push(record);

        Ok(calculation)
    }

    async fn get_latest_score(&self, user_id: &str) -> Result<HealthScoreRecord, HealthScoreServiceError> {
        self.check_storage()?;

        let history = self.history.read().map_err(Self::lock_error)?;
        history
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by(|a, b| a.calculated_at.cmp(&b.calculated_at))
            .cloned()
            .ok_or_else(|| HealthScoreServiceError::NotFound(
                format!("No health score recorded for user {}", user_id)
            ))
    }

    async fn get_score_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), HealthScoreServiceError> {
        self.check_storage()?;

        let history = self.history.read().map_err(Self::lock_error)?;
        let mut records: Vec<HealthScoreRecord> = history
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.calculated_at.cmp(&b.calculated_at));
        records.reverse();

        let total = records.len();
        let page = records
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        Ok((page, total))
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Database component status
    database_status: ComponentStatus,
    /// System status
    system_status: SystemStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock as if history were kept in memory
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self.system_status = SystemStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self.system_status = SystemStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Score history is kept in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        components.insert(
            "scoring".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
