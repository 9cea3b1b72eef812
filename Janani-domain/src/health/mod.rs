//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;

use async_trait::async_trait;
use janani_data::database::{self, DatabaseError};

use crate::entities::health_factors::HealthFactors;
use crate::services::scoring::compute_score;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced capability
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    /// Returns true if the database is healthy, false if scores are only kept in memory
    /// Returns an error if the database is configured but failing
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service backed by the real storage and engine
#[derive(Debug, Default)]
pub struct HealthService;

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        get_system_health().await
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status().await
    }
}

/// Check if the database is available and functioning properly
///
/// Returns:
/// - Ok(true) if the database answers queries
/// - Ok(false) if no pool was initialized and history lives in memory
/// - Err if the pool exists but queries fail
pub async fn check_database_status() -> Result<bool, String> {
    match database::check_database_health() {
        Ok(()) => Ok(true),
        Err(DatabaseError::PoolNotInitialized) => Ok(false),
        Err(e) => Err(format!("Database connection error: {}", e)),
    }
}

/// Score a fixed input and compare with its known result
fn check_scoring_engine() -> HealthComponent {
    let probe = HealthFactors::uniform(10.0).map(|factors| compute_score(&factors));

    match probe {
        Ok(result) if result.final_score == 10.0 => HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        },
        Ok(result) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(format!("Probe scored {} instead of 10.0", result.final_score)),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e.to_string()),
        },
    }
}

/// Get overall system health
pub async fn get_system_health() -> SystemHealth {
    let db_component = match check_database_status().await {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: database::get_connection_info(),
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Database not initialized, score history is kept in memory".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    };

    let scoring_component = check_scoring_engine();

    let statuses = [&db_component.status, &scoring_component.status];
    let overall_status = if statuses.iter().any(|s| **s == ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if statuses.iter().any(|s| **s == ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    };

    SystemHealth {
        status: overall_status,
        components: vec![
            ("database".to_string(), db_component),
            ("scoring".to_string(), scoring_component),
        ].into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_probe_is_healthy() {
        assert_eq!(check_scoring_engine().status, ComponentStatus::Healthy);
    }

    #[test]
    fn test_get_system_health() {
        let health = tokio_test::block_on(get_system_health());
        // Database state depends on the environment; just check components are present
        assert!(health.components.contains_key("database"));
        assert_eq!(health.components["scoring"].status, ComponentStatus::Healthy);
    }
}
