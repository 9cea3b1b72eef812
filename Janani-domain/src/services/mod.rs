pub mod equilibrium;
pub mod factors;
pub mod health_score;
pub mod recommendations;
pub mod scoring;

// Domain services
// This module contains the scoring engine and the service that records its results.

// Re-export engine entry points
pub use equilibrium::compute_score_iterative;
pub use factors::derive_factors;
pub use scoring::compute_score;

// Re-export service traits and factory functions
pub use health_score::{
    create_default_health_score_service, HealthScoreService, HealthScoreServiceError,
    HealthScoreServiceTrait, RemoteScorer, RemoteScorerHandle,
};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use health_score::create_mock_health_score_service;
