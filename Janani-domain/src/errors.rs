use thiserror::Error;

use crate::entities::health_factors::FactorKind;

/// Errors raised by the scoring engine.
///
/// Every variant is a local computation error; none of them is ever turned
/// into a default score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// A supplied factor is non-numeric or outside its declared range
    #[error("Invalid factor {factor}: {reason}")]
    InvalidFactor {
        factor: FactorKind,
        reason: String,
    },

    /// A required factor was not supplied
    #[error("Missing required factor: {0}")]
    MissingFactor(FactorKind),

    /// A raw observation failed validation before factor derivation
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    /// Iteration parameters are unusable
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfiguration(String),

    /// The iterative refinement hit its cap or oscillated without converging
    #[error("Equilibrium not reached after {iterations} iterations")]
    ConvergenceNotReached {
        iterations: u32,
    },
}

/// Errors raised when calling a remote scoring service
#[derive(Debug, Error)]
pub enum ScoringClientError {
    /// The remote scorer could not be reached or answered with an error
    #[error("Scoring dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// The remote scorer answered with a body that could not be used
    #[error("Invalid response from scoring service: {0}")]
    InvalidResponse(String),
}
