// JANANI Domain
// This crate contains the health-score engine and its business rules

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Engine error types
pub mod errors;

// Health checks and system status
pub mod health;

// Client for a remote scoring service
#[cfg(feature = "with-remote")]
pub mod client;

// Re-export the database module from janani-data for convenience
pub use janani_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;

pub use entities::{HealthFactors, HealthResult, RawObservations, ScoringMode};
pub use errors::{ScoringClientError, ScoringError};
pub use services::{compute_score, compute_score_iterative, derive_factors};
