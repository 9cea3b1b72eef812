// Repository module structure
pub mod errors;
mod health_score;
mod in_memory;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use health_score::{HealthScoreRepository, HealthScoreRepositoryTrait};
pub use in_memory::InMemoryStorage;

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use health_score::tests;
