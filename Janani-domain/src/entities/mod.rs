// Domain entities and value objects
pub mod conversions;
pub mod equilibrium;
pub mod health_factors;
pub mod health_score;
pub mod observations;

// Re-export common types for easier imports
pub use equilibrium::{
    ConvergenceOutcome, EquilibriumConfig, EquilibriumDimension, EquilibriumFactors,
    EquilibriumReport, EquilibriumWeights, IterativeHealthResult,
};
pub use health_factors::{FactorKind, HealthFactors, PartialHealthFactors};
pub use health_score::{
    BalanceStatus, FlowerLevel, HealthResult, HealthScoreRecord, HealthStatus, ScoreCalculation,
    ScoreCalculationRequest, ScoreCalculationResponse, ScoreSource, ScoringMode,
};
pub use observations::{
    ActivityLog, MealQuality, NutritionLog, PcosManagement, RawObservations, VitalSigns,
};
