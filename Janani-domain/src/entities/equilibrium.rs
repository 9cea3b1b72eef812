use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::health_factors::HealthFactors;
use crate::entities::health_score::HealthResult;
use crate::errors::ScoringError;

pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.001;

/// One of the seven 0-100 dimensions used by the iterative refinement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum EquilibriumDimension {
    Sleep,
    Nutrition,
    Stress,
    Exercise,
    Vitals,
    Symptoms,
    Pcos,
}

impl EquilibriumDimension {
    pub const ALL: [EquilibriumDimension; 7] = [
        EquilibriumDimension::Sleep,
        EquilibriumDimension::Nutrition,
        EquilibriumDimension::Stress,
        EquilibriumDimension::Exercise,
        EquilibriumDimension::Vitals,
        EquilibriumDimension::Symptoms,
        EquilibriumDimension::Pcos,
    ];

    /// Stress and symptoms are better when lower
    pub fn lower_is_better(self) -> bool {
        matches!(self, EquilibriumDimension::Stress | EquilibriumDimension::Symptoms)
    }

    /// Targeted guidance for a weak dimension
    pub fn guidance(self) -> &'static str {
        match self {
            EquilibriumDimension::Sleep => "Prioritize 7-9 hours of quality sleep to boost overall wellness harmony",
            EquilibriumDimension::Nutrition => "Focus on balanced nutrition with prenatal vitamins for optimal health balance",
            EquilibriumDimension::Stress => "Practice mindfulness and relaxation techniques to reduce stress impact",
            EquilibriumDimension::Exercise => "Gentle prenatal exercises can improve multiple health factors simultaneously",
            EquilibriumDimension::Vitals => "Monitor blood pressure and blood sugar regularly with your healthcare provider",
            EquilibriumDimension::Symptoms => "Track symptoms and discuss patterns with your doctor for better management",
            EquilibriumDimension::Pcos => "Continue PCOS management strategies for hormonal balance",
        }
    }
}

impl fmt::Display for EquilibriumDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquilibriumDimension::Sleep => "sleep",
            EquilibriumDimension::Nutrition => "nutrition",
            EquilibriumDimension::Stress => "stress",
            EquilibriumDimension::Exercise => "exercise",
            EquilibriumDimension::Vitals => "vitals",
            EquilibriumDimension::Symptoms => "symptoms",
            EquilibriumDimension::Pcos => "pcos",
        };
        f.write_str(name)
    }
}

/// Seven values keyed by dimension.
///
/// Used both for the 0-100 dimension scores and for their weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumFactors {
    pub sleep: f64,
    pub nutrition: f64,
    pub stress: f64,
    pub exercise: f64,
    pub vitals: f64,
    pub symptoms: f64,
    pub pcos: f64,
}

/// Relative importance of each dimension; sums to 1
pub type EquilibriumWeights = EquilibriumFactors;

impl EquilibriumFactors {
    /// Map the five 0-10 factors onto the seven 0-100 dimensions
    pub fn from_health_factors(factors: &HealthFactors) -> Self {
        let activity = factors.activity_score() * 10.0;
        let symptom = factors.symptom_score() * 10.0;

        Self {
            sleep: activity * 0.7 + 30.0,
            nutrition: factors.nutrition_score() * 10.0,
            stress: (100.0 - symptom).max(0.0),
            exercise: activity,
            vitals: factors.vital_score() * 10.0,
            symptoms: 100.0 - symptom,
            pcos: factors.pcos_score() * 10.0,
        }
    }

    /// Starting weights of the refinement
    pub fn initial_weights() -> EquilibriumWeights {
        Self {
            sleep: 0.20,
            nutrition: 0.18,
            stress: 0.15,
            exercise: 0.17,
            vitals: 0.15,
            symptoms: 0.10,
            pcos: 0.05,
        }
    }

    pub fn get(&self, dimension: EquilibriumDimension) -> f64 {
        match dimension {
            EquilibriumDimension::Sleep => self.sleep,
            EquilibriumDimension::Nutrition => self.nutrition,
            EquilibriumDimension::Stress => self.stress,
            EquilibriumDimension::Exercise => self.exercise,
            EquilibriumDimension::Vitals => self.vitals,
            EquilibriumDimension::Symptoms => self.symptoms,
            EquilibriumDimension::Pcos => self.pcos,
        }
    }

    pub fn set(&mut self, dimension: EquilibriumDimension, value: f64) {
        match dimension {
            EquilibriumDimension::Sleep => self.sleep = value,
            EquilibriumDimension::Nutrition => self.nutrition = value,
            EquilibriumDimension::Stress => self.stress = value,
            EquilibriumDimension::Exercise => self.exercise = value,
            EquilibriumDimension::Vitals => self.vitals = value,
            EquilibriumDimension::Symptoms => self.symptoms = value,
            EquilibriumDimension::Pcos => self.pcos = value,
        }
    }

    pub fn sum(&self) -> f64 {
        EquilibriumDimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Value on the health-oriented scale (higher is healthier)
    pub fn health_oriented(&self, dimension: EquilibriumDimension) -> f64 {
        let value = self.get(dimension);
        if dimension.lower_is_better() {
            100.0 - value
        } else {
            value
        }
    }
}

/// Iteration parameters of the refinement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumConfig {
    pub max_iterations: u32,
    pub convergence_threshold: f64,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl EquilibriumConfig {
    /// Build a checked configuration
    pub fn new(max_iterations: u32, convergence_threshold: f64) -> Result<Self, ScoringError> {
        let config = Self { max_iterations, convergence_threshold };
        config.validate()?;
        Ok(config)
    }

    /// Read `SCORING_MAX_ITERATIONS` and `SCORING_CONVERGENCE_THRESHOLD`,
    /// keeping defaults for unset variables
    pub fn from_env() -> Result<Self, ScoringError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("SCORING_MAX_ITERATIONS") {
            config.max_iterations = value.parse().map_err(|_| {
                ScoringError::InvalidConfiguration(format!(
                    "SCORING_MAX_ITERATIONS must be a positive integer, got {}",
                    value
                ))
            })?;
        }

        if let Ok(value) = env::var("SCORING_CONVERGENCE_THRESHOLD") {
            config.convergence_threshold = value.parse().map_err(|_| {
                ScoringError::InvalidConfiguration(format!(
                    "SCORING_CONVERGENCE_THRESHOLD must be a number, got {}",
                    value
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Like `from_env`, but logs and falls back to defaults on bad values
    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            warn!("Ignoring scoring configuration from environment: {}", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.max_iterations < 1 {
            return Err(ScoringError::InvalidConfiguration(
                "maxIterations must be at least 1".to_string(),
            ));
        }
        if !self.convergence_threshold.is_finite() || self.convergence_threshold <= 0.0 {
            return Err(ScoringError::InvalidConfiguration(format!(
                "convergenceThreshold must be a positive finite number, got {}",
                self.convergence_threshold
            )));
        }
        Ok(())
    }
}

/// Why the refinement stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum ConvergenceOutcome {
    /// Successive scores differed by less than the threshold
    Converged,
    /// The score came back to its value from two iterations earlier while still moving
    Oscillating,
    /// The iteration cap was hit first
    IterationCapReached,
}

/// Diagnostics of one refinement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumReport {
    pub iterations: u32,
    pub equilibrium_reached: bool,
    pub convergence: ConvergenceOutcome,
    /// Weights that produced the reported score
    pub factor_weights: EquilibriumWeights,
    /// Unrounded 0-100 score of the last iteration
    pub equilibrium_score: f64,
}

/// Result of the iterative variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct IterativeHealthResult {
    pub result: HealthResult,
    pub report: EquilibriumReport,
}

impl IterativeHealthResult {
    /// Treat a non-converged run as an error
    pub fn require_equilibrium(self) -> Result<Self, ScoringError> {
        if self.report.equilibrium_reached {
            Ok(self)
        } else {
            Err(ScoringError::ConvergenceNotReached {
                iterations: self.report.iterations,
            })
        }
    }
}
