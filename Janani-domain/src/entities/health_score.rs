use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::equilibrium::EquilibriumReport;
use crate::entities::health_factors::HealthFactors;

/// Threshold at and above which a score is Stable
pub const STABLE_THRESHOLD: f64 = 7.5;
/// Threshold at and above which a score is at least Caution
pub const CAUTION_THRESHOLD: f64 = 5.0;

/// Coarse three-level classification of the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum HealthStatus {
    Stable,
    Caution,
    Critical,
}

impl HealthStatus {
    /// Classify a final score; both lower bounds are inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= STABLE_THRESHOLD {
            HealthStatus::Stable
        } else if score >= CAUTION_THRESHOLD {
            HealthStatus::Caution
        } else {
            HealthStatus::Critical
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Stable => write!(f, "Stable"),
            HealthStatus::Caution => write!(f, "Caution"),
            HealthStatus::Critical => write!(f, "Critical"),
        }
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Stable" => Ok(HealthStatus::Stable),
            "Caution" => Ok(HealthStatus::Caution),
            "Critical" => Ok(HealthStatus::Critical),
            _ => Err(format!("Invalid health status: {}", s)),
        }
    }
}

/// Classification of how evenly the five factors are spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum BalanceStatus {
    Harmonious,
    Moderate,
    Imbalanced,
}

impl BalanceStatus {
    /// Classify a population standard deviation
    pub fn from_standard_deviation(sd: f64) -> Self {
        if sd > 2.5 {
            BalanceStatus::Imbalanced
        } else if sd > 1.5 {
            BalanceStatus::Moderate
        } else {
            BalanceStatus::Harmonious
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStatus::Harmonious => write!(f, "Harmonious"),
            BalanceStatus::Moderate => write!(f, "Moderate"),
            BalanceStatus::Imbalanced => write!(f, "Imbalanced"),
        }
    }
}

impl FromStr for BalanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Harmonious" => Ok(BalanceStatus::Harmonious),
            "Moderate" => Ok(BalanceStatus::Moderate),
            "Imbalanced" => Ok(BalanceStatus::Imbalanced),
            _ => Err(format!("Invalid balance status: {}", s)),
        }
    }
}

/// Decorative tier shown next to the score. Ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum FlowerLevel {
    Seedling,
    Sprout,
    Blossom,
    Tulip,
    Hibiscus,
}

impl FlowerLevel {
    /// Pick the tier for a final score and balance
    pub fn from_score(score: f64, balance: BalanceStatus) -> Self {
        if score >= 9.0 && balance == BalanceStatus::Harmonious {
            FlowerLevel::Hibiscus
        } else if score >= 8.0 {
            FlowerLevel::Tulip
        } else if score >= 7.0 {
            FlowerLevel::Blossom
        } else if score >= 5.0 {
            FlowerLevel::Sprout
        } else {
            FlowerLevel::Seedling
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            FlowerLevel::Seedling => "🌱",
            FlowerLevel::Sprout => "🌿",
            FlowerLevel::Blossom => "🌸",
            FlowerLevel::Tulip => "🌷",
            FlowerLevel::Hibiscus => "🌺",
        }
    }

    /// 1-based rank of the tier
    pub fn tier(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for FlowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowerLevel::Seedling => "Seedling",
            FlowerLevel::Sprout => "Sprout",
            FlowerLevel::Blossom => "Blossom",
            FlowerLevel::Tulip => "Tulip",
            FlowerLevel::Hibiscus => "Hibiscus",
        };
        f.write_str(label)
    }
}

impl FromStr for FlowerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Seedling" => Ok(FlowerLevel::Seedling),
            "Sprout" => Ok(FlowerLevel::Sprout),
            "Blossom" => Ok(FlowerLevel::Blossom),
            "Tulip" => Ok(FlowerLevel::Tulip),
            "Hibiscus" => Ok(FlowerLevel::Hibiscus),
            _ => Err(format!("Invalid flower level: {}", s)),
        }
    }
}

/// Outcome of one score calculation.
///
/// A pure function of the input factors; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthResult {
    /// 0-10, one decimal
    pub final_score: f64,
    pub raw_score: f64,
    pub standard_deviation: f64,
    pub status: HealthStatus,
    pub balance_status: BalanceStatus,
    pub equilibrium_factor: f64,
    pub recommendations: Vec<String>,
    pub flower_level: FlowerLevel,
}

/// Which scoring algorithm to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Weighted sum with balance penalty
    Weighted,
    /// Equilibrium refinement over seven cross-influencing dimensions
    #[default]
    Iterative,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Weighted => write!(f, "weighted"),
            ScoringMode::Iterative => write!(f, "iterative"),
        }
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted" => Ok(ScoringMode::Weighted),
            "iterative" => Ok(ScoringMode::Iterative),
            _ => Err(format!("Invalid scoring mode: {}", s)),
        }
    }
}

/// Where a calculation was actually performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Local,
    Remote,
    /// Remote scorer failed and the local weighted score was used instead
    Fallback,
}

/// A calculation together with how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCalculation {
    pub factors: HealthFactors,
    pub result: HealthResult,
    pub mode: ScoringMode,
    /// None for weighted calculations
    pub equilibrium_reached: Option<bool>,
    /// None for weighted calculations
    pub iterations: Option<u32>,
    /// Full refinement diagnostics, only for local iterative calculations
    pub equilibrium: Option<EquilibriumReport>,
    pub source: ScoreSource,
    pub calculated_at: DateTime<Utc>,
}

/// A persisted calculation from a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreRecord {
    pub id: String,
    pub user_id: String,
    pub factors: HealthFactors,
    pub result: HealthResult,
    pub mode: ScoringMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equilibrium_reached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    pub calculated_at: DateTime<Utc>,
}

/// Request body understood by scoring services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ScoreCalculationRequest {
    pub factors: HealthFactors,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ScoringMode>,
}

/// Response body returned by scoring services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ScoreCalculationResponse {
    pub success: bool,
    /// Final score, 0-10
    pub score: f64,
    pub status: HealthStatus,
    pub balance_status: BalanceStatus,
    pub equilibrium_factor: f64,
    pub flower_level: FlowerLevel,
    #[serde(default)]
    pub flower_emoji: String,
    pub raw_score: f64,
    pub standard_deviation: f64,
    /// Null for weighted calculations
    pub equilibrium_reached: Option<bool>,
    pub recommendations: Vec<String>,
    /// Null for weighted calculations
    pub iterations: Option<u32>,
    pub calculated_at: DateTime<Utc>,
}

impl From<&ScoreCalculation> for ScoreCalculationResponse {
    fn from(calculation: &ScoreCalculation) -> Self {
        let result = &calculation.result;
        Self {
            success: true,
            score: result.final_score,
            status: result.status,
            balance_status: result.balance_status,
            equilibrium_factor: result.equilibrium_factor,
            flower_level: result.flower_level,
            flower_emoji: result.flower_level.emoji().to_string(),
            raw_score: result.raw_score,
            standard_deviation: result.standard_deviation,
            equilibrium_reached: calculation.equilibrium_reached,
            recommendations: result.recommendations.clone(),
            iterations: calculation.iterations,
            calculated_at: calculation.calculated_at,
        }
    }
}
