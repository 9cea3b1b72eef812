use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use janani_domain::entities::{
    BalanceStatus, FlowerLevel, HealthFactors, HealthScoreRecord, HealthStatus,
    PartialHealthFactors, ScoringMode,
};

/// Request payload for calculating a health score
///
/// Factors arrive unchecked so that a missing or out-of-range factor is
/// reported with its name instead of a generic body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateHealthScoreRequest {
    /// The five 0-10 factor scores
    #[serde(default)]
    pub factors: PartialHealthFactors,

    /// User the score is recorded for
    #[validate(length(min = 1, max = 128, message = "userId must be between 1 and 128 characters"))]
    pub user_id: String,

    /// Scoring algorithm (default: iterative)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ScoringMode>,
}

/// Public representation of a stored health score
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreEntry {
    /// Unique identifier of the stored calculation
    pub id: String,

    pub user_id: String,

    /// Final score, 0-10 with one decimal
    pub score: f64,

    pub status: HealthStatus,

    pub balance_status: BalanceStatus,

    pub equilibrium_factor: f64,

    pub flower_level: FlowerLevel,

    pub flower_emoji: String,

    pub raw_score: f64,

    pub standard_deviation: f64,

    /// Factors the score was calculated from
    pub factors: HealthFactors,

    pub mode: ScoringMode,

    /// Null for weighted calculations
    pub equilibrium_reached: Option<bool>,

    /// Null for weighted calculations
    pub iterations: Option<u32>,

    pub recommendations: Vec<String>,

    /// When the score was calculated
    pub calculated_at: DateTime<Utc>,
}

impl From<HealthScoreRecord> for HealthScoreEntry {
    fn from(record: HealthScoreRecord) -> Self {
        let result = record.result;
        Self {
            id: record.id,
            user_id: record.user_id,
            score: result.final_score,
            status: result.status,
            balance_status: result.balance_status,
            equilibrium_factor: result.equilibrium_factor,
            flower_level: result.flower_level,
            flower_emoji: result.flower_level.emoji().to_string(),
            raw_score: result.raw_score,
            standard_deviation: result.standard_deviation,
            factors: record.factors,
            mode: record.mode,
            equilibrium_reached: record.equilibrium_reached,
            iterations: record.iterations,
            recommendations: result.recommendations,
            calculated_at: record.calculated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janani_domain::services::compute_score;

    #[test]
    fn test_request_accepts_missing_mode() {
        let request: CalculateHealthScoreRequest = serde_json::from_value(serde_json::json!({
            "factors": {
                "symptomScore": 8, "vitalScore": 10, "activityScore": 8,
                "nutritionScore": 8, "pcosScore": 6
            },
            "userId": "alice"
        }))
        .unwrap();

        assert!(request.mode.is_none());
        assert!(request.validate().is_ok());
        assert!(HealthFactors::try_from(request.factors).is_ok());
    }

    #[test]
    fn test_empty_user_id_fails_validation() {
        let request = CalculateHealthScoreRequest {
            factors: PartialHealthFactors::default(),
            user_id: String::new(),
            mode: Some(ScoringMode::Weighted),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_entry_from_record() {
        let factors = HealthFactors::new(8.0, 10.0, 8.0, 8.0, 6.0).unwrap();
        let record = HealthScoreRecord {
            id: "rec-1".to_string(),
            user_id: "alice".to_string(),
            factors,
            result: compute_score(&factors),
            mode: ScoringMode::Weighted,
            equilibrium_reached: None,
            iterations: None,
            calculated_at: Utc::now(),
        };

        let entry = HealthScoreEntry::from(record);
        assert_eq!(entry.score, 8.0);
        assert_eq!(entry.flower_level, FlowerLevel::Tulip);
        assert_eq!(entry.flower_emoji, FlowerLevel::Tulip.emoji());
        assert_eq!(entry.mode, ScoringMode::Weighted);
    }
}
