use serde::{Deserialize, Serialize};

/// Storage model for one calculated health score.
///
/// Records are immutable history: a new calculation always produces a new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreRecord {
    /// Unique identifier for the record
    pub id: String,

    /// Opaque identifier of the user the score belongs to
    pub user_id: String,

    /// Final score on the 0-10 scale
    pub total_score: f64,

    /// Weighted sum before the balance penalty
    pub raw_score: f64,

    /// Population standard deviation across the five factors
    pub standard_deviation: f64,

    /// Factor scores the calculation was based on
    pub symptom_score: f64,
    pub vital_score: f64,
    pub activity_score: f64,
    pub nutrition_score: f64,
    pub pcos_score: f64,

    /// Status label (Stable, Caution, Critical)
    pub status: String,

    /// Balance label (Harmonious, Moderate, Imbalanced)
    pub balance_status: String,

    pub equilibrium_factor: f64,

    /// Flower tier label
    pub flower_level: String,

    /// Scoring mode used (weighted or iterative)
    pub scoring_mode: String,

    /// Whether the iterative refinement converged; None for weighted scores
    pub equilibrium_reached: Option<bool>,

    /// Number of refinement iterations; None for weighted scores
    pub iterations: Option<u32>,

    /// Recommendations in the order they were generated
    pub recommendations: Vec<String>,

    /// RFC 3339 timestamp of the calculation
    pub calculated_at: String,
}

/// Input data for inserting a new health score record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHealthScoreRecord {
    pub user_id: String,
    pub total_score: f64,
    pub raw_score: f64,
    pub standard_deviation: f64,
    pub symptom_score: f64,
    pub vital_score: f64,
    pub activity_score: f64,
    pub nutrition_score: f64,
    pub pcos_score: f64,
    pub status: String,
    pub balance_status: String,
    pub equilibrium_factor: f64,
    pub flower_level: String,
    pub scoring_mode: String,
    pub equilibrium_reached: Option<bool>,
    pub iterations: Option<u32>,
    pub recommendations: Vec<String>,
    pub calculated_at: String,
}

impl CreateHealthScoreRecord {
    /// Attach an identifier, producing the stored record
    pub fn into_record(self, id: String) -> HealthScoreRecord {
        HealthScoreRecord {
            id,
            user_id: self.user_id,
            total_score: self.total_score,
            raw_score: self.raw_score,
            standard_deviation: self.standard_deviation,
            symptom_score: self.symptom_score,
            vital_score: self.vital_score,
            activity_score: self.activity_score,
            nutrition_score: self.nutrition_score,
            pcos_score: self.pcos_score,
            status: self.status,
            balance_status: self.balance_status,
            equilibrium_factor: self.equilibrium_factor,
            flower_level: self.flower_level,
            scoring_mode: self.scoring_mode,
            equilibrium_reached: self.equilibrium_reached,
            iterations: self.iterations,
            recommendations: self.recommendations,
            calculated_at: self.calculated_at,
        }
    }
}
