use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::errors::ScoringError;

/// Upper bound of every factor score
pub const MAX_FACTOR_SCORE: f64 = 10.0;

/// Lower bound of every factor score
pub const MIN_FACTOR_SCORE: f64 = 0.0;

/// One independently scored dimension of wellness.
///
/// Declaration order is the stable index order used for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum FactorKind {
    Symptom,
    Vital,
    Activity,
    Nutrition,
    Pcos,
}

impl FactorKind {
    /// All factors in stable index order
    pub const ALL: [FactorKind; 5] = [
        FactorKind::Symptom,
        FactorKind::Vital,
        FactorKind::Activity,
        FactorKind::Nutrition,
        FactorKind::Pcos,
    ];

    /// Wire name of the factor field
    pub fn field_name(self) -> &'static str {
        match self {
            FactorKind::Symptom => "symptomScore",
            FactorKind::Vital => "vitalScore",
            FactorKind::Activity => "activityScore",
            FactorKind::Nutrition => "nutritionScore",
            FactorKind::Pcos => "pcosScore",
        }
    }

    /// Human-readable area name used in recommendations
    pub fn area(self) -> &'static str {
        match self {
            FactorKind::Symptom => "symptoms",
            FactorKind::Vital => "vitals",
            FactorKind::Activity => "activity",
            FactorKind::Nutrition => "nutrition",
            FactorKind::Pcos => "PCOS management",
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// The five normalized factors every scoring call consumes.
///
/// Fields are private so a value can only exist with every factor finite and
/// inside `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthFactors {
    /// Inverse severity of self-reported symptoms
    symptom_score: f64,
    /// Blood pressure and blood sugar within clinical targets
    vital_score: f64,
    /// Movement and exercise adequacy
    activity_score: f64,
    /// Hydration and diet quality
    nutrition_score: f64,
    /// PCOS management adequacy (10 when the condition is absent)
    pcos_score: f64,
}

impl HealthFactors {
    /// Build a factor set, failing on the first out-of-range or non-finite factor
    pub fn new(
        symptom_score: f64,
        vital_score: f64,
        activity_score: f64,
        nutrition_score: f64,
        pcos_score: f64,
    ) -> Result<Self, ScoringError> {
        Ok(Self {
            symptom_score: check_factor(FactorKind::Symptom, symptom_score)?,
            vital_score: check_factor(FactorKind::Vital, vital_score)?,
            activity_score: check_factor(FactorKind::Activity, activity_score)?,
            nutrition_score: check_factor(FactorKind::Nutrition, nutrition_score)?,
            pcos_score: check_factor(FactorKind::Pcos, pcos_score)?,
        })
    }

    /// Every factor at the given value
    pub fn uniform(value: f64) -> Result<Self, ScoringError> {
        Self::new(value, value, value, value, value)
    }

    pub fn symptom_score(&self) -> f64 {
        self.symptom_score
    }

    pub fn vital_score(&self) -> f64 {
        self.vital_score
    }

    pub fn activity_score(&self) -> f64 {
        self.activity_score
    }

    pub fn nutrition_score(&self) -> f64 {
        self.nutrition_score
    }

    pub fn pcos_score(&self) -> f64 {
        self.pcos_score
    }

    /// Look up a factor by kind
    pub fn get(&self, kind: FactorKind) -> f64 {
        match kind {
            FactorKind::Symptom => self.symptom_score,
            FactorKind::Vital => self.vital_score,
            FactorKind::Activity => self.activity_score,
            FactorKind::Nutrition => self.nutrition_score,
            FactorKind::Pcos => self.pcos_score,
        }
    }

    /// Copy with one factor replaced, re-validated
    pub fn with(&self, kind: FactorKind, value: f64) -> Result<Self, ScoringError> {
        let mut updated = *self;
        let value = check_factor(kind, value)?;
        match kind {
            FactorKind::Symptom => updated.symptom_score = value,
            FactorKind::Vital => updated.vital_score = value,
            FactorKind::Activity => updated.activity_score = value,
            FactorKind::Nutrition => updated.nutrition_score = value,
            FactorKind::Pcos => updated.pcos_score = value,
        }
        Ok(updated)
    }

    /// Factor values in stable index order
    pub fn values(&self) -> [f64; 5] {
        [
            self.symptom_score,
            self.vital_score,
            self.activity_score,
            self.nutrition_score,
            self.pcos_score,
        ]
    }
}

impl<'de> Deserialize<'de> for HealthFactors {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let partial = PartialHealthFactors::deserialize(deserializer)?;
        HealthFactors::try_from(partial).map_err(serde::de::Error::custom)
    }
}

fn check_factor(factor: FactorKind, value: f64) -> Result<f64, ScoringError> {
    if !value.is_finite() {
        return Err(ScoringError::InvalidFactor {
            factor,
            reason: format!("{} is not a finite number", value),
        });
    }
    if !(MIN_FACTOR_SCORE..=MAX_FACTOR_SCORE).contains(&value) {
        return Err(ScoringError::InvalidFactor {
            factor,
            reason: format!(
                "{} is outside the range {}-{}",
                value, MIN_FACTOR_SCORE, MAX_FACTOR_SCORE
            ),
        });
    }
    Ok(value)
}

/// Factors as they arrive from callers, before the presence and range checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PartialHealthFactors {
    pub symptom_score: Option<f64>,
    pub vital_score: Option<f64>,
    pub activity_score: Option<f64>,
    pub nutrition_score: Option<f64>,
    pub pcos_score: Option<f64>,
}

impl From<HealthFactors> for PartialHealthFactors {
    fn from(factors: HealthFactors) -> Self {
        Self {
            symptom_score: Some(factors.symptom_score),
            vital_score: Some(factors.vital_score),
            activity_score: Some(factors.activity_score),
            nutrition_score: Some(factors.nutrition_score),
            pcos_score: Some(factors.pcos_score),
        }
    }
}

impl TryFrom<PartialHealthFactors> for HealthFactors {
    type Error = ScoringError;

    fn try_from(partial: PartialHealthFactors) -> Result<Self, Self::Error> {
        let require = |kind: FactorKind, value: Option<f64>| {
            value.ok_or(ScoringError::MissingFactor(kind))
        };

        HealthFactors::new(
            require(FactorKind::Symptom, partial.symptom_score)?,
            require(FactorKind::Vital, partial.vital_score)?,
            require(FactorKind::Activity, partial.activity_score)?,
            require(FactorKind::Nutrition, partial.nutrition_score)?,
            require(FactorKind::Pcos, partial.pcos_score)?,
        )
    }
}
