use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::errors::ScoringError;

/// Self-reported meal quality on a 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MealQuality(u8);

impl MealQuality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for MealQuality {
    type Error = ScoringError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoringError::InvalidObservation(format!(
                "meal quality must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }
}

impl From<MealQuality> for u8 {
    fn from(quality: MealQuality) -> Self {
        quality.0
    }
}

/// Blood pressure and fasting blood sugar readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    /// Systolic blood pressure in mmHg
    #[validate(range(min = 50, max = 260, message = "Systolic pressure must be between 50 and 260 mmHg"))]
    pub systolic: u16,

    /// Diastolic blood pressure in mmHg
    #[validate(range(min = 30, max = 160, message = "Diastolic pressure must be between 30 and 160 mmHg"))]
    pub diastolic: u16,

    /// Fasting blood sugar in mg/dL
    #[validate(range(min = 20.0, max = 600.0, message = "Blood sugar must be between 20 and 600 mg/dL"))]
    pub blood_sugar: f64,
}

/// Daily movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[validate(range(max = 200000, message = "Step count must not exceed 200000"))]
    pub steps: u32,

    #[validate(range(max = 1440, message = "Exercise minutes must not exceed a day"))]
    pub exercise_minutes: u32,
}

/// Daily hydration and diet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NutritionLog {
    /// Glasses of water
    #[validate(range(max = 100, message = "Water intake must not exceed 100 glasses"))]
    pub water_glasses: u32,

    /// Self-reported meal quality, 1 (poor) to 5 (excellent)
    #[validate(range(min = 1, max = 5, message = "Meal quality must be between 1 and 5"))]
    pub meal_quality: u8,
}

/// PCOS condition and adherence behaviours
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PcosManagement {
    pub has_pcos: bool,

    /// Count of adherence behaviours (medication, diet, exercise plans)
    #[validate(range(max = 50, message = "Management actions must not exceed 50"))]
    #[serde(default)]
    pub management_actions: u32,
}

/// Everything external collaborators report before factor derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RawObservations {
    /// Reported symptom names, matched case-insensitively
    #[validate(length(max = 50, message = "At most 50 symptoms can be reported at once"))]
    #[serde(default)]
    pub symptoms: Vec<String>,

    #[validate]
    pub vitals: VitalSigns,

    #[validate]
    pub activity: ActivityLog,

    #[validate]
    pub nutrition: NutritionLog,

    #[validate]
    #[serde(default)]
    pub pcos: PcosManagement,
}

impl RawObservations {
    /// Run the plausibility checks, reporting every failure in one message
    pub fn check(&self) -> Result<(), ScoringError> {
        self.validate()
            .map_err(|errors| ScoringError::InvalidObservation(describe_validation_errors(&errors)))
    }
}

/// Flatten nested validator errors into "path: message" pairs
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join("; ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let msgs: Vec<String> = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", field),
                    })
                    .collect();
                out.push(format!("{}: {}", path, msgs.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> RawObservations {
        RawObservations {
            symptoms: vec!["fatigue".to_string()],
            vitals: VitalSigns { systolic: 120, diastolic: 80, blood_sugar: 90.0 },
            activity: ActivityLog { steps: 6000, exercise_minutes: 20 },
            nutrition: NutritionLog { water_glasses: 6, meal_quality: 4 },
            pcos: PcosManagement { has_pcos: true, management_actions: 2 },
        }
    }

    #[test]
    fn test_meal_quality_range() {
        assert!(MealQuality::try_from(0).is_err());
        assert_eq!(MealQuality::try_from(1).unwrap().value(), 1);
        assert_eq!(MealQuality::try_from(5).unwrap().value(), 5);
        assert!(MealQuality::try_from(6).is_err());
    }

    #[test]
    fn test_meal_quality_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<MealQuality>("3").is_ok());
        assert!(serde_json::from_str::<MealQuality>("9").is_err());
    }

    #[test]
    fn test_valid_observations_pass() {
        assert!(canonical().check().is_ok());
    }

    #[test]
    fn test_implausible_vitals_are_rejected() {
        let mut observations = canonical();
        observations.vitals.systolic = 400;
        let err = observations.check().unwrap_err();
        match err {
            ScoringError::InvalidObservation(msg) => {
                assert!(msg.contains("vitals.systolic"), "unexpected message: {}", msg);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_every_failure_is_reported() {
        let mut observations = canonical();
        observations.vitals.blood_sugar = 5.0;
        observations.nutrition.meal_quality = 0;
        let msg = observations.check().unwrap_err().to_string();
        assert!(msg.contains("vitals.blood_sugar"));
        assert!(msg.contains("nutrition.meal_quality"));
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let json = r#"{
            "vitals": {"systolic": 118, "diastolic": 76, "bloodSugar": 88},
            "activity": {"steps": 4000, "exerciseMinutes": 15},
            "nutrition": {"waterGlasses": 8, "mealQuality": 3}
        }"#;
        let observations: RawObservations = serde_json::from_str(json).unwrap();
        assert!(observations.symptoms.is_empty());
        assert!(!observations.pcos.has_pcos);
        assert_eq!(observations.vitals.blood_sugar, 88.0);
    }
}
