//! Factor derivation: raw observations to the five 0-10 factors.
//!
//! Every band function is public so each boundary can be checked on its own.

use std::convert::TryFrom;

use tracing::debug;

use crate::entities::health_factors::{HealthFactors, MAX_FACTOR_SCORE, MIN_FACTOR_SCORE};
use crate::entities::observations::{MealQuality, RawObservations};
use crate::errors::ScoringError;

/// Severity weight of one reported symptom, matched case-insensitively
pub fn symptom_severity(symptom: &str) -> u32 {
    match symptom.trim().to_lowercase().as_str() {
        "fatigue" => 2,
        "nausea" => 1,
        "headache" => 3,
        "pain" => 4,
        "bleeding" => 5,
        "fever" => 4,
        _ => 1,
    }
}

/// Symptom factor from the summed severity of the reported symptoms
pub fn symptom_score<S: AsRef<str>>(symptoms: &[S]) -> f64 {
    let total: u32 = symptoms.iter().map(|s| symptom_severity(s.as_ref())).sum();

    match total {
        0 => 10.0,
        1..=3 => 8.0,
        4..=6 => 6.0,
        7..=10 => 4.0,
        _ => 2.0,
    }
}

/// Vital factor from blood pressure and fasting blood sugar
pub fn vital_score(systolic: u16, diastolic: u16, blood_sugar: f64) -> f64 {
    let mut score = 10.0;

    if systolic > 140 || diastolic > 90 {
        score -= 4.0;
    } else if systolic > 130 || diastolic > 85 {
        score -= 2.0;
    } else if systolic < 90 || diastolic < 60 {
        score -= 3.0;
    }

    if blood_sugar > 125.0 {
        score -= 4.0;
    } else if blood_sugar > 100.0 {
        score -= 2.0;
    } else if blood_sugar < 70.0 {
        score -= 3.0;
    }

    f64::clamp(score, MIN_FACTOR_SCORE, MAX_FACTOR_SCORE)
}

/// Activity factor from daily steps and exercise minutes
pub fn activity_score(steps: u32, exercise_minutes: u32) -> f64 {
    let steps_points = match steps {
        s if s >= 8000 => 5.0,
        s if s >= 5000 => 4.0,
        s if s >= 3000 => 3.0,
        s if s >= 1000 => 2.0,
        _ => 1.0,
    };

    let exercise_points = match exercise_minutes {
        m if m >= 30 => 5.0,
        m if m >= 20 => 4.0,
        m if m >= 10 => 3.0,
        m if m >= 5 => 2.0,
        _ => 1.0,
    };

    f64::min(steps_points + exercise_points, MAX_FACTOR_SCORE)
}

/// Nutrition factor from water intake (glasses) and meal quality
pub fn nutrition_score(water_glasses: u32, meal_quality: MealQuality) -> f64 {
    let water_points = match water_glasses {
        w if w >= 8 => 5.0,
        w if w >= 6 => 4.0,
        w if w >= 4 => 3.0,
        _ => 2.0,
    };

    f64::min(water_points + f64::from(meal_quality.value()), MAX_FACTOR_SCORE)
}

/// PCOS factor; 10 when the condition is absent
pub fn pcos_score(has_pcos: bool, management_actions: u32) -> f64 {
    if !has_pcos {
        return MAX_FACTOR_SCORE;
    }
    f64::min(3.0 + f64::from(management_actions) * 1.5, MAX_FACTOR_SCORE)
}

/// Validate the observations and derive all five factors
pub fn derive_factors(observations: &RawObservations) -> Result<HealthFactors, ScoringError> {
    observations.check()?;

    let vitals = &observations.vitals;
    let activity = &observations.activity;
    let nutrition = &observations.nutrition;
    let pcos = &observations.pcos;

    let factors = HealthFactors::new(
        symptom_score(&observations.symptoms),
        vital_score(vitals.systolic, vitals.diastolic, vitals.blood_sugar),
        activity_score(activity.steps, activity.exercise_minutes),
        nutrition_score(nutrition.water_glasses, MealQuality::try_from(nutrition.meal_quality)?),
        pcos_score(pcos.has_pcos, pcos.management_actions),
    )?;

    debug!("Derived health factors: {:?}", factors.values());

    Ok(factors)
}
