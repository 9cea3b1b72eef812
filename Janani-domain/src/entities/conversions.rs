use chrono::{DateTime, Utc};

use janani_data::models::health_score as data;

use crate::entities::health_factors::HealthFactors;
use crate::entities::health_score::{
    FlowerLevel, HealthResult, HealthScoreRecord, HealthStatus, ScoreCalculation,
    ScoreCalculationResponse,
};

// Conversion functions between domain entities and data models.
// These follow the pattern convert_to_[target_layer]_[model_name].

/// Convert a calculation into the data model for a new history row
pub fn convert_to_data_create_record(
    user_id: &str,
    calculation: &ScoreCalculation,
) -> data::CreateHealthScoreRecord {
    let result = &calculation.result;
    let factors = &calculation.factors;

    data::CreateHealthScoreRecord {
        user_id: user_id.to_string(),
        total_score: result.final_score,
        raw_score: result.raw_score,
        standard_deviation: result.standard_deviation,
        symptom_score: factors.symptom_score(),
        vital_score: factors.vital_score(),
        activity_score: factors.activity_score(),
        nutrition_score: factors.nutrition_score(),
        pcos_score: factors.pcos_score(),
        status: result.status.to_string(),
        balance_status: result.balance_status.to_string(),
        equilibrium_factor: result.equilibrium_factor,
        flower_level: result.flower_level.to_string(),
        scoring_mode: calculation.mode.to_string(),
        equilibrium_reached: calculation.equilibrium_reached,
        iterations: calculation.iterations,
        recommendations: result.recommendations.clone(),
        calculated_at: calculation.calculated_at.to_rfc3339(),
    }
}

/// Convert a stored row back into a domain record.
///
/// Fails when the row holds a label or timestamp the domain does not know.
pub fn convert_to_domain_record(record: data::HealthScoreRecord) -> Result<HealthScoreRecord, String> {
    let factors = HealthFactors::new(
        record.symptom_score,
        record.vital_score,
        record.activity_score,
        record.nutrition_score,
        record.pcos_score,
    )
    .map_err(|e| format!("Stored record {} has invalid factors: {}", record.id, e))?;

    let calculated_at = DateTime::parse_from_rfc3339(&record.calculated_at)
        .map_err(|e| format!("Stored record {} has an invalid timestamp: {}", record.id, e))?
        .with_timezone(&Utc);

    Ok(HealthScoreRecord {
        id: record.id,
        user_id: record.user_id,
        factors,
        result: HealthResult {
            final_score: record.total_score,
            raw_score: record.raw_score,
            standard_deviation: record.standard_deviation,
            status: record.status.parse()?,
            balance_status: record.balance_status.parse()?,
            equilibrium_factor: record.equilibrium_factor,
            recommendations: record.recommendations,
            flower_level: record.flower_level.parse()?,
        },
        mode: record.scoring_mode.parse()?,
        equilibrium_reached: record.equilibrium_reached,
        iterations: record.iterations,
        calculated_at,
    })
}

/// Rebuild a result from a scoring service response.
///
/// Fails when the body reports failure, a score outside 0-10, or a status
/// or flower level that does not follow from the score.
pub fn convert_response_to_domain_result(response: &ScoreCalculationResponse) -> Result<HealthResult, String> {
    if !response.success {
        return Err("scoring service reported failure".to_string());
    }
    if !response.score.is_finite() || !(0.0..=10.0).contains(&response.score) {
        return Err(format!("score {} is outside the range 0-10", response.score));
    }

    let expected_status = HealthStatus::from_score(response.score);
    if response.status != expected_status {
        return Err(format!(
            "status {} does not match score {} (expected {})",
            response.status, response.score, expected_status
        ));
    }

    let expected_flower = FlowerLevel::from_score(response.score, response.balance_status);
    if response.flower_level != expected_flower {
        return Err(format!(
            "flower level {} does not match score {} with {} balance (expected {})",
            response.flower_level, response.score, response.balance_status, expected_flower
        ));
    }

    Ok(HealthResult {
        final_score: response.score,
        raw_score: response.raw_score,
        standard_deviation: response.standard_deviation,
        status: response.status,
        balance_status: response.balance_status,
        equilibrium_factor: response.equilibrium_factor,
        recommendations: response.recommendations.clone(),
        flower_level: response.flower_level,
    })
}
