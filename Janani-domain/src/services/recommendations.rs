//! Deterministic recommendation rules.

use crate::entities::equilibrium::{EquilibriumDimension, EquilibriumFactors};
use crate::entities::health_factors::{FactorKind, HealthFactors};
use crate::entities::health_score::BalanceStatus;

pub const VITALS_ATTENTION: &str =
    "Your vitals need attention despite feeling okay - consult your doctor";
pub const SYMPTOM_COMFORT: &str =
    "Your vitals are great! Let's work on symptom management for comfort";
pub const PERFECT_BALANCE: &str = "Amazing balance! You're in perfect health equilibrium";
pub const MOVEMENT_AND_NUTRITION: &str =
    "Gentle movement and good nutrition work together - start with one to boost both";

/// Health-oriented score below which a dimension gets targeted guidance
pub const GUIDANCE_THRESHOLD: f64 = 60.0;

/// Most targeted suggestions added by the iterative variant
pub const MAX_GUIDANCE: usize = 2;

/// Lowest factor; the earliest in index order wins ties
pub fn weakest_factor(factors: &HealthFactors) -> FactorKind {
    let mut weakest = FactorKind::Symptom;
    for kind in FactorKind::ALL {
        if factors.get(kind) < factors.get(weakest) {
            weakest = kind;
        }
    }
    weakest
}

/// Apply the five rules in order. Each rule adds at most one message.
pub fn generate_recommendations(
    factors: &HealthFactors,
    standard_deviation: f64,
    balance_status: BalanceStatus,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if balance_status == BalanceStatus::Imbalanced {
        recommendations.push(format!(
            "Focus on improving {} to restore balance",
            weakest_factor(factors).area()
        ));
    }

    if factors.vital_score() < factors.symptom_score() - 2.0 {
        recommendations.push(VITALS_ATTENTION.to_string());
    }

    if factors.symptom_score() < factors.vital_score() - 2.0 {
        recommendations.push(SYMPTOM_COMFORT.to_string());
    }

    if standard_deviation < 1.0 {
        recommendations.push(PERFECT_BALANCE.to_string());
    }

    if factors.activity_score() < 5.0 && factors.nutrition_score() < 5.0 {
        recommendations.push(MOVEMENT_AND_NUTRITION.to_string());
    }

    recommendations
}

/// Guidance for the weakest equilibrium dimensions.
///
/// Dimensions are ranked on the health-oriented scale so that high stress or
/// heavy symptoms count as weak. Only the two weakest are considered and only
/// those below the threshold produce a message.
pub fn dimension_guidance(dimensions: &EquilibriumFactors) -> Vec<String> {
    let mut ranked: Vec<(EquilibriumDimension, f64)> = EquilibriumDimension::ALL
        .iter()
        .map(|d| (*d, dimensions.health_oriented(*d)))
        .collect();

    // Stable sort keeps declaration order on ties
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    ranked
        .into_iter()
        .take(MAX_GUIDANCE)
        .filter(|(_, score)| *score < GUIDANCE_THRESHOLD)
        .map(|(dimension, _)| dimension.guidance().to_string())
        .collect()
}
