//! Weighted aggregation with the balance penalty.

use crate::entities::health_factors::{FactorKind, HealthFactors, MAX_FACTOR_SCORE, MIN_FACTOR_SCORE};
use crate::entities::health_score::{BalanceStatus, FlowerLevel, HealthResult, HealthStatus};
use crate::services::recommendations::generate_recommendations;

/// Penalty applied per unit of standard deviation
pub const BALANCE_PENALTY_RATE: f64 = 0.3;

/// Standard deviation at which the equilibrium factor reaches zero
pub const EQUILIBRIUM_CEILING: f64 = 3.0;

/// Fixed importance of each factor; sums to 1
pub fn factor_weight(kind: FactorKind) -> f64 {
    match kind {
        FactorKind::Symptom => 0.30,
        FactorKind::Vital => 0.30,
        FactorKind::Activity => 0.15,
        FactorKind::Nutrition => 0.15,
        FactorKind::Pcos => 0.10,
    }
}

/// Round half away from zero to one decimal
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Weighted sum of the factors before any penalty
pub fn raw_score(factors: &HealthFactors) -> f64 {
    FactorKind::ALL
        .iter()
        .map(|kind| factors.get(*kind) * factor_weight(*kind))
        .sum()
}

/// Population standard deviation of the five factors
pub fn standard_deviation(factors: &HealthFactors) -> f64 {
    let values = factors.values();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// `max(0, 3 - sd)` rounded to one decimal
pub fn equilibrium_factor(sd: f64) -> f64 {
    round1(f64::max(0.0, EQUILIBRIUM_CEILING - sd))
}

/// Build a result from an already-computed final score.
///
/// Shared by the weighted and iterative variants so the derived labels never drift.
pub(crate) fn assemble_result(factors: &HealthFactors, raw: f64, final_score: f64) -> HealthResult {
    let sd = standard_deviation(factors);
    let balance_status = BalanceStatus::from_standard_deviation(sd);

    HealthResult {
        final_score,
        raw_score: raw,
        standard_deviation: sd,
        status: HealthStatus::from_score(final_score),
        balance_status,
        equilibrium_factor: equilibrium_factor(sd),
        recommendations: generate_recommendations(factors, sd, balance_status),
        flower_level: FlowerLevel::from_score(final_score, balance_status),
    }
}

/// Score the factors with the weighted-penalty formula.
///
/// Pure and deterministic: the same factors always give a bit-identical result.
pub fn compute_score(factors: &HealthFactors) -> HealthResult {
    let raw = raw_score(factors);
    let penalty = standard_deviation(factors) * BALANCE_PENALTY_RATE;
    let final_score = round1(f64::clamp(raw - penalty, MIN_FACTOR_SCORE, MAX_FACTOR_SCORE));

    assemble_result(factors, raw, final_score)
}
