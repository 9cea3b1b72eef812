//! Iterative equilibrium refinement.
//!
//! A fixed-point heuristic over seven cross-influencing dimensions. The
//! influences are computed from the input once; what changes between
//! iterations are the dimension weights, which are pulled towards the weaker
//! dimensions while the adjusted values are widely spread. Convergence is not
//! guaranteed, so every run reports how it stopped.

use tracing::debug;

use crate::entities::equilibrium::{
    ConvergenceOutcome, EquilibriumConfig, EquilibriumDimension, EquilibriumFactors,
    EquilibriumReport, EquilibriumWeights, IterativeHealthResult,
};
use crate::entities::health_factors::{HealthFactors, MAX_FACTOR_SCORE, MIN_FACTOR_SCORE};
use crate::errors::ScoringError;
use crate::services::recommendations::dimension_guidance;
use crate::services::scoring::{assemble_result, round1};

/// Spread (sum of squared distances from 50) above which weights are redistributed
pub const REDISTRIBUTION_VARIANCE: f64 = 1000.0;
/// Dimensions below this adjusted value gain weight
pub const UNDERPERFORMING_BELOW: f64 = 75.0;
/// Dimensions above this adjusted value lose weight
pub const OVERPERFORMING_ABOVE: f64 = 85.0;
pub const MAX_WEIGHT: f64 = 0.3;
pub const MIN_WEIGHT: f64 = 0.05;

fn bounded(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Apply the cross-factor influences and flip stress and symptoms so that
/// every adjusted value reads higher-is-better
pub fn adjusted_dimensions(f: &EquilibriumFactors) -> EquilibriumFactors {
    let stress = bounded(f.stress - 0.4 * f.sleep - 0.3 * f.exercise);
    let symptoms = bounded(f.symptoms - 0.2 * f.nutrition - 0.3 * f.sleep);
    let pcos = if f.pcos > 0.0 {
        bounded(f.pcos + 0.3 * f.nutrition + 0.4 * f.exercise - 0.3 * f.stress)
    } else {
        0.0
    };

    EquilibriumFactors {
        sleep: bounded(f.sleep + 0.3 * f.exercise - 0.4 * f.stress),
        nutrition: bounded(f.nutrition + 0.2 * f.exercise - 0.3 * f.symptoms),
        stress: 100.0 - stress,
        exercise: bounded(f.exercise + 0.2 * f.sleep - 0.2 * f.stress),
        vitals: bounded(f.vitals + 0.3 * f.nutrition + 0.2 * f.exercise - 0.4 * f.stress),
        symptoms: 100.0 - symptoms,
        pcos,
    }
}

/// Sum of squared distances from the midpoint
pub fn total_variance(adjusted: &EquilibriumFactors) -> f64 {
    EquilibriumDimension::ALL
        .iter()
        .map(|d| (adjusted.get(*d) - 50.0).powi(2))
        .sum()
}

fn weighted_score(adjusted: &EquilibriumFactors, weights: &EquilibriumWeights) -> f64 {
    EquilibriumDimension::ALL
        .iter()
        .map(|d| adjusted.get(*d) * weights.get(*d))
        .sum()
}

/// Shift weight towards underperforming dimensions and renormalise to 1
pub fn redistribute_weights(
    adjusted: &EquilibriumFactors,
    weights: &EquilibriumWeights,
) -> EquilibriumWeights {
    let mut next = *weights;

    for dimension in EquilibriumDimension::ALL {
        let value = adjusted.get(dimension);
        let weight = weights.get(dimension);
        if value < UNDERPERFORMING_BELOW {
            next.set(dimension, f64::min(MAX_WEIGHT, weight * 1.1));
        } else if value > OVERPERFORMING_ABOVE {
            next.set(dimension, f64::max(MIN_WEIGHT, weight * 0.9));
        }
    }

    let total = next.sum();
    for dimension in EquilibriumDimension::ALL {
        next.set(dimension, next.get(dimension) / total);
    }

    next
}

/// Decide whether the latest score ends the run.
///
/// `last` is the previous score (0 before the first iteration) and
/// `second_last` the one before it, when there was one.
pub fn check_convergence(
    score: f64,
    last: f64,
    second_last: Option<f64>,
    threshold: f64,
) -> Option<ConvergenceOutcome> {
    if (score - last).abs() < threshold {
        return Some(ConvergenceOutcome::Converged);
    }
    match second_last {
        Some(earlier) if (score - earlier).abs() < threshold => Some(ConvergenceOutcome::Oscillating),
        _ => None,
    }
}

/// Where a refinement run stopped
#[derive(Debug, Clone, PartialEq)]
struct Refinement {
    score: f64,
    iterations: u32,
    convergence: ConvergenceOutcome,
    weights: EquilibriumWeights,
}

/// Re-score `adjusted` until the score settles, starts alternating, or the
/// iteration cap is hit. `next_weights` produces the weights for the next pass.
fn refine<F>(
    adjusted: &EquilibriumFactors,
    mut weights: EquilibriumWeights,
    config: &EquilibriumConfig,
    mut next_weights: F,
) -> Refinement
where
    F: FnMut(&EquilibriumFactors, &EquilibriumWeights) -> EquilibriumWeights,
{
    let mut last: Option<f64> = None;
    let mut second_last: Option<f64> = None;
    let mut score = 0.0;
    let mut iterations = 0;
    let mut convergence = ConvergenceOutcome::IterationCapReached;

    while iterations < config.max_iterations {
        score = weighted_score(adjusted, &weights);
        iterations += 1;

        if let Some(outcome) = check_convergence(
            score,
            last.unwrap_or(0.0),
            second_last,
            config.convergence_threshold,
        ) {
            convergence = outcome;
            break;
        }

        second_last = last;
        last = Some(score);
        weights = next_weights(adjusted, &weights);
    }

    Refinement { score, iterations, convergence, weights }
}

/// Score the factors with the iterative refinement.
///
/// Fails only on an invalid configuration. A run that does not converge still
/// returns its last score with `equilibrium_reached` set to false.
pub fn compute_score_iterative(
    factors: &HealthFactors,
    config: &EquilibriumConfig,
) -> Result<IterativeHealthResult, ScoringError> {
    config.validate()?;

    let dimensions = EquilibriumFactors::from_health_factors(factors);
    let adjusted = adjusted_dimensions(&dimensions);
    let redistribute = total_variance(&adjusted) > REDISTRIBUTION_VARIANCE;

    let Refinement { score, iterations, convergence, weights } = refine(
        &adjusted,
        EquilibriumFactors::initial_weights(),
        config,
        |adjusted, weights| {
            if redistribute {
                redistribute_weights(adjusted, weights)
            } else {
                *weights
            }
        },
    );

    debug!(
        "Equilibrium refinement stopped after {} iterations ({:?}), score {:.4}",
        iterations, convergence, score
    );

    let raw = score / 10.0;
    let final_score = round1(f64::clamp(raw, MIN_FACTOR_SCORE, MAX_FACTOR_SCORE));

    let mut result = assemble_result(factors, raw, final_score);
    result.recommendations.extend(dimension_guidance(&dimensions));

    Ok(IterativeHealthResult {
        result,
        report: EquilibriumReport {
            iterations,
            equilibrium_reached: convergence == ConvergenceOutcome::Converged,
            convergence,
            factor_weights: weights,
            equilibrium_score: score,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::health_score::{BalanceStatus, FlowerLevel, HealthStatus};

    fn factors(values: [f64; 5]) -> HealthFactors {
        HealthFactors::new(values[0], values[1], values[2], values[3], values[4]).unwrap()
    }

    #[test]
    fn test_adjusted_dimensions_are_bounded() {
        for sample in [[0.0; 5], [10.0; 5], [2.0, 10.0, 0.0, 10.0, 0.0], [5.0; 5]] {
            let adjusted = adjusted_dimensions(&EquilibriumFactors::from_health_factors(&factors(sample)));
            for dimension in EquilibriumDimension::ALL {
                let value = adjusted.get(dimension);
                assert!((0.0..=100.0).contains(&value), "{} = {}", dimension, value);
            }
        }
    }

    #[test]
    fn test_adjusted_dimensions_for_canonical_factors() {
        let dimensions = EquilibriumFactors::from_health_factors(&factors([8.0, 10.0, 8.0, 8.0, 6.0]));
        let adjusted = adjusted_dimensions(&dimensions);

        assert_eq!(adjusted.sleep, 100.0);
        assert!((adjusted.nutrition - 90.0).abs() < 1e-9);
        assert_eq!(adjusted.stress, 100.0);
        assert!((adjusted.exercise - 93.2).abs() < 1e-9);
        assert_eq!(adjusted.vitals, 100.0);
        assert_eq!(adjusted.symptoms, 100.0);
        assert_eq!(adjusted.pcos, 100.0);
    }

    #[test]
    fn test_pcos_dimension_stays_zero_when_zero() {
        let dimensions = EquilibriumFactors::from_health_factors(&factors([10.0, 10.0, 10.0, 10.0, 0.0]));
        assert_eq!(adjusted_dimensions(&dimensions).pcos, 0.0);
    }

    #[test]
    fn test_redistribution_keeps_weights_normalised() {
        let adjusted = EquilibriumFactors {
            sleep: 40.0,
            nutrition: 95.0,
            stress: 80.0,
            exercise: 20.0,
            vitals: 100.0,
            symptoms: 60.0,
            pcos: 90.0,
        };
        let initial = EquilibriumFactors::initial_weights();
        let next = redistribute_weights(&adjusted, &initial);

        assert!((next.sum() - 1.0).abs() < 1e-9);
        // Underperforming dimensions gain share, overperforming ones lose it
        assert!(next.sleep > initial.sleep);
        assert!(next.exercise > initial.exercise);
        assert!(next.nutrition < initial.nutrition);
        assert!(next.vitals < initial.vitals);
    }

    #[test]
    fn test_check_convergence_outcomes() {
        assert_eq!(check_convergence(50.0, 50.0005, None, 0.001), Some(ConvergenceOutcome::Converged));
        assert_eq!(check_convergence(50.0, 0.0, None, 0.001), None);
        assert_eq!(
            check_convergence(50.0, 52.0, Some(50.0), 0.001),
            Some(ConvergenceOutcome::Oscillating)
        );
        assert_eq!(check_convergence(50.0, 52.0, Some(51.0), 0.001), None);
    }

    #[test]
    fn test_alternating_weights_stop_as_oscillating() {
        let adjusted = EquilibriumFactors {
            sleep: 100.0,
            nutrition: 0.0,
            stress: 0.0,
            exercise: 0.0,
            vitals: 0.0,
            symptoms: 0.0,
            pcos: 0.0,
        };
        // Only the sleep weight matters since every other dimension is 0
        let weights = EquilibriumFactors { sleep: 0.5, ..adjusted };
        let config = EquilibriumConfig::default();

        // Scores run 50, 10, 50
        let refinement = refine(&adjusted, weights, &config, |_, current| {
            let mut next = *current;
            next.sleep = if current.sleep == 0.5 { 0.1 } else { 0.5 };
            next
        });

        assert_eq!(refinement.convergence, ConvergenceOutcome::Oscillating);
        assert_eq!(refinement.iterations, 3);
        assert_eq!(refinement.score, 50.0);
    }

    #[test]
    fn test_single_iteration_does_not_reach_equilibrium() {
        let config = EquilibriumConfig::new(1, 0.001).unwrap();
        let outcome = compute_score_iterative(&factors([2.0, 10.0, 10.0, 10.0, 10.0]), &config).unwrap();

        assert!(!outcome.report.equilibrium_reached);
        assert_eq!(outcome.report.iterations, 1);
        assert_eq!(outcome.report.convergence, ConvergenceOutcome::IterationCapReached);
        assert!(matches!(
            outcome.require_equilibrium(),
            Err(ScoringError::ConvergenceNotReached { iterations: 1 })
        ));
    }

    #[test]
    fn test_canonical_factors_converge() {
        let outcome = compute_score_iterative(
            &factors([8.0, 10.0, 8.0, 8.0, 6.0]),
            &EquilibriumConfig::default(),
        )
        .unwrap();

        assert!(outcome.report.equilibrium_reached);
        assert_eq!(outcome.report.convergence, ConvergenceOutcome::Converged);
        assert!(outcome.report.iterations >= 2 && outcome.report.iterations <= 5);
        assert!((outcome.report.factor_weights.sum() - 1.0).abs() < 1e-9);

        let result = &outcome.result;
        assert_eq!(result.final_score, 9.7);
        assert_eq!(result.status, HealthStatus::Stable);
        assert_eq!(result.balance_status, BalanceStatus::Harmonious);
        assert_eq!(result.flower_level, FlowerLevel::Hibiscus);
        assert!(outcome.require_equilibrium().is_ok());
    }

    #[test]
    fn test_iterative_recommendations_append_guidance() {
        let outcome = compute_score_iterative(
            &factors([2.0, 10.0, 10.0, 10.0, 10.0]),
            &EquilibriumConfig::default(),
        )
        .unwrap();

        assert_eq!(
            outcome.result.recommendations,
            vec![
                "Focus on improving symptoms to restore balance".to_string(),
                "Your vitals are great! Let's work on symptom management for comfort".to_string(),
                EquilibriumDimension::Stress.guidance().to_string(),
                EquilibriumDimension::Symptoms.guidance().to_string(),
            ]
        );
    }

    #[test]
    fn test_iterative_is_deterministic_and_bounded() {
        let config = EquilibriumConfig::default();
        for sample in [[0.0; 5], [10.0; 5], [3.3, 7.1, 0.4, 9.9, 5.5], [1.0, 2.0, 3.0, 4.0, 5.0]] {
            let first = compute_score_iterative(&factors(sample), &config).unwrap();
            let second = compute_score_iterative(&factors(sample), &config).unwrap();
            assert_eq!(first, second);
            assert!((0.0..=10.0).contains(&first.result.final_score));
            assert!(first.report.iterations >= 1 && first.report.iterations <= config.max_iterations);
        }
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let config = EquilibriumConfig { max_iterations: 0, convergence_threshold: 0.001 };
        assert!(matches!(
            compute_score_iterative(&factors([5.0; 5]), &config),
            Err(ScoringError::InvalidConfiguration(_))
        ));

        let config = EquilibriumConfig { max_iterations: 10, convergence_threshold: f64::NAN };
        assert!(compute_score_iterative(&factors([5.0; 5]), &config).is_err());
    }
}
