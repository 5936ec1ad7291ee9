//! Goal-differential re-weighting.
//!
//! Every numeric scoreline is weighted by a Gaussian kernel on its absolute
//! goal difference, centred on the expected differential:
//!
//!   weight = exp(-bandwidth × (|h − a| − target)²)
//!
//! Catch-all buckets pass through with weight 1. The output is a weight map,
//! not a distribution; it is renormalized once at the end of the pipeline.
//!
//! A book made only of blowouts far from the target can underflow every
//! kernel weight to 0.0. The weights are then recomputed in log space,
//! shifted by the largest exponent, so the map keeps its relative shape.

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::models::{ProbabilityDistribution, Scoreline};

/// Kernel centre for a given expected differential. Expectations above the
/// damping threshold are shifted up by `damping_shift`.
pub fn adjusted_target(expected_differential: f64, config: &EngineConfig) -> f64 {
    if expected_differential > config.damping_threshold {
        expected_differential + config.damping_shift
    } else {
        expected_differential
    }
}

// ── Kernel ──

pub fn kernel_weight(goal_difference: f64, target: f64, bandwidth: f64) -> f64 {
    log_kernel_weight(goal_difference, target, bandwidth).exp()
}

pub fn log_kernel_weight(goal_difference: f64, target: f64, bandwidth: f64) -> f64 {
    -bandwidth * (goal_difference - target).powi(2)
}

/// Natural log of the weight applied to one scoreline (0 for catch-all buckets).
pub fn scoreline_log_weight(scoreline: &Scoreline, target: f64, config: &EngineConfig) -> f64 {
    match scoreline.goal_difference() {
        Some(diff) => log_kernel_weight(f64::from(diff), target, config.gaussian_bandwidth),
        None => 0.0,
    }
}

/// Weight applied to one scoreline.
pub fn scoreline_weight(scoreline: &Scoreline, target: f64, config: &EngineConfig) -> f64 {
    scoreline_log_weight(scoreline, target, config).exp()
}

// ── Weighting ──

/// Re-weight a normalized distribution around the expected differential.
///
/// # Arguments
/// * `distribution` - normalized market probabilities
/// * `expected_differential` - current expected absolute goal difference
/// * `config` - kernel bandwidth and damping rule
///
/// # Returns
/// A weight map with positive total mass whenever `distribution` has any.

pub fn apply_differential_weights(
    distribution: &ProbabilityDistribution,
    expected_differential: f64,
    config: &EngineConfig,
) -> ProbabilityDistribution {
    let target = adjusted_target(expected_differential, config);
    debug!(
        "Differential kernel: expected={:.3}, target={:.3}, bandwidth={}",
        expected_differential, target, config.gaussian_bandwidth
    );
    let weighted = distribution.map_mass(|scoreline, p| {
        let w = scoreline_weight(scoreline, target, config);
        debug!("Score {}: p={:.4}, weight={:.3}, weighted={:.4}", scoreline, p, w, p * w);
        p * w
    });

    let total = weighted.total();
    if (total > 0.0 && total.is_finite()) || distribution.total() <= 0.0 {
        return weighted;
    }
    warn!(
        "Every kernel weight underflowed around target {:.3}; rescaling in log space",
        target
    );
    rescaled_log_weights(distribution, target, config)
}

/// Weights divided by the largest one among entries that carry mass.
fn rescaled_log_weights(
    distribution: &ProbabilityDistribution,
    target: f64,
    config: &EngineConfig,
) -> ProbabilityDistribution {
    let peak = distribution
        .iter()
        .filter(|(_, p)| **p > 0.0)
        .map(|(s, _)| scoreline_log_weight(s, target, config))
        .fold(f64::NEG_INFINITY, f64::max);
    distribution.map_mass(|scoreline, p| {
        p * (scoreline_log_weight(scoreline, target, config) - peak).exp()
    })
}
