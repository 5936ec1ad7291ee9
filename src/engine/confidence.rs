//! Confidence of a final distribution: the probability of its single most
//! likely scoreline.

use crate::error::{InferenceError, Result};
use crate::models::ProbabilityDistribution;

/// Mass of the top-ranked scoreline. For an N-entry distribution this lies in
/// [1/N, 1], reaching 1 only when a single scoreline holds all the mass.
pub fn confidence(distribution: &ProbabilityDistribution) -> Result<f64> {
    distribution
        .top()
        .map(|(_, p)| p.clamp(0.0, 1.0))
        .ok_or(InferenceError::EmptyDistribution)
}
