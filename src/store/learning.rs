//! Settled-match update rule for the expected differential.
//!
//! After the real result is known the expected differential moves by
//! `learning_rate × (|real diff| − |predicted diff|)` and is clamped to
//! `[min_value, max_value]`. A prediction that underestimated the margin
//! pushes the belief up; one that overestimated it pulls it down.

use serde::Serialize;
use tracing::info;

use super::ExpectedDifferentialStore;
use crate::error::{InferenceError, Result};
use crate::models::Scoreline;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialLearner {
    pub learning_rate: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl Default for DifferentialLearner {
    fn default() -> Self {
        DifferentialLearner {
            learning_rate: 0.1,
            min_value: 0.5,
            max_value: 5.0,
        }
    }
}

/// Result of one settled match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LearningOutcome {
    pub previous: f64,
    /// Unclamped `(real − predicted difference) × learning_rate`
    pub adjustment: f64,
    /// Value now held by the store
    pub current: f64,
}

impl DifferentialLearner {
    /// Signed change implied by one settled match, before clamping.
    pub fn adjustment(&self, predicted: &Scoreline, real: &Scoreline) -> Result<f64> {
        let pred_diff = goal_difference(predicted)?;
        let real_diff = goal_difference(real)?;
        Ok((real_diff - pred_diff) * self.learning_rate)
    }

    /// Apply one settled match to the store in a single atomic update.
    pub fn learn(
        &self,
        store: &ExpectedDifferentialStore,
        predicted: &Scoreline,
        real: &Scoreline,
    ) -> Result<LearningOutcome> {
        let adjustment = self.adjustment(predicted, real)?;
        let mut previous = 0.0;
        let snapshot = store.update(|current| {
            previous = current;
            (current + adjustment).clamp(self.min_value, self.max_value)
        });
        info!(
            "🎓 Learned from {} (predicted {}): expected differential {:.4} → {:.4}",
            real, predicted, previous, snapshot.value
        );
        Ok(LearningOutcome {
            previous,
            adjustment,
            current: snapshot.value,
        })
    }
}

fn goal_difference(scoreline: &Scoreline) -> Result<f64> {
    scoreline
        .goal_difference()
        .map(f64::from)
        .ok_or_else(|| InferenceError::UnscoredResult(scoreline.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wider_real_margin_raises_expectation() {
        let store = ExpectedDifferentialStore::new(2.0);
        let out = DifferentialLearner::default()
            .learn(&store, &Scoreline::new(1, 0), &Scoreline::new(3, 0))
            .unwrap();
        assert_relative_eq!(out.adjustment, 0.2, epsilon = 1e-12);
        assert_relative_eq!(out.previous, 2.0);
        assert_relative_eq!(store.get(), 2.2, epsilon = 1e-12);
    }

    #[test]
    fn narrower_real_margin_lowers_expectation() {
        let store = ExpectedDifferentialStore::new(2.0);
        DifferentialLearner::default()
            .learn(&store, &Scoreline::new(3, 0), &Scoreline::new(1, 1))
            .unwrap();
        assert_relative_eq!(store.get(), 1.7, epsilon = 1e-12);
    }

    #[test]
    fn result_is_clamped() {
        let learner = DifferentialLearner::default();
        let store = ExpectedDifferentialStore::new(0.55);
        learner
            .learn(&store, &Scoreline::new(5, 0), &Scoreline::new(0, 0))
            .unwrap();
        assert_relative_eq!(store.get(), 0.5);

        let store = ExpectedDifferentialStore::new(4.9);
        learner
            .learn(&store, &Scoreline::new(0, 0), &Scoreline::new(7, 0))
            .unwrap();
        assert_relative_eq!(store.get(), 5.0);
    }

    #[test]
    fn non_numeric_scoreline_is_rejected_without_writing() {
        let store = ExpectedDifferentialStore::new(2.0);
        let err = DifferentialLearner::default()
            .learn(&store, &Scoreline::Other("Autre".into()), &Scoreline::new(1, 0))
            .unwrap_err();
        assert_eq!(err, InferenceError::UnscoredResult("Autre".into()));
        assert_eq!(store.snapshot().revision, 0);
    }

    #[test]
    fn outcome_carries_the_value_to_persist() {
        let store = ExpectedDifferentialStore::new(2.0);
        let out = DifferentialLearner::default()
            .learn(&store, &Scoreline::new(2, 0), &Scoreline::new(2, 2))
            .unwrap();
        let json = serde_json::to_value(out).unwrap();
        assert_relative_eq!(json["current"].as_f64().unwrap(), store.get());
        assert_relative_eq!(json["previous"].as_f64().unwrap(), 2.0);
        assert_relative_eq!(json["adjustment"].as_f64().unwrap(), -0.2, epsilon = 1e-12);
    }
}
