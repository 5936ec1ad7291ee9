//! Correct-score odds to calibrated scoreline probabilities.
//!
//! Bookmaker correct-score odds are normalized into implied probabilities,
//! re-weighted around the expected goal differential, optionally biased by
//! team-strength coefficients and corrected for draw over-estimation. The
//! result is a scoreline distribution, a most-probable score and a confidence.

pub mod coefficients;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use engine::InferenceEngine;
pub use error::{InferenceError, Result};
pub use models::{InferenceContext, InferenceResult, OddsQuote, ProbabilityDistribution, Scoreline};
pub use store::ExpectedDifferentialStore;
