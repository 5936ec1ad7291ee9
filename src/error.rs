use thiserror::Error;

/// Errors raised by the inference pipeline and its collaborators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("No odds data available for prediction")]
    NoData,

    #[error("Invalid odds for {scoreline}: {odds:?} (decimal odds must be finite and > 1.0)")]
    InvalidOdds { scoreline: String, odds: Option<f64> },

    #[error("Probability distribution is empty or carries no mass")]
    EmptyDistribution,

    #[error("Scoreline '{0}' has no numeric goals and cannot be learned from")]
    UnscoredResult(String),

    #[error("Coefficient table error: {0}")]
    Coefficients(String),
}

pub type Result<T> = std::result::Result<T, InferenceError>;
