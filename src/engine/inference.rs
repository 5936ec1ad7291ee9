//! Inference orchestration.
//!
//! One call runs the fixed pipeline: screen quotes, normalize, weight by goal
//! differential, optionally bias by team strength, correct draws, trim
//! high-scoring draws, renormalize, then rank. The expected differential is
//! read from the store once per call.

use tracing::{debug, info, warn};

use super::{balance, confidence, differential, odds, strength};
use crate::coefficients::CoefficientChain;
use crate::config::EngineConfig;
use crate::error::{InferenceError, Result};
use crate::models::{
    InferenceContext, InferenceResult, OddsQuote, RawQuote, ScoreProbability, TeamStrength, TOP_SCORES,
};
use crate::store::ExpectedDifferentialStore;

/// League labels that carry no information about the competition.
const UNKNOWN_LEAGUES: [&str; 3] = ["", "unknown", "inconnu"];

/// Runs the odds → scoreline-probability pipeline.
///
/// The engine itself is immutable; the only shared state it touches is one
/// read of the expected-differential store per call.
#[derive(Clone)]
pub struct InferenceEngine {
    config: EngineConfig,
    store: ExpectedDifferentialStore,
    coefficients: CoefficientChain,
}

impl InferenceEngine {
    pub fn new(config: EngineConfig, store: ExpectedDifferentialStore) -> Self {
        InferenceEngine {
            config,
            store,
            coefficients: CoefficientChain::default(),
        }
    }

    pub fn with_coefficients(mut self, coefficients: CoefficientChain) -> Self {
        self.coefficients = coefficients;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ExpectedDifferentialStore {
        &self.store
    }

    /// Infer from extractor rows, dropping rows that do not form a valid quote.
    pub fn infer_rows(&self, rows: Vec<RawQuote>, context: &InferenceContext) -> Result<InferenceResult> {
        let quotes = odds::screen_rows(rows);
        self.infer(&quotes, context)
    }

    /// Infer the scoreline distribution for one match.
    ///
    /// # Arguments
    /// * `quotes` - bookmaker quotes; invalid and duplicate entries are dropped
    /// * `context` - team and league information for the strength step
    ///
    /// # Returns
    /// Empty or fully invalid input yields the "no data" result rather than an
    /// error. Every step keeps the total mass positive, so well-formed input
    /// always produces a distribution.
    pub fn infer(&self, quotes: &[OddsQuote], context: &InferenceContext) -> Result<InferenceResult> {
        let expected_differential = self.store.get();

        let quotes = odds::screen_quotes(quotes);
        let normalized = match odds::normalize(&quotes) {
            Ok(d) => d,
            Err(InferenceError::NoData) => {
                warn!("No usable odds for prediction");
                return Ok(InferenceResult::no_data(expected_differential));
            }
            Err(e) => return Err(e),
        };
        info!(
            "Inferring over {} scorelines (overround {:.3}), expected differential {:.3}",
            normalized.len(),
            odds::overround(&quotes),
            expected_differential
        );

        let mut weights =
            differential::apply_differential_weights(&normalized, expected_differential, &self.config);

        let strengths = self.resolve_strengths(context);
        if let Some((home, away)) = &strengths {
            weights = strength::apply_strength(&weights, home, away, &self.config);
        }

        let (corrected, summary) = balance::correct_draws(&weights, &self.config);
        let distribution = balance::apply_draw_tiers(&corrected, &self.config).normalized()?;

        let (top, _) = distribution.top().ok_or(InferenceError::EmptyDistribution)?;
        let top = top.clone();
        let confidence = confidence::confidence(&distribution)?;
        info!("🏆 Most probable score: {} ({:.2}%)", top, confidence * 100.0);

        Ok(InferenceResult {
            most_probable_score: Some(top),
            probabilities: distribution.to_percentages(),
            top3: ScoreProbability::leaders(&distribution, TOP_SCORES),
            confidence,
            expected_differential,
            balance: Some(summary),
            strengths,
            distribution,
        })
    }

    /// Coefficients for both sides, or `None` when strength adjustment does not
    /// apply to this request.
    fn resolve_strengths(&self, context: &InferenceContext) -> Option<(TeamStrength, TeamStrength)> {
        if !context.use_league_coeff {
            return None;
        }
        let home = non_blank(context.home_team.as_deref());
        let away = non_blank(context.away_team.as_deref());
        let (home, away) = match (home, away) {
            (Some(h), Some(a)) => (h, a),
            _ => {
                debug!("Strength adjustment skipped: team names missing");
                return None;
            }
        };
        if self.coefficients.is_empty() {
            warn!("Strength adjustment requested but no coefficient source is loaded");
        }
        let league = context.league.as_deref().map(str::trim);
        if let Some(l) = league {
            if UNKNOWN_LEAGUES.iter().any(|u| l.eq_ignore_ascii_case(u)) {
                debug!("Strength adjustment skipped: unknown league '{}'", l);
                return None;
            }
        }
        Some((
            self.coefficients.strength_of(home, league),
            self.coefficients.strength_of(away, league),
        ))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
