//! Odds screening and implied-probability normalization.
//!
//! Decimal odds `o` imply a probability of `1/o`. A bookmaker's book sums to
//! more than 1 (the overround), so the implied probabilities are rescaled
//! proportionally to sum to exactly 1.

use std::collections::HashSet;
use tracing::warn;

use crate::error::{InferenceError, Result};
use crate::models::{OddsQuote, ProbabilityDistribution, RawQuote, Scoreline};

// ── Screening ──

/// Parse extractor rows into quotes. Invalid rows and repeated scorelines are
/// dropped with a warning; the first quote for a scoreline wins.
pub fn screen_rows(rows: Vec<RawQuote>) -> Vec<OddsQuote> {
    let mut seen: HashSet<Scoreline> = HashSet::new();
    let mut quotes = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_quote() {
            Ok(q) => {
                if seen.insert(q.scoreline.clone()) {
                    quotes.push(q);
                } else {
                    warn!("Duplicate quote for {} dropped (odds {})", q.scoreline, q.odds);
                }
            }
            Err(e) => warn!("Quote dropped: {}", e),
        }
    }
    quotes
}

/// Same screening for already-typed quotes (fields are public, so odds are
/// re-checked here).
pub fn screen_quotes(quotes: &[OddsQuote]) -> Vec<OddsQuote> {
    let mut seen: HashSet<&Scoreline> = HashSet::new();
    let mut kept = Vec::with_capacity(quotes.len());
    for q in quotes {
        if let Err(e) = validate(q) {
            warn!("Quote dropped: {}", e);
            continue;
        }
        if !seen.insert(&q.scoreline) {
            warn!("Duplicate quote for {} dropped (odds {})", q.scoreline, q.odds);
            continue;
        }
        kept.push(q.clone());
    }
    kept
}

fn validate(quote: &OddsQuote) -> Result<()> {
    if quote.odds.is_finite() && quote.odds > 1.0 {
        Ok(())
    } else {
        Err(InferenceError::InvalidOdds {
            scoreline: quote.scoreline.to_string(),
            odds: Some(quote.odds),
        })
    }
}

// ── Normalization ──

/// Convert quotes to a probability distribution summing to 1.
///
/// # Arguments
/// * `quotes` - decimal odds, each finite and > 1.0
///
/// # Returns
/// Strict: an empty set yields `NoData` and any invalid quote yields
/// `InvalidOdds`. Callers that want lenient behaviour screen first.
pub fn normalize(quotes: &[OddsQuote]) -> Result<ProbabilityDistribution> {
    if quotes.is_empty() {
        return Err(InferenceError::NoData);
    }
    let mut implied = ProbabilityDistribution::new();
    for q in quotes {
        validate(q)?;
        if implied.get(&q.scoreline).is_none() {
            implied.insert(q.scoreline.clone(), q.implied_probability());
        }
    }
    implied.normalized()
}

/// Bookmaker margin: sum of implied probabilities minus one.
pub fn overround(quotes: &[OddsQuote]) -> f64 {
    quotes.iter().map(OddsQuote::implied_probability).sum::<f64>() - 1.0
}
