//! Win/draw/loss balance and draw correction.
//!
//! Raw correct-score books tend to over-weight draws when one side is clearly
//! stronger. The analyzer measures how lopsided the home-win vs away-win mass
//! is and shrinks every draw scoreline by a penalty that grows with that
//! imbalance. Asymmetry inside `balance_tolerance` is treated as balanced.
//!
//! High-scoring draws are then trimmed by goal tier (2-2 lightly, 3-3 and
//! above heavily); 0-0 and 1-1 are left alone.

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::models::{BalanceSummary, Outcome, ProbabilityDistribution, Scoreline};

// ── Balance ──

/// `|win − lose| / (win + lose)`, 0 when neither side has mass.
pub fn asymmetry(win: f64, lose: f64) -> f64 {
    let decisive = win + lose;
    if decisive > 0.0 {
        (win - lose).abs() / decisive
    } else {
        0.0
    }
}

/// Asymmetry beyond the tolerance band, rescaled to [0, 1].
pub fn balance_factor(asymmetry: f64, tolerance: f64) -> f64 {
    if asymmetry <= tolerance {
        0.0
    } else {
        ((asymmetry - tolerance) / (1.0 - tolerance)).clamp(0.0, 1.0)
    }
}

/// Multiplier for draw scorelines: exactly 1 for a balanced match, then
/// non-increasing in the balance factor down to the floor.
pub fn draw_penalty(balance_factor: f64, config: &EngineConfig) -> f64 {
    if balance_factor <= 0.0 {
        return 1.0;
    }
    (1.0 - config.draw_penalty_slope * balance_factor)
        .max(config.draw_penalty_floor)
        .min(1.0)
}

pub fn analyze(weights: &ProbabilityDistribution, config: &EngineConfig) -> BalanceSummary {
    let (mut win, mut lose, mut draw) = (0.0, 0.0, 0.0);
    for (scoreline, w) in weights {
        match scoreline.outcome() {
            Some(Outcome::HomeWin) => win += w,
            Some(Outcome::AwayWin) => lose += w,
            Some(Outcome::Draw) => draw += w,
            None => {}
        }
    }
    let asym = asymmetry(win, lose);
    let factor = balance_factor(asym, config.balance_tolerance);
    let numeric = win + lose + draw;
    let share = |x: f64| if numeric > 0.0 { x / numeric } else { 0.0 };
    BalanceSummary {
        win_sum: share(win),
        lose_sum: share(lose),
        draw_sum: share(draw),
        asymmetry: asym,
        balance_factor: factor,
        draw_penalty: draw_penalty(factor, config),
    }
}

/// Analyze and apply the draw penalty. Non-draw entries are unchanged.
pub fn correct_draws(
    weights: &ProbabilityDistribution,
    config: &EngineConfig,
) -> (ProbabilityDistribution, BalanceSummary) {
    let summary = analyze(weights, config);
    info!(
        "⚖️ Balance factor {:.3} (asymmetry {:.3}; win {:.3}, lose {:.3}, draw {:.3}) → draw penalty {:.3}",
        summary.balance_factor,
        summary.asymmetry,
        summary.win_sum,
        summary.lose_sum,
        summary.draw_sum,
        summary.draw_penalty
    );
    let corrected = weights.map_mass(|scoreline, w| match scoreline.outcome() {
        Some(Outcome::Draw) => w * summary.draw_penalty,
        _ => w,
    });
    (corrected, summary)
}

// ── Draw tiers ──

/// Tier multiplier for one scoreline; 1 for anything that is not a
/// mid- or high-scoring draw.
pub fn draw_tier_multiplier(scoreline: &Scoreline, config: &EngineConfig) -> f64 {
    match scoreline.goals() {
        Some((h, a)) if h == a && h >= config.high_draw_goals => config.high_draw_multiplier,
        Some((h, a)) if h == a && h >= config.mid_draw_goals => config.mid_draw_multiplier,
        _ => 1.0,
    }
}

/// Trim high-scoring draws. Everything else is unchanged.
pub fn apply_draw_tiers(weights: &ProbabilityDistribution, config: &EngineConfig) -> ProbabilityDistribution {
    weights.map_mass(|scoreline, w| {
        let m = draw_tier_multiplier(scoreline, config);
        if m != 1.0 {
            debug!("🔧 {}: draw tier ×{:.2}", scoreline, m);
        }
        w * m
    })
}
