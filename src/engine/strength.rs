//! Team-strength bias.
//!
//! With `r = ln(home_coeff / away_coeff)`, home-win scorelines are scaled by
//! `1 + sensitivity·r` and away-win scorelines by `1 − sensitivity·r`, both
//! clamped to the configured multiplier range. Draws and catch-all buckets are
//! untouched; equal coefficients are a no-op.

use tracing::info;

use crate::config::EngineConfig;
use crate::models::{Outcome, ProbabilityDistribution, TeamStrength};

/// Multipliers for (home-win, away-win) scorelines.
///
/// # Arguments
/// * `home` / `away` - team strengths; unusable coefficients count as 1.0
/// * `config` - sensitivity and clamp range
///
/// # Returns
/// `(home_win, away_win)`, both within `[strength_min_multiplier, strength_max_multiplier]`
pub fn strength_multipliers(
    home: &TeamStrength,
    away: &TeamStrength,
    config: &EngineConfig,
) -> (f64, f64) {
    let log_ratio = (usable(home.coefficient) / usable(away.coefficient)).ln();
    let clamp = |m: f64| m.clamp(config.strength_min_multiplier, config.strength_max_multiplier);
    (
        clamp(1.0 + config.strength_sensitivity * log_ratio),
        clamp(1.0 - config.strength_sensitivity * log_ratio),
    )
}

fn usable(coefficient: f64) -> f64 {
    if coefficient.is_finite() && coefficient > 0.0 {
        coefficient
    } else {
        1.0
    }
}

pub fn apply_strength(
    weights: &ProbabilityDistribution,
    home: &TeamStrength,
    away: &TeamStrength,
    config: &EngineConfig,
) -> ProbabilityDistribution {
    let (home_mult, away_mult) = strength_multipliers(home, away, config);
    info!(
        "⚽ {} ({:.2}) vs {} ({:.2}) → home-win ×{:.3}, away-win ×{:.3}",
        home.team_name, home.coefficient, away.team_name, away.coefficient, home_mult, away_mult
    );
    weights.map_mass(|scoreline, w| match scoreline.outcome() {
        Some(Outcome::HomeWin) => w * home_mult,
        Some(Outcome::AwayWin) => w * away_mult,
        Some(Outcome::Draw) | None => w,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scoreline;
    use approx::assert_relative_eq;

    fn team(name: &str, coefficient: f64) -> TeamStrength {
        TeamStrength { team_name: name.into(), coefficient, rank: None }
    }

    fn sample() -> ProbabilityDistribution {
        vec![
            (Scoreline::new(2, 0), 0.3),
            (Scoreline::new(1, 1), 0.3),
            (Scoreline::new(0, 1), 0.3),
            (Scoreline::Other("Autre".into()), 0.1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn neutral_coefficients_are_a_no_op() {
        let cfg = EngineConfig::default();
        let out = apply_strength(&sample(), &TeamStrength::neutral("A"), &TeamStrength::neutral("B"), &cfg);
        assert_eq!(out, sample());
    }

    #[test]
    fn stronger_home_side_gains_home_wins_only() {
        let cfg = EngineConfig::default();
        let out = apply_strength(&sample(), &team("France", 1.5), &team("Moldova", 1.0), &cfg);
        let r = 1.5f64.ln();
        assert_relative_eq!(out.get(&Scoreline::new(2, 0)).unwrap(), 0.3 * (1.0 + r), epsilon = 1e-12);
        assert_relative_eq!(out.get(&Scoreline::new(0, 1)).unwrap(), 0.3 * (1.0 - r), epsilon = 1e-12);
        assert_relative_eq!(out.get(&Scoreline::new(1, 1)).unwrap(), 0.3);
        assert_relative_eq!(out.get(&Scoreline::Other("Autre".into())).unwrap(), 0.1);
    }

    #[test]
    fn home_multiplier_falls_as_away_strength_grows() {
        let cfg = EngineConfig::default();
        let home = team("Home", 1.0);
        let mut prev = f64::INFINITY;
        for away in [0.5, 0.85, 1.0, 1.3, 2.0, 4.0] {
            let (h, a) = strength_multipliers(&home, &team("Away", away), &cfg);
            assert!(h <= prev);
            assert!(h > 0.0 && a > 0.0);
            prev = h;
        }
    }

    #[test]
    fn multipliers_are_clamped() {
        let cfg = EngineConfig::default();
        let (h, a) = strength_multipliers(&team("Giant", 1000.0), &team("Minnow", 0.001), &cfg);
        assert_relative_eq!(h, cfg.strength_max_multiplier);
        assert_relative_eq!(a, cfg.strength_min_multiplier);
    }

    #[test]
    fn unusable_coefficient_counts_as_neutral() {
        let cfg = EngineConfig::default();
        let (h, a) = strength_multipliers(&team("Broken", -1.0), &team("Other", 1.0), &cfg);
        assert_relative_eq!(h, 1.0);
        assert_relative_eq!(a, 1.0);
    }
}
