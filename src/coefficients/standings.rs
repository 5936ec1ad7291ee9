//! League standings: a club's coefficient follows its table position, from
//! `max_coefficient` for the leader down to `min_coefficient` for the last side.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::{normalize_name, CoefficientProvider};
use crate::error::{InferenceError, Result};
use crate::models::TeamStrength;

pub const MIN_COEFFICIENT: f64 = 0.85;
pub const MAX_COEFFICIENT: f64 = 1.30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoefficientCurve {
    /// coef = min + (N - pos) / (N - 1) * (max - min)
    Linear,
    /// coef = min + ((N - pos) / (N - 1))^exponent * (max - min); favours the top of the table
    Exponential { exponent: f64 },
}

#[derive(Debug, Clone, Deserialize)]
struct StandingsFile {
    leagues: BTreeMap<String, BTreeMap<String, u32>>,
}

#[derive(Debug, Clone)]
pub struct LeagueStandings {
    /// normalized league → (normalized team → (display name, position))
    leagues: BTreeMap<String, BTreeMap<String, (String, u32)>>,
    curve: CoefficientCurve,
    min_coefficient: f64,
    max_coefficient: f64,
}

impl LeagueStandings {
    pub fn new(leagues: BTreeMap<String, BTreeMap<String, u32>>, curve: CoefficientCurve) -> Self {
        let leagues = leagues
            .into_iter()
            .map(|(league, table)| {
                let table = table
                    .into_iter()
                    .map(|(team, pos)| (normalize_name(&team), (team, pos)))
                    .collect();
                (normalize_name(&league), table)
            })
            .collect();
        LeagueStandings {
            leagues,
            curve,
            min_coefficient: MIN_COEFFICIENT,
            max_coefficient: MAX_COEFFICIENT,
        }
    }

    /// Replace the default 0.85 to 1.30 coefficient range.
    pub fn with_bounds(mut self, min_coefficient: f64, max_coefficient: f64) -> Self {
        self.min_coefficient = min_coefficient;
        self.max_coefficient = max_coefficient;
        self
    }

    pub fn from_json(json: &str, curve: CoefficientCurve) -> Result<Self> {
        let file: StandingsFile = serde_json::from_str(json)
            .map_err(|e| InferenceError::Coefficients(format!("invalid standings table: {}", e)))?;
        Ok(Self::new(file.leagues, curve))
    }

    pub fn from_path(path: impl AsRef<Path>, curve: CoefficientCurve) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::Coefficients(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json, curve)
    }

    /// Coefficient for `position` in a table whose last position is `size`.
    pub fn coefficient_for_position(&self, position: u32, size: u32) -> Option<f64> {
        if size <= 1 || position == 0 || position > size {
            return None;
        }
        let raw = f64::from(size - position) / f64::from(size - 1);
        let shaped = match self.curve {
            CoefficientCurve::Linear => raw,
            CoefficientCurve::Exponential { exponent } => raw.powf(exponent),
        };
        let coef = self.min_coefficient + shaped * (self.max_coefficient - self.min_coefficient);
        Some((coef * 10_000.0).round() / 10_000.0)
    }
}

impl CoefficientProvider for LeagueStandings {
    fn lookup(&self, team_name: &str, league: Option<&str>) -> Option<TeamStrength> {
        let table = self.leagues.get(&normalize_name(league?))?;
        let (display, position) = table.get(&normalize_name(team_name))?;
        let size = table
            .values()
            .map(|(_, p)| *p)
            .max()
            .filter(|max| *max > 1)
            .unwrap_or(table.len() as u32);
        let coefficient = self.coefficient_for_position(*position, size)?;
        Some(TeamStrength {
            team_name: display.clone(),
            coefficient,
            rank: Some(*position),
        })
    }

    fn name(&self) -> &str {
        "league-standings"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn laliga(curve: CoefficientCurve) -> LeagueStandings {
        let mut teams = String::new();
        for pos in 1..=20u32 {
            teams.push_str(&format!("\"Team {}\": {},", pos, pos));
        }
        teams.push_str("\"Real Madrid\": 1");
        let json = format!(
            r#"{{"leagues": {{"LaLiga": {{{}}}, "Tiny": {{"Solo FC": 1}}}}}}"#,
            teams
        );
        LeagueStandings::from_json(&json, curve).unwrap()
    }

    #[test]
    fn linear_endpoints_and_midtable() {
        let s = laliga(CoefficientCurve::Linear);
        assert_relative_eq!(s.lookup("Team 1", Some("LaLiga")).unwrap().coefficient, 1.30);
        assert_relative_eq!(s.lookup("Team 20", Some("LaLiga")).unwrap().coefficient, 0.85);
        // 0.85 + 10/19 * 0.45 = 1.0868...
        assert_relative_eq!(
            s.lookup("Team 10", Some("LaLiga")).unwrap().coefficient,
            1.0868,
            epsilon = 1e-9
        );
    }

    #[test]
    fn exponential_curve_drops_faster_below_the_top() {
        let lin = laliga(CoefficientCurve::Linear);
        let exp = laliga(CoefficientCurve::Exponential { exponent: 2.0 });
        let l = lin.lookup("Team 10", Some("LaLiga")).unwrap().coefficient;
        let e = exp.lookup("Team 10", Some("LaLiga")).unwrap().coefficient;
        assert!(e < l);
        assert_relative_eq!(exp.lookup("Team 1", Some("LaLiga")).unwrap().coefficient, 1.30);
        assert_relative_eq!(exp.lookup("Team 20", Some("LaLiga")).unwrap().coefficient, 0.85);
    }

    #[test]
    fn lookup_is_case_and_accent_insensitive() {
        let s = laliga(CoefficientCurve::Linear);
        let rm = s.lookup("real madrid", Some("laliga")).unwrap();
        assert_eq!(rm.team_name, "Real Madrid");
        assert_eq!(rm.rank, Some(1));
    }

    #[test]
    fn misses_without_league_or_meaningful_table() {
        let s = laliga(CoefficientCurve::Linear);
        assert!(s.lookup("Team 1", None).is_none());
        assert!(s.lookup("Team 1", Some("Serie A")).is_none());
        assert!(s.lookup("Nobody", Some("LaLiga")).is_none());
        assert!(s.lookup("Solo FC", Some("Tiny")).is_none());
    }

    #[test]
    fn position_outside_table_is_rejected() {
        let s = laliga(CoefficientCurve::Linear);
        assert!(s.coefficient_for_position(0, 20).is_none());
        assert!(s.coefficient_for_position(21, 20).is_none());
    }

    #[test]
    fn custom_bounds_rescale_the_table() {
        let s = laliga(CoefficientCurve::Linear).with_bounds(0.5, 2.0);
        assert_relative_eq!(s.lookup("Team 1", Some("LaLiga")).unwrap().coefficient, 2.0);
        assert_relative_eq!(s.lookup("Team 20", Some("LaLiga")).unwrap().coefficient, 0.5);
    }
}
