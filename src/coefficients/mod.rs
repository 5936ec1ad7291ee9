pub mod ranking;
pub mod standings;

pub use ranking::RankingTable;
pub use standings::{CoefficientCurve, LeagueStandings};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::TeamStrength;

/// Source of team-strength coefficients.
pub trait CoefficientProvider: Send + Sync {
    /// Strength of `team_name`, or `None` if this source does not know it.
    fn lookup(&self, team_name: &str, league: Option<&str>) -> Option<TeamStrength>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Providers queried in order; the first one that knows a team wins.
#[derive(Clone, Default)]
pub struct CoefficientChain {
    providers: Vec<Arc<dyn CoefficientProvider>>,
}

impl CoefficientChain {
    pub fn new(providers: Vec<Arc<dyn CoefficientProvider>>) -> Self {
        CoefficientChain { providers }
    }

    pub fn push(&mut self, provider: Arc<dyn CoefficientProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Strength of `team_name`; neutral when no provider knows the team.
    pub fn strength_of(&self, team_name: &str, league: Option<&str>) -> TeamStrength {
        for provider in &self.providers {
            if let Some(strength) = provider.lookup(team_name, league) {
                if strength.coefficient.is_finite() && strength.coefficient > 0.0 {
                    debug!(
                        "{}: {} → coefficient {:.4} (rank {:?})",
                        provider.name(),
                        team_name,
                        strength.coefficient,
                        strength.rank
                    );
                    return strength;
                }
                warn!(
                    "{} returned unusable coefficient {} for '{}'",
                    provider.name(),
                    strength.coefficient,
                    team_name
                );
            }
        }
        warn!("⚠️ No coefficient for '{}', using neutral 1.0", team_name);
        TeamStrength::neutral(team_name)
    }
}

/// Lowercase, fold common Latin accents and collapse punctuation to single
/// spaces. "Côte d'Ivoire" → "cote d ivoire".
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect::<String>()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ı' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' | 'ş' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        'ł' => 'l',
        'ř' => 'r',
        'ğ' => 'g',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        team: &'static str,
        coefficient: f64,
    }

    impl CoefficientProvider for Fixed {
        fn lookup(&self, team_name: &str, _league: Option<&str>) -> Option<TeamStrength> {
            (team_name == self.team).then(|| TeamStrength {
                team_name: team_name.to_string(),
                coefficient: self.coefficient,
                rank: Some(1),
            })
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn normalize_folds_case_accents_and_punctuation() {
        assert_eq!(normalize_name("Côte d'Ivoire"), "cote d ivoire");
        assert_eq!(normalize_name("  Atlético   Madrid "), "atletico madrid");
    }

    #[test]
    fn empty_chain_is_neutral() {
        let chain = CoefficientChain::default();
        let s = chain.strength_of("Nowhere FC", None);
        assert!(s.is_neutral());
        assert_eq!(s.team_name, "Nowhere FC");
        assert!(chain.is_empty());
    }

    #[test]
    fn first_provider_that_knows_the_team_wins() {
        let chain = CoefficientChain::new(vec![
            Arc::new(Fixed { name: "a", team: "France", coefficient: 1.5 }),
            Arc::new(Fixed { name: "b", team: "France", coefficient: 1.1 }),
            Arc::new(Fixed { name: "c", team: "Malta", coefficient: 1.05 }),
        ]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.strength_of("France", None).coefficient, 1.5);
        assert_eq!(chain.strength_of("Malta", None).coefficient, 1.05);
        assert!(chain.strength_of("Andorra", None).is_neutral());
    }

    #[test]
    fn unusable_coefficients_fall_through() {
        let chain = CoefficientChain::new(vec![
            Arc::new(Fixed { name: "broken", team: "Italy", coefficient: 0.0 }),
            Arc::new(Fixed { name: "ok", team: "Italy", coefficient: 1.3 }),
        ]);
        assert_eq!(chain.strength_of("Italy", None).coefficient, 1.3);
    }
}
