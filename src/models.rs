use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{InferenceError, Result};

/// Label returned in place of a scoreline when no usable odds were supplied.
pub const NO_DATA_LABEL: &str = "Aucune donnée";

/// Number of scorelines reported in the ranked summary.
pub const TOP_SCORES: usize = 3;

// ── Scorelines ──

/// A candidate final result.
///
/// Numeric scores order by `(home, away)`; catch-all buckets sort after every
/// numeric score, by label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scoreline {
    Score { home: u32, away: u32 },
    /// Catch-all bucket ("Other", "Autre", or any label that is not `h-a`)
    Other(String),
}

/// Match outcome from the home team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Scoreline {
    pub fn new(home: u32, away: u32) -> Self {
        Scoreline::Score { home, away }
    }

    /// Parse `"<int>-<int>"` into a numeric score. Anything else is kept as an
    /// opaque bucket under its trimmed label.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some((h, a)) = trimmed.split_once('-') {
            if let (Some(home), Some(away)) = (parse_goals(h), parse_goals(a)) {
                return Scoreline::Score { home, away };
            }
        }
        Scoreline::Other(trimmed.to_string())
    }

    pub fn goals(&self) -> Option<(u32, u32)> {
        match self {
            Scoreline::Score { home, away } => Some((*home, *away)),
            Scoreline::Other(_) => None,
        }
    }

    /// Absolute goal difference, `None` for catch-all buckets.
    pub fn goal_difference(&self) -> Option<u32> {
        self.goals().map(|(h, a)| h.abs_diff(a))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.goals().map(|(h, a)| match h.cmp(&a) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        })
    }

}

/// Unsigned decimal goal count; signs and other characters are rejected.
fn parse_goals(text: &str) -> Option<u32> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoreline::Score { home, away } => write!(f, "{}-{}", home, away),
            Scoreline::Other(label) => write!(f, "{}", label),
        }
    }
}

impl From<&str> for Scoreline {
    fn from(text: &str) -> Self {
        Scoreline::parse(text)
    }
}

impl Serialize for Scoreline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Quotes ──

/// A validated bookmaker quote for one scoreline.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsQuote {
    pub scoreline: Scoreline,
    /// Decimal odds, always finite and > 1.0
    pub odds: f64,
}

impl OddsQuote {
    pub fn new(scoreline: Scoreline, odds: f64) -> Result<Self> {
        if !odds.is_finite() || odds <= 1.0 {
            return Err(InferenceError::InvalidOdds {
                scoreline: scoreline.to_string(),
                odds: Some(odds),
            });
        }
        Ok(OddsQuote { scoreline, odds })
    }

    /// Market implied probability before overround removal.
    pub fn implied_probability(&self) -> f64 {
        1.0 / self.odds
    }
}

/// One row as produced by the odds extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(alias = "scoreline_text", alias = "scoreline")]
    pub score: String,
    #[serde(default)]
    pub odds: Option<f64>,
}

impl RawQuote {
    pub fn into_quote(self) -> Result<OddsQuote> {
        let scoreline = Scoreline::parse(&self.score);
        match self.odds {
            Some(odds) => OddsQuote::new(scoreline, odds),
            None => Err(InferenceError::InvalidOdds {
                scoreline: scoreline.to_string(),
                odds: None,
            }),
        }
    }
}

/// Odds table as accepted on input: either extractor rows or a plain
/// `{"1-0": 6.5, ...}` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OddsTable {
    Rows(Vec<RawQuote>),
    Map(BTreeMap<String, Option<f64>>),
}

impl OddsTable {
    pub fn into_rows(self) -> Vec<RawQuote> {
        match self {
            OddsTable::Rows(rows) => rows,
            OddsTable::Map(map) => map
                .into_iter()
                .map(|(score, odds)| RawQuote { score, odds })
                .collect(),
        }
    }
}

// ── Distributions ──

/// Mapping from scoreline to mass. Depending on the stage this is either a
/// probability distribution (sums to 1) or an intermediate weight map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityDistribution(BTreeMap<Scoreline, f64>);

impl ProbabilityDistribution {
    pub fn new() -> Self {
        ProbabilityDistribution(BTreeMap::new())
    }

    pub fn insert(&mut self, scoreline: Scoreline, mass: f64) {
        self.0.insert(scoreline, mass);
    }

    pub fn get(&self, scoreline: &Scoreline) -> Option<f64> {
        self.0.get(scoreline).copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Scoreline, f64> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Apply `f(scoreline, mass)` to every entry.
    pub fn map_mass<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Scoreline, f64) -> f64,
    {
        self.0.iter().map(|(s, m)| (s.clone(), f(s, *m))).collect()
    }

    /// Rescale so that the masses sum to 1.
    pub fn normalized(&self) -> Result<Self> {
        let total = self.total();
        if self.is_empty() || !total.is_finite() || total <= 0.0 {
            return Err(InferenceError::EmptyDistribution);
        }
        Ok(self.map_mass(|_, m| m / total))
    }

    /// Highest-mass entry. Ties resolve to the smallest scoreline.
    pub fn top(&self) -> Option<(&Scoreline, f64)> {
        let mut best: Option<(&Scoreline, f64)> = None;
        for (s, m) in &self.0 {
            match best {
                Some((_, b)) if *m <= b => {}
                _ => best = Some((s, *m)),
            }
        }
        best
    }

    /// Entries by descending mass. Equal masses keep scoreline order, so the
    /// first entry always agrees with [`top`](Self::top).
    pub fn ranked(&self) -> Vec<(&Scoreline, f64)> {
        let mut entries: Vec<(&Scoreline, f64)> = self.0.iter().map(|(s, m)| (s, *m)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }

    /// Express as percentages rounded to two decimals.
    pub fn to_percentages(&self) -> Self {
        self.map_mass(|_, m| to_percentage(m))
    }
}

fn to_percentage(mass: f64) -> f64 {
    (mass * 100.0 * 100.0).round() / 100.0
}

impl FromIterator<(Scoreline, f64)> for ProbabilityDistribution {
    fn from_iter<I: IntoIterator<Item = (Scoreline, f64)>>(iter: I) -> Self {
        ProbabilityDistribution(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ProbabilityDistribution {
    type Item = (&'a Scoreline, &'a f64);
    type IntoIter = btree_map::Iter<'a, Scoreline, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ProbabilityDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (scoreline, mass) in &self.0 {
            map.serialize_entry(&scoreline.to_string(), mass)?;
        }
        map.end()
    }
}

/// One line of the ranked summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreProbability {
    pub score: Scoreline,
    /// Percentage rounded to two decimals
    pub probability: f64,
}

impl ScoreProbability {
    /// The `n` most probable scorelines of a normalized distribution.
    pub fn leaders(distribution: &ProbabilityDistribution, n: usize) -> Vec<ScoreProbability> {
        distribution
            .ranked()
            .into_iter()
            .take(n)
            .map(|(score, mass)| ScoreProbability {
                score: score.clone(),
                probability: to_percentage(mass),
            })
            .collect()
    }
}

// ── Context and results ──

/// Relative strength of a team. Unknown teams are neutral (coefficient 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    pub team_name: String,
    /// Strictly positive multiplier; 1.0 means no bias
    pub coefficient: f64,
    /// Ranking position, when the source has one
    pub rank: Option<u32>,
}

impl TeamStrength {
    pub fn neutral(team_name: &str) -> Self {
        TeamStrength {
            team_name: team_name.to_string(),
            coefficient: 1.0,
            rank: None,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.coefficient == 1.0 && self.rank.is_none()
    }
}

/// Win/draw/loss aggregation of a weight map, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    /// Share of numeric mass on home wins
    pub win_sum: f64,
    /// Share of numeric mass on away wins
    pub lose_sum: f64,
    /// Share of numeric mass on draws
    pub draw_sum: f64,
    /// Raw `|win - lose| / (win + lose)`
    pub asymmetry: f64,
    /// Asymmetry beyond the tolerance band, rescaled to [0, 1]
    pub balance_factor: f64,
    /// Multiplier applied to draw scorelines, in (0, 1]
    pub draw_penalty: f64,
}

/// Per-request information supplied alongside the odds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceContext {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub league: Option<String>,
    /// Enables strength-coefficient adjustment
    #[serde(default)]
    pub use_league_coeff: bool,
}

/// Output of one inference call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    /// `None` when there was no usable data
    #[serde(serialize_with = "serialize_most_probable")]
    pub most_probable_score: Option<Scoreline>,
    /// Percentages rounded to two decimals
    pub probabilities: ProbabilityDistribution,
    /// Most probable scorelines first; ties follow scoreline order
    pub top3: Vec<ScoreProbability>,
    pub confidence: f64,
    pub expected_differential: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<(TeamStrength, TeamStrength)>,
    /// Full-precision final distribution (sums to 1)
    #[serde(skip)]
    pub distribution: ProbabilityDistribution,
}

impl InferenceResult {
    /// Well-formed result returned when no valid quote survived validation.
    pub fn no_data(expected_differential: f64) -> Self {
        InferenceResult {
            most_probable_score: None,
            probabilities: ProbabilityDistribution::new(),
            top3: Vec::new(),
            confidence: 0.0,
            expected_differential,
            balance: None,
            strengths: None,
            distribution: ProbabilityDistribution::new(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.most_probable_score.is_none()
    }

    pub fn most_probable_label(&self) -> String {
        match &self.most_probable_score {
            Some(s) => s.to_string(),
            None => NO_DATA_LABEL.to_string(),
        }
    }
}

fn serialize_most_probable<S: Serializer>(
    value: &Option<Scoreline>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(s) => serializer.collect_str(s),
        None => serializer.serialize_str(NO_DATA_LABEL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_scorelines() {
        assert_eq!(Scoreline::parse("2-1"), Scoreline::new(2, 1));
        assert_eq!(Scoreline::parse(" 0 - 0 "), Scoreline::new(0, 0));
        assert_eq!(Scoreline::parse("10-3"), Scoreline::new(10, 3));
    }

    #[test]
    fn parse_falls_back_to_other_bucket() {
        assert_eq!(Scoreline::parse("Autre"), Scoreline::Other("Autre".into()));
        assert_eq!(Scoreline::parse("-1-0"), Scoreline::Other("-1-0".into()));
        assert_eq!(Scoreline::parse("2-x"), Scoreline::Other("2-x".into()));
        assert_eq!(Scoreline::parse("Other"), Scoreline::Other("Other".into()));
    }

    #[test]
    fn parse_rejects_signed_goal_counts() {
        assert_eq!(Scoreline::parse("+1-0"), Scoreline::Other("+1-0".into()));
        assert_eq!(Scoreline::parse("1-+0"), Scoreline::Other("1-+0".into()));
        assert_eq!(Scoreline::parse("1 - 0"), Scoreline::new(1, 0));
        assert_eq!(Scoreline::parse("1-"), Scoreline::Other("1-".into()));
    }

    #[test]
    fn outcome_and_goal_difference() {
        assert_eq!(Scoreline::new(3, 1).outcome(), Some(Outcome::HomeWin));
        assert_eq!(Scoreline::new(1, 1).outcome(), Some(Outcome::Draw));
        assert_eq!(Scoreline::new(0, 2).outcome(), Some(Outcome::AwayWin));
        assert_eq!(Scoreline::new(0, 2).goal_difference(), Some(2));
        assert_eq!(Scoreline::Other("Other".into()).outcome(), None);
    }

    #[test]
    fn numeric_scores_sort_before_other_buckets() {
        let mut v = vec![
            Scoreline::Other("Autre".into()),
            Scoreline::new(1, 0),
            Scoreline::new(0, 1),
            Scoreline::new(10, 0),
        ];
        v.sort();
        assert_eq!(v[0], Scoreline::new(0, 1));
        assert_eq!(v[1], Scoreline::new(1, 0));
        assert_eq!(v[2], Scoreline::new(10, 0));
        assert!(matches!(v[3], Scoreline::Other(_)));
    }

    #[test]
    fn quote_rejects_odds_at_or_below_one() {
        assert!(OddsQuote::new(Scoreline::new(1, 0), 1.0).is_err());
        assert!(OddsQuote::new(Scoreline::new(1, 0), -3.0).is_err());
        assert!(OddsQuote::new(Scoreline::new(1, 0), f64::NAN).is_err());
        assert!(OddsQuote::new(Scoreline::new(1, 0), 1.01).is_ok());
    }

    #[test]
    fn raw_quote_without_odds_is_invalid() {
        let raw = RawQuote { score: "1-1".into(), odds: None };
        assert_eq!(
            raw.into_quote(),
            Err(InferenceError::InvalidOdds { scoreline: "1-1".into(), odds: None })
        );
    }

    #[test]
    fn odds_table_accepts_rows_and_maps() {
        let rows: OddsTable =
            serde_json::from_str(r#"[{"score": "1-0", "odds": 2.0}, {"scoreline_text": "Autre", "odds": 9.5}]"#)
                .unwrap();
        assert_eq!(rows.into_rows().len(), 2);

        let map: OddsTable = serde_json::from_str(r#"{"0-0": 7.0, "2-1": null}"#).unwrap();
        let rows = map.into_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.score == "2-1" && r.odds.is_none()));
    }

    #[test]
    fn top_breaks_ties_on_smallest_scoreline() {
        let d: ProbabilityDistribution = vec![
            (Scoreline::new(1, 0), 0.4),
            (Scoreline::new(0, 1), 0.4),
            (Scoreline::new(0, 0), 0.2),
        ]
        .into_iter()
        .collect();
        let (s, m) = d.top().unwrap();
        assert_eq!(*s, Scoreline::new(0, 1));
        assert_eq!(m, 0.4);
    }

    #[test]
    fn ranked_orders_by_mass_then_scoreline() {
        let d: ProbabilityDistribution = vec![
            (Scoreline::new(2, 1), 0.1),
            (Scoreline::new(1, 0), 0.3),
            (Scoreline::new(0, 1), 0.3),
            (Scoreline::Other("Autre".into()), 0.2),
            (Scoreline::new(0, 0), 0.1),
        ]
        .into_iter()
        .collect();
        let ranked: Vec<String> = d.ranked().iter().map(|(s, _)| s.to_string()).collect();
        assert_eq!(ranked, ["0-1", "1-0", "Autre", "0-0", "2-1"]);
        assert_eq!(d.ranked()[0].0, d.top().unwrap().0);

        let leaders = ScoreProbability::leaders(&d, TOP_SCORES);
        assert_eq!(leaders.len(), 3);
        assert_eq!(leaders[2], ScoreProbability { score: Scoreline::Other("Autre".into()), probability: 20.0 });
        assert!(ScoreProbability::leaders(&ProbabilityDistribution::new(), TOP_SCORES).is_empty());
    }

    #[test]
    fn normalized_rejects_zero_mass() {
        let d: ProbabilityDistribution = vec![(Scoreline::new(1, 0), 0.0)].into_iter().collect();
        assert_eq!(d.normalized(), Err(InferenceError::EmptyDistribution));
        assert_eq!(ProbabilityDistribution::new().normalized(), Err(InferenceError::EmptyDistribution));
    }

    #[test]
    fn no_data_result_serializes_sentinel() {
        let json = serde_json::to_value(InferenceResult::no_data(2.0)).unwrap();
        assert_eq!(json["mostProbableScore"], NO_DATA_LABEL);
        assert_eq!(json["probabilities"], serde_json::json!({}));
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["top3"], serde_json::json!([]));
        assert!(json.get("balance").is_none());
    }
}
