//! National-team ranking table.
//!
//! Coefficients come from the team's world ranking, bucketed into tiers, unless
//! the table carries an explicit coefficient for the team.

use serde::Deserialize;
use std::path::Path;

use super::{normalize_name, CoefficientProvider};
use crate::error::{InferenceError, Result};
use crate::models::TeamStrength;

/// (first rank, last rank, coefficient)
const RANK_TIERS: [(u32, u32, f64); 5] = [
    (1, 10, 1.5),
    (11, 30, 1.3),
    (31, 60, 1.2),
    (61, 100, 1.1),
    (101, 150, 1.05),
];

/// Names shorter than this never match by substring.
const MIN_PARTIAL_MATCH_LEN: usize = 3;

pub fn coefficient_for_rank(rank: u32) -> f64 {
    RANK_TIERS
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&rank))
        .map(|(_, _, c)| *c)
        .unwrap_or(1.0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default, alias = "coeff")]
    pub coefficient: Option<f64>,
}

impl RankingEntry {
    fn strength(&self) -> TeamStrength {
        let coefficient = self
            .coefficient
            .or_else(|| self.rank.map(coefficient_for_rank))
            .unwrap_or(1.0);
        TeamStrength {
            team_name: self.name.clone(),
            coefficient,
            rank: self.rank,
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RankingFile {
    teams: Vec<RankingEntry>,
}

#[derive(Debug, Clone)]
pub struct RankingTable {
    entries: Vec<RankingEntry>,
    /// normalized names, parallel to `entries`
    normalized: Vec<Vec<String>>,
}

impl RankingTable {
    pub fn new(entries: Vec<RankingEntry>) -> Self {
        let normalized = entries
            .iter()
            .map(|e| e.names().map(normalize_name).collect())
            .collect();
        RankingTable { entries, normalized }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: RankingFile = serde_json::from_str(json)
            .map_err(|e| InferenceError::Coefficients(format!("invalid ranking table: {}", e)))?;
        Ok(Self::new(file.teams))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::Coefficients(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, team_name: &str) -> Option<&RankingEntry> {
        let query = team_name.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(e) = self.entries.iter().find(|e| e.names().any(|n| n == query)) {
            return Some(e);
        }

        let query = normalize_name(query);
        let exact = self
            .normalized
            .iter()
            .position(|names| names.iter().any(|n| *n == query));
        if let Some(i) = exact {
            return Some(&self.entries[i]);
        }

        if query.len() < MIN_PARTIAL_MATCH_LEN {
            return None;
        }
        self.normalized
            .iter()
            .position(|names| {
                names.iter().any(|n| {
                    n.len() >= MIN_PARTIAL_MATCH_LEN && (n.contains(&query) || query.contains(n.as_str()))
                })
            })
            .map(|i| &self.entries[i])
    }
}

impl CoefficientProvider for RankingTable {
    fn lookup(&self, team_name: &str, _league: Option<&str>) -> Option<TeamStrength> {
        self.find(team_name).map(RankingEntry::strength)
    }

    fn name(&self) -> &str {
        "world-ranking"
    }
}
