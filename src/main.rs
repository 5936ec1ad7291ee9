use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;
use tracing::{info, warn};

use scoreline_oracle::coefficients::{CoefficientChain, LeagueStandings, RankingTable};
use scoreline_oracle::config::Config;
use scoreline_oracle::models::{InferenceResult, OddsTable, Scoreline};
use scoreline_oracle::store::{DifferentialLearner, ExpectedDifferentialStore, LearningOutcome};
use scoreline_oracle::InferenceEngine;

/// Printed to stdout. `settlement.current` is the expected differential to
/// pass back as EXPECTED_DIFFERENTIAL on the next run.
#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    result: InferenceResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    settlement: Option<LearningOutcome>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the JSON result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let odds_json = read_input(&config.odds_file)?;
    let table: OddsTable =
        serde_json::from_str(&odds_json).context("odds input is not a valid odds table")?;
    let rows = table.into_rows();
    info!("Loaded {} odds row(s) from {}", rows.len(), config.odds_file);

    let mut coefficients = CoefficientChain::default();
    if let Some(path) = &config.rankings_file {
        let table = RankingTable::from_path(path)?;
        if table.is_empty() {
            warn!("Ranking table {} has no teams", path);
        }
        info!("Ranking table loaded: {} teams", table.len());
        coefficients.push(Arc::new(table));
    }
    if let Some(path) = &config.standings_file {
        let standings = LeagueStandings::from_path(path, config.standings_mode.into())?
            .with_bounds(config.standings_min_coeff, config.standings_max_coeff);
        info!("League standings loaded from {}", path);
        coefficients.push(Arc::new(standings));
    }
    info!("{} coefficient source(s) ready", coefficients.len());

    let store = ExpectedDifferentialStore::new(config.expected_differential);
    let engine = InferenceEngine::new(config.engine_config(), store.clone())
        .with_coefficients(coefficients);

    let mut result = engine.infer_rows(rows, &config.context())?;
    if !config.show_balance {
        result.balance = None;
    }

    let settlement = match (&config.settle_with, &result.most_probable_score) {
        (Some(real), Some(predicted)) => {
            let outcome =
                DifferentialLearner::default().learn(&store, predicted, &Scoreline::parse(real))?;
            info!(
                "Next expected differential: {:.4} (adjustment {:+.4})",
                outcome.current, outcome.adjustment
            );
            Some(outcome)
        }
        (Some(_), None) => {
            warn!("Nothing to settle: no prediction was made");
            None
        }
        (None, _) => None,
    };

    let report = Report { result, settlement };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read odds from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
    }
}
