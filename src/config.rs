use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::coefficients::standings::{CoefficientCurve, MAX_COEFFICIENT, MIN_COEFFICIENT};
use crate::models::InferenceContext;
use crate::store::DEFAULT_EXPECTED_DIFFERENTIAL;

/// Tunable constants of the inference pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gaussian kernel bandwidth: weight = exp(-bandwidth * (diff - target)^2)
    pub gaussian_bandwidth: f64,
    /// Expected differentials above this are shifted by `damping_shift`
    pub damping_threshold: f64,
    pub damping_shift: f64,
    /// Win/lose asymmetry tolerated before draws are penalised
    pub balance_tolerance: f64,
    /// Draw penalty = 1 - slope * balance_factor ...
    pub draw_penalty_slope: f64,
    /// ... never below this floor
    pub draw_penalty_floor: f64,
    /// Multiplier slope per unit of ln(home_coeff / away_coeff)
    pub strength_sensitivity: f64,
    pub strength_min_multiplier: f64,
    pub strength_max_multiplier: f64,
    /// Draws with at least this many goals per side get `mid_draw_multiplier`
    pub mid_draw_goals: u32,
    pub mid_draw_multiplier: f64,
    /// Draws with at least this many goals per side get `high_draw_multiplier`
    pub high_draw_goals: u32,
    pub high_draw_multiplier: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            gaussian_bandwidth: 0.4,
            damping_threshold: 2.0,
            damping_shift: 1.0,
            balance_tolerance: 0.35,
            draw_penalty_slope: 0.6,
            draw_penalty_floor: 0.5,
            strength_sensitivity: 1.0,
            strength_min_multiplier: 0.2,
            strength_max_multiplier: 5.0,
            mid_draw_goals: 2,
            mid_draw_multiplier: 0.95,
            high_draw_goals: 3,
            high_draw_multiplier: 0.75,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.gaussian_bandwidth > 0.0 && self.gaussian_bandwidth.is_finite()) {
            anyhow::bail!("gaussian_bandwidth must be positive");
        }
        if self.damping_shift < 0.0 {
            anyhow::bail!("damping_shift must not be negative");
        }
        if !(0.0..1.0).contains(&self.balance_tolerance) {
            anyhow::bail!("balance_tolerance must be in [0.0, 1.0)");
        }
        if self.draw_penalty_slope < 0.0 {
            anyhow::bail!("draw_penalty_slope must not be negative");
        }
        if !(self.draw_penalty_floor > 0.0 && self.draw_penalty_floor <= 1.0) {
            anyhow::bail!("draw_penalty_floor must be in (0.0, 1.0]");
        }
        if self.strength_sensitivity < 0.0 {
            anyhow::bail!("strength_sensitivity must not be negative");
        }
        if !(self.strength_min_multiplier > 0.0
            && self.strength_min_multiplier <= 1.0
            && self.strength_max_multiplier >= 1.0)
        {
            anyhow::bail!("strength multipliers must satisfy 0 < min <= 1 <= max");
        }
        for (name, m) in [
            ("mid_draw_multiplier", self.mid_draw_multiplier),
            ("high_draw_multiplier", self.high_draw_multiplier),
        ] {
            if !(m > 0.0 && m <= 1.0) {
                anyhow::bail!("{} must be in (0.0, 1.0]", name);
            }
        }
        if self.mid_draw_goals > self.high_draw_goals {
            anyhow::bail!("mid_draw_goals must not exceed high_draw_goals");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StandingsMode {
    Linear,
    Exponential,
}

impl From<StandingsMode> for CoefficientCurve {
    fn from(mode: StandingsMode) -> Self {
        match mode {
            StandingsMode::Linear => CoefficientCurve::Linear,
            StandingsMode::Exponential => CoefficientCurve::Exponential { exponent: 2.0 },
        }
    }
}

/// Correct-score odds to scoreline probabilities
#[derive(Parser, Debug, Clone)]
#[command(name = "scoreline-oracle", version, about)]
pub struct Config {
    /// JSON odds table (`[{"score": "1-0", "odds": 6.5}, ...]` or `{"1-0": 6.5}`); `-` reads stdin
    #[arg(long, env = "ODDS_FILE", default_value = "-")]
    pub odds_file: String,

    /// Home team name
    #[arg(long, env = "HOME_TEAM")]
    pub home_team: Option<String>,

    /// Away team name
    #[arg(long, env = "AWAY_TEAM")]
    pub away_team: Option<String>,

    /// League identifier (used to select standings)
    #[arg(long, env = "LEAGUE")]
    pub league: Option<String>,

    /// Bias the distribution with team-strength coefficients
    #[arg(long, env = "USE_LEAGUE_COEFF", default_value = "false")]
    pub use_league_coeff: bool,

    /// Current expected absolute goal difference
    #[arg(long, env = "EXPECTED_DIFFERENTIAL", default_value_t = DEFAULT_EXPECTED_DIFFERENTIAL)]
    pub expected_differential: f64,

    /// National-team ranking table (JSON)
    #[arg(long, env = "RANKINGS_FILE")]
    pub rankings_file: Option<String>,

    /// League standings table (JSON)
    #[arg(long, env = "STANDINGS_FILE")]
    pub standings_file: Option<String>,

    /// Position-to-coefficient curve for league standings
    #[arg(long, env = "STANDINGS_MODE", value_enum, default_value = "linear")]
    pub standings_mode: StandingsMode,

    /// Coefficient of the last side in a league table
    #[arg(long, env = "STANDINGS_MIN_COEFF", default_value_t = MIN_COEFFICIENT)]
    pub standings_min_coeff: f64,

    /// Coefficient of the league leader
    #[arg(long, env = "STANDINGS_MAX_COEFF", default_value_t = MAX_COEFFICIENT)]
    pub standings_max_coeff: f64,

    /// Gaussian kernel bandwidth
    #[arg(long, env = "GAUSSIAN_BANDWIDTH", default_value = "0.4")]
    pub gaussian_bandwidth: f64,

    /// Expected differentials above this are shifted by DAMPING_SHIFT
    #[arg(long, env = "DAMPING_THRESHOLD", default_value = "2.0")]
    pub damping_threshold: f64,

    /// Goals added to the kernel centre above DAMPING_THRESHOLD
    #[arg(long, env = "DAMPING_SHIFT", default_value = "1.0")]
    pub damping_shift: f64,

    /// Win/lose asymmetry tolerated before draws are penalised
    #[arg(long, env = "BALANCE_TOLERANCE", default_value = "0.35")]
    pub balance_tolerance: f64,

    /// Draw penalty slope per unit of balance factor
    #[arg(long, env = "DRAW_PENALTY_SLOPE", default_value = "0.6")]
    pub draw_penalty_slope: f64,

    /// Lowest draw penalty multiplier
    #[arg(long, env = "DRAW_PENALTY_FLOOR", default_value = "0.5")]
    pub draw_penalty_floor: f64,

    /// Strength multiplier slope per unit of log coefficient ratio
    #[arg(long, env = "STRENGTH_SENSITIVITY", default_value = "1.0")]
    pub strength_sensitivity: f64,

    /// Lower clamp of the strength multiplier
    #[arg(long, env = "STRENGTH_MIN_MULTIPLIER", default_value = "0.2")]
    pub strength_min_multiplier: f64,

    /// Upper clamp of the strength multiplier
    #[arg(long, env = "STRENGTH_MAX_MULTIPLIER", default_value = "5.0")]
    pub strength_max_multiplier: f64,

    /// Goals per side from which a draw counts as mid-scoring (2-2)
    #[arg(long, env = "MID_DRAW_GOALS", default_value = "2")]
    pub mid_draw_goals: u32,

    /// Multiplier for mid-scoring draws
    #[arg(long, env = "MID_DRAW_MULTIPLIER", default_value = "0.95")]
    pub mid_draw_multiplier: f64,

    /// Goals per side from which a draw counts as high-scoring (3-3 and up)
    #[arg(long, env = "HIGH_DRAW_GOALS", default_value = "3")]
    pub high_draw_goals: u32,

    /// Multiplier for high-scoring draws
    #[arg(long, env = "HIGH_DRAW_MULTIPLIER", default_value = "0.75")]
    pub high_draw_multiplier: f64,

    /// Include the win/draw/loss balance summary in the output
    #[arg(long, env = "SHOW_BALANCE", default_value = "false")]
    pub show_balance: bool,

    /// Real final score ("h-a") used to update the expected differential after inference
    #[arg(long, env = "SETTLE_WITH")]
    pub settle_with: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.expected_differential >= 0.0 && self.expected_differential.is_finite()) {
            anyhow::bail!("expected_differential must be a non-negative number");
        }
        if !(self.standings_min_coeff > 0.0 && self.standings_min_coeff <= self.standings_max_coeff) {
            anyhow::bail!("standings coefficients must satisfy 0 < min <= max");
        }
        if self.use_league_coeff && self.rankings_file.is_none() && self.standings_file.is_none() {
            anyhow::bail!(
                "USE_LEAGUE_COEFF requires RANKINGS_FILE or STANDINGS_FILE to look coefficients up"
            );
        }
        self.engine_config().validate()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            gaussian_bandwidth: self.gaussian_bandwidth,
            damping_threshold: self.damping_threshold,
            damping_shift: self.damping_shift,
            balance_tolerance: self.balance_tolerance,
            draw_penalty_slope: self.draw_penalty_slope,
            draw_penalty_floor: self.draw_penalty_floor,
            strength_sensitivity: self.strength_sensitivity,
            strength_min_multiplier: self.strength_min_multiplier,
            strength_max_multiplier: self.strength_max_multiplier,
            mid_draw_goals: self.mid_draw_goals,
            mid_draw_multiplier: self.mid_draw_multiplier,
            high_draw_goals: self.high_draw_goals,
            high_draw_multiplier: self.high_draw_multiplier,
        }
    }

    pub fn context(&self) -> InferenceContext {
        InferenceContext {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            league: self.league.clone(),
            use_league_coeff: self.use_league_coeff,
        }
    }
}
