use serde::{Deserialize, Serialize};

use crate::core::kelly::{KellyResult, RiskBand, DEFAULT_WIN_LOSS_RATIO, DEFAULT_WIN_RATE};
use crate::simulation::{
    BatchSummary, RoundSnapshot, SimulationConfig, SimulationResult, StrategySummary,
};

fn default_win_rate() -> f64 {
    DEFAULT_WIN_RATE
}

fn default_win_loss_ratio() -> f64 {
    DEFAULT_WIN_LOSS_RATIO
}

fn default_runs() -> usize {
    10
}

/// Kelly evaluation request (win rate in percent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyRequest {
    #[serde(default = "default_win_rate")]
    pub win_rate: f64,
    #[serde(default = "default_win_loss_ratio")]
    pub win_loss_ratio: f64,
}

impl Default for KellyRequest {
    fn default() -> Self {
        Self {
            win_rate: DEFAULT_WIN_RATE,
            win_loss_ratio: DEFAULT_WIN_LOSS_RATIO,
        }
    }
}

/// Kelly evaluation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyResponse {
    /// Win rate after clamping
    pub win_rate: f64,
    /// Win/loss ratio after clamping
    pub win_loss_ratio: f64,
    pub kelly_percentage: f64,
    pub band: RiskBand,
    pub headline: String,
    pub advice: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
}

impl From<KellyResult> for KellyResponse {
    fn from(result: KellyResult) -> Self {
        Self {
            win_rate: result.input.win_rate,
            win_loss_ratio: result.input.win_loss_ratio,
            kelly_percentage: result.kelly_percentage,
            band: result.band,
            headline: result.band.headline().to_string(),
            advice: result.band.advice().to_string(),
            suggestions: result
                .band
                .suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Simulation request: any config field may be omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulateRequest {
    #[serde(flatten)]
    pub config: SimulationConfig,
    /// Random seed; one is generated when omitted
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Simulation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateResponse {
    /// Seed actually used, for replaying the run
    pub seed: u64,
    pub kelly_fraction: f64,
    pub time_series: Vec<RoundSnapshot>,
    pub summaries: Vec<StrategySummary>,
}

impl SimulateResponse {
    pub fn new(seed: u64, kelly_fraction: f64, result: SimulationResult) -> Self {
        Self {
            seed,
            kelly_fraction,
            time_series: result.time_series,
            summaries: result.summaries,
        }
    }
}

/// Batch simulation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(flatten)]
    pub config: SimulationConfig,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_runs")]
    pub runs: usize,
}

/// Batch simulation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub base_seed: u64,
    pub runs: usize,
    pub aggregates: Vec<BatchSummary>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
