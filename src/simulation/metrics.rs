//! Population Metrics
//!
//! Mean, median, extrema and threshold counts over a set of balances.
//! Every statistic is `None` when there is no data. Balances that overflowed
//! to NaN or infinity are counted separately so that a non-finite statistic
//! is never mistaken for a missing one.

use super::strategy::Strategy;
use serde::{Deserialize, Serialize};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sorted_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    // total order: NaN sorts above +inf
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Element at index `n / 2` of the ascending sort
///
/// Not interpolated: for an even count this is the upper of the two middle
/// values. Used for the per-round time series.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_ascending(values);
    Some(sorted[sorted.len() / 2])
}

/// Element at index `n / 2` of the descending sort
///
/// For an even count this is the lower of the two middle values. Used for
/// final strategy summaries.
pub fn lower_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_ascending(values);
    let n = sorted.len();
    Some(sorted[n - 1 - n / 2])
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Number of NaN or infinite values
pub fn non_finite_count(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_finite()).count()
}

/// Thresholds used to count ruined and jackpot bettors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeThresholds {
    /// Balance strictly below this counts as ruin
    pub ruin: f64,
    /// Balance at or above this counts as a jackpot
    pub jackpot: f64,
}

impl Default for OutcomeThresholds {
    fn default() -> Self {
        Self {
            ruin: 1.0,
            jackpot: 10_000.0,
        }
    }
}

/// Final statistics for one strategy across the population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy_name: String,
    pub strategy: Strategy,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub ruin_count: usize,
    pub jackpot_count: usize,
    /// Bettors whose balance overflowed to NaN or infinity
    pub non_finite_count: usize,
}

impl StrategySummary {
    /// True when the population was empty
    pub fn is_empty(&self) -> bool {
        self.mean.is_none()
    }

    /// True when some balance overflowed, so the statistics may be NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.non_finite_count > 0
    }
}

/// Summarize terminal balances for a strategy
pub fn summarize(
    strategy: Strategy,
    balances: &[f64],
    thresholds: OutcomeThresholds,
) -> StrategySummary {
    StrategySummary {
        strategy_name: strategy.label(),
        strategy,
        mean: mean(balances),
        median: lower_median(balances),
        max: max(balances),
        min: min(balances),
        ruin_count: balances.iter().filter(|&&b| b < thresholds.ruin).count(),
        jackpot_count: balances.iter().filter(|&&b| b >= thresholds.jackpot).count(),
        non_finite_count: non_finite_count(balances),
    }
}
