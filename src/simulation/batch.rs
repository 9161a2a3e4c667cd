//! Batch Runs
//!
//! Repeat a simulation across many seeds in parallel and aggregate the
//! final summaries. Runs are independent, so each one gets its own
//! generator seeded from `base_seed + run index`.

use super::metrics::{mean, StrategySummary};
use super::simulator::{SimulationConfig, StrategySimulator};
use super::strategy::{Strategy, StrategyKind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Aggregate of one strategy's summaries across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub strategy_name: String,
    pub strategy: Strategy,
    pub runs: usize,
    /// Mean of the per-run final means
    pub mean_of_means: Option<f64>,
    /// Mean of the per-run final medians
    pub mean_of_medians: Option<f64>,
    /// Lowest final balance seen in any run
    pub worst: Option<f64>,
    /// Highest final balance seen in any run
    pub best: Option<f64>,
    pub total_ruin: usize,
    pub total_jackpot: usize,
    /// Overflowed balances across runs; non-zero means the statistics above
    /// may be NaN or infinite
    pub total_non_finite: usize,
}

/// Per-run summaries plus aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub base_seed: u64,
    /// `runs[i]` holds the summaries of the run seeded with `base_seed + i`
    pub runs: Vec<Vec<StrategySummary>>,
    pub aggregates: Vec<BatchSummary>,
}

/// Run `runs` simulations in parallel
pub fn run_batch(config: &SimulationConfig, base_seed: u64, runs: usize) -> BatchResult {
    run_batch_with_progress(config, base_seed, runs, || {})
}

/// Like `run_batch`, calling `on_run_done` after each completed run
pub fn run_batch_with_progress<F>(
    config: &SimulationConfig,
    base_seed: u64,
    runs: usize,
    on_run_done: F,
) -> BatchResult
where
    F: Fn() + Sync,
{
    let simulator = StrategySimulator::new(config.clone());

    let per_run: Vec<Vec<StrategySummary>> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let result = simulator.run_seeded(base_seed.wrapping_add(i as u64));
            on_run_done();
            result.summaries
        })
        .collect();

    let aggregates = simulator
        .strategies()
        .iter()
        .map(|strategy| aggregate(*strategy, &per_run))
        .collect();

    info!(runs, base_seed, "Batch complete");

    BatchResult {
        base_seed,
        runs: per_run,
        aggregates,
    }
}

fn aggregate(strategy: Strategy, per_run: &[Vec<StrategySummary>]) -> BatchSummary {
    let kind: StrategyKind = strategy.kind();
    let summaries: Vec<&StrategySummary> = per_run
        .iter()
        .filter_map(|run| run.iter().find(|s| s.strategy.kind() == kind))
        .collect();

    let means: Vec<f64> = summaries.iter().filter_map(|s| s.mean).collect();
    let medians: Vec<f64> = summaries.iter().filter_map(|s| s.median).collect();

    BatchSummary {
        strategy_name: strategy.label(),
        strategy,
        runs: summaries.len(),
        mean_of_means: mean(&means),
        mean_of_medians: mean(&medians),
        worst: summaries.iter().filter_map(|s| s.min).reduce(f64::min),
        best: summaries.iter().filter_map(|s| s.max).reduce(f64::max),
        total_ruin: summaries.iter().map(|s| s.ruin_count).sum(),
        total_jackpot: summaries.iter().map(|s| s.jackpot_count).sum(),
        total_non_finite: summaries.iter().map(|s| s.non_finite_count).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            population_size: 10,
            round_count: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_matches_individual_runs() {
        let config = small_config();
        let batch = run_batch(&config, 100, 4);

        let sim = StrategySimulator::new(config);
        for (i, run) in batch.runs.iter().enumerate() {
            assert_eq!(run, &sim.run_seeded(100 + i as u64).summaries);
        }
    }

    #[test]
    fn test_batch_is_deterministic() {
        let config = small_config();
        assert_eq!(run_batch(&config, 7, 8), run_batch(&config, 7, 8));
    }

    #[test]
    fn test_batch_aggregates() {
        let batch = run_batch(&small_config(), 1, 5);
        assert_eq!(batch.aggregates.len(), 3);

        for (idx, agg) in batch.aggregates.iter().enumerate() {
            assert_eq!(agg.runs, 5);
            let ruin: usize = batch.runs.iter().map(|r| r[idx].ruin_count).sum();
            assert_eq!(agg.total_ruin, ruin);
            assert!(agg.best.unwrap() >= agg.worst.unwrap());
        }
        assert_eq!(batch.aggregates[0].strategy.kind(), StrategyKind::Kelly);
    }

    #[test]
    fn test_batch_progress_callback() {
        let done = AtomicUsize::new(0);
        run_batch_with_progress(&small_config(), 0, 6, || {
            done.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(done.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_batch_counts_overflowed_balances() {
        let config = SimulationConfig {
            aggressive_fraction: 2000.0,
            round_count: 100,
            ..small_config()
        };
        let batch = run_batch(&config, 1, 3);

        assert_eq!(batch.aggregates[0].total_non_finite, 0);
        assert_eq!(batch.aggregates[1].total_non_finite, 0);
        // magnitude grows at least 1999x per round, so all 10 bettors overflow in every run
        assert_eq!(batch.aggregates[2].total_non_finite, 30);
    }

    #[test]
    fn test_empty_batch() {
        let batch = run_batch(&small_config(), 0, 0);
        assert!(batch.runs.is_empty());
        assert!(batch.aggregates.iter().all(|a| a.runs == 0 && a.mean_of_means.is_none()));
    }
}
