//! Monte Carlo simulation of competing fixed-fraction betting strategies

pub mod batch;
pub mod metrics;
pub mod simulator;
pub mod strategy;

pub use batch::{run_batch, run_batch_with_progress, BatchResult, BatchSummary};
pub use metrics::{OutcomeThresholds, StrategySummary};
pub use simulator::{
    Bettor, DrawMode, RoundSnapshot, SimulationConfig, SimulationResult, StrategySimulator,
};
pub use strategy::{Strategy, StrategyKind};
