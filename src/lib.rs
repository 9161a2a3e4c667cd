//! Kelly Sim - Kelly criterion position sizing and strategy simulation
//!
//! This library provides:
//! - Kelly fraction evaluation with advisory risk bands
//! - Monte Carlo comparison of Kelly, conservative and aggressive
//!   fixed-fraction betting strategies across a population of bettors
//! - Parallel batch runs over many seeds
//!
//! # Example
//!
//! ```
//! use kelly_sim::core::kelly::evaluate;
//! use kelly_sim::simulation::{SimulationConfig, StrategySimulator};
//!
//! let result = evaluate(60.0, 1.0);
//! println!("Kelly: {:.2}% ({:?})", result.kelly_percentage, result.band);
//!
//! let simulator = StrategySimulator::new(SimulationConfig::default());
//! let run = simulator.run_seeded(42);
//! assert_eq!(run.time_series.len(), 101);
//! ```

pub mod core;
pub mod models;
pub mod simulation;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod error;

// Re-export commonly used types
pub use crate::core::{evaluate, KellyCalculator, KellyInput, KellyResult, RiskBand};
pub use simulation::{
    run_batch, DrawMode, RoundSnapshot, SimulationConfig, SimulationResult, StrategySimulator,
    StrategySummary,
};
