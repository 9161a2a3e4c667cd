//! Core business logic modules

pub mod kelly;

// Re-export commonly used types
pub use kelly::{
    evaluate, evaluate_input, kelly_fraction, kelly_percentage, KellyCalculator, KellyInput,
    KellyResult, RiskBand,
};
