//! Fixed-fraction betting strategies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy identity, independent of its fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Kelly,
    Conservative,
    Aggressive,
}

impl StrategyKind {
    /// Fixed reporting order
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Kelly,
        StrategyKind::Conservative,
        StrategyKind::Aggressive,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Kelly => "Kelly",
            StrategyKind::Conservative => "Conservative",
            StrategyKind::Aggressive => "Aggressive",
        }
    }

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        match self {
            StrategyKind::Kelly => 0,
            StrategyKind::Conservative => 1,
            StrategyKind::Aggressive => 2,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A betting strategy that wagers a constant fraction of the current balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fraction", rename_all = "snake_case")]
pub enum Strategy {
    Kelly(f64),
    Conservative(f64),
    Aggressive(f64),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Kelly(_) => StrategyKind::Kelly,
            Strategy::Conservative(_) => StrategyKind::Conservative,
            Strategy::Aggressive(_) => StrategyKind::Aggressive,
        }
    }

    pub fn fraction(&self) -> f64 {
        match *self {
            Strategy::Kelly(f) | Strategy::Conservative(f) | Strategy::Aggressive(f) => f,
        }
    }

    /// Display label including the fraction, e.g. "Kelly (20%)"
    pub fn label(&self) -> String {
        format!("{} ({:.0}%)", self.kind().name(), self.fraction() * 100.0)
    }

    /// Apply one bet to `balance`
    ///
    /// A win pays `stake * payout_ratio`, a loss forfeits the stake. The
    /// stake is always `balance * fraction`, so a negative balance keeps
    /// compounding.
    pub fn apply(&self, balance: f64, won: bool, payout_ratio: f64) -> f64 {
        let stake = balance * self.fraction();
        if won {
            balance + stake * payout_ratio
        } else {
            balance - stake
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
