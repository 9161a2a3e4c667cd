//! Kelly Criterion Evaluator
//!
//! Optimal position sizing for a binary bet from a win rate and a
//! win/loss payoff ratio.
//!
//! The Kelly criterion formula:
//!     f* = (b*p - q) / b
//!
//! Where:
//!     f* = fraction of bankroll to bet
//!     b = win/loss ratio (amount won per unit lost)
//!     p = probability of winning
//!     q = 1 - p (probability of losing)
//!
//! The result is reported in percentage points and is never clamped to a
//! valid betting range: a negative value means "don't bet".

use serde::{Deserialize, Serialize};

/// Default win rate shown to a fresh calculator (percent)
pub const DEFAULT_WIN_RATE: f64 = 50.0;

/// Default win/loss ratio shown to a fresh calculator
pub const DEFAULT_WIN_LOSS_RATIO: f64 = 1.5;

/// Smallest accepted win/loss ratio
pub const MIN_WIN_LOSS_RATIO: f64 = 0.1;

/// Percentage above which a position is flagged as aggressive
pub const AGGRESSIVE_THRESHOLD_PCT: f64 = 25.0;

/// Calculate the Kelly fraction as a ratio
///
/// # Arguments
/// * `probability` - Probability of winning (0-1)
/// * `win_loss_ratio` - Payoff ratio `b` (must be > 0)
///
/// # Returns
/// Kelly fraction (negative when the bet has no edge)
///
/// # Examples
/// ```
/// use kelly_sim::core::kelly::kelly_fraction;
/// let f = kelly_fraction(0.6, 1.0);
/// assert!((f - 0.2).abs() < 1e-9);
/// ```
pub fn kelly_fraction(probability: f64, win_loss_ratio: f64) -> f64 {
    let q = 1.0 - probability;
    (win_loss_ratio * probability - q) / win_loss_ratio
}

/// Calculate the Kelly fraction in percentage points
pub fn kelly_percentage(probability: f64, win_loss_ratio: f64) -> f64 {
    kelly_fraction(probability, win_loss_ratio) * 100.0
}

/// Advisory risk band for a Kelly percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    /// No edge: the formula says not to bet
    Negative,
    /// 0% to 25% inclusive
    Safe,
    /// Above 25%
    Aggressive,
}

impl RiskBand {
    /// Classify a Kelly percentage. Both 0 and 25 fall in `Safe`.
    pub fn from_percentage(pct: f64) -> Self {
        if pct < 0.0 {
            RiskBand::Negative
        } else if pct > AGGRESSIVE_THRESHOLD_PCT {
            RiskBand::Aggressive
        } else {
            RiskBand::Safe
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskBand::Negative => "Do not invest",
            RiskBand::Safe | RiskBand::Aggressive => "Suggested position size",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            RiskBand::Negative => {
                "The Kelly result is negative: with this win rate and win/loss ratio \
                 the position loses money over the long run."
            }
            RiskBand::Safe => "Controlled risk, suitable for long-term positions.",
            RiskBand::Aggressive => {
                "High risk: reduce the position or improve the win rate / win-loss ratio."
            }
        }
    }

    /// Improvement suggestions (only given when there is no edge)
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            RiskBand::Negative => &[
                "Raise the win rate (better analysis)",
                "Improve the win/loss ratio (cut losses, let profits run)",
                "Look for better opportunities",
                "Paper-trade the strategy first",
            ],
            _ => &[],
        }
    }
}

/// Normalized evaluator input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyInput {
    /// Win rate in percent, within [0, 100]
    pub win_rate: f64,
    /// Win/loss ratio, at least `MIN_WIN_LOSS_RATIO`
    pub win_loss_ratio: f64,
}

impl KellyInput {
    /// Build an input, clamping both values into their valid range
    pub fn new(win_rate: f64, win_loss_ratio: f64) -> Self {
        Self {
            win_rate: clamp_win_rate(win_rate),
            win_loss_ratio: clamp_win_loss_ratio(win_loss_ratio),
        }
    }

    /// Win probability as a ratio (0-1)
    pub fn probability(&self) -> f64 {
        self.win_rate / 100.0
    }
}

impl Default for KellyInput {
    fn default() -> Self {
        Self::new(DEFAULT_WIN_RATE, DEFAULT_WIN_LOSS_RATIO)
    }
}

fn clamp_win_rate(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn clamp_win_loss_ratio(value: f64) -> f64 {
    // f64::max ignores NaN, so NaN lands on the floor
    value.max(MIN_WIN_LOSS_RATIO)
}

/// Evaluation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyResult {
    pub input: KellyInput,
    /// Expected edge per unit staked: b*p - q
    pub edge: f64,
    /// Full Kelly in percentage points (unclamped)
    pub kelly_percentage: f64,
    pub band: RiskBand,
}

impl KellyResult {
    /// Kelly fraction as a ratio
    pub fn fraction(&self) -> f64 {
        self.kelly_percentage / 100.0
    }

    pub fn should_bet(&self) -> bool {
        self.band != RiskBand::Negative
    }
}

/// Evaluate the Kelly criterion for a win rate (percent) and win/loss ratio.
///
/// Out-of-range inputs are clamped, never rejected.
///
/// # Examples
/// ```
/// use kelly_sim::core::kelly::{evaluate, RiskBand};
/// let result = evaluate(60.0, 1.0);
/// assert!((result.kelly_percentage - 20.0).abs() < 1e-9);
/// assert_eq!(result.band, RiskBand::Safe);
/// ```
pub fn evaluate(win_rate: f64, win_loss_ratio: f64) -> KellyResult {
    evaluate_input(KellyInput::new(win_rate, win_loss_ratio))
}

/// Evaluate an already-normalized input
pub fn evaluate_input(input: KellyInput) -> KellyResult {
    let p = input.probability();
    let b = input.win_loss_ratio;
    let pct = kelly_percentage(p, b);

    KellyResult {
        input,
        edge: b * p - (1.0 - p),
        kelly_percentage: pct,
        band: RiskBand::from_percentage(pct),
    }
}

/// Interactive Kelly calculator
///
/// Holds the current inputs and the last evaluated result so a front end can
/// show "not yet calculated" vs a result, and reset back to defaults.
#[derive(Debug, Clone)]
pub struct KellyCalculator {
    input: KellyInput,
    last: Option<KellyResult>,
}

impl KellyCalculator {
    pub fn new(win_rate: f64, win_loss_ratio: f64) -> Self {
        Self {
            input: KellyInput::new(win_rate, win_loss_ratio),
            last: None,
        }
    }

    pub fn input(&self) -> KellyInput {
        self.input
    }

    /// Set the win rate (percent), clamped to [0, 100]
    pub fn set_win_rate(&mut self, win_rate: f64) {
        self.input.win_rate = clamp_win_rate(win_rate);
    }

    /// Set the win/loss ratio, floored at `MIN_WIN_LOSS_RATIO`
    pub fn set_win_loss_ratio(&mut self, ratio: f64) {
        self.input.win_loss_ratio = clamp_win_loss_ratio(ratio);
    }

    /// Evaluate the current inputs and remember the result
    pub fn calculate(&mut self) -> KellyResult {
        let result = evaluate_input(self.input);
        self.last = Some(result);
        result
    }

    /// Last calculated result, if any
    pub fn last_result(&self) -> Option<&KellyResult> {
        self.last.as_ref()
    }

    pub fn is_calculated(&self) -> bool {
        self.last.is_some()
    }

    /// Restore default inputs and clear the last result
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_WIN_RATE, DEFAULT_WIN_LOSS_RATIO)
    }
}
