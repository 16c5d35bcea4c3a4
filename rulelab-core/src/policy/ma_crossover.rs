//! Moving average crossover policy — golden cross and death cross detection.
//!
//! A golden cross (fast SMA crosses above slow) opens a long. A death cross
//! either flips short (when shorting is allowed) or closes an open long.

use crate::domain::{Bar, OrderIntent, Position};
use crate::indicators::Sma;

use super::DecisionPolicy;

/// Moving average crossover policy.
///
/// A crossover is detected by comparing the sign of (fast − slow) on the
/// current bar against the previous bar. Both averages advance every bar,
/// including bars where no intent fires.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast: Sma,
    slow: Sma,
    allow_short: bool,
    prev_diff: Option<f64>,
}

impl MaCrossover {
    pub fn new(fast_window: usize, slow_window: usize, allow_short: bool) -> Self {
        assert!(fast_window >= 1, "fast_window must be >= 1");
        assert!(
            slow_window > fast_window,
            "slow_window must be > fast_window"
        );
        Self {
            fast: Sma::new(fast_window),
            slow: Sma::new(slow_window),
            allow_short,
            prev_diff: None,
        }
    }
}

impl DecisionPolicy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn decide(&mut self, bar: &Bar, position: &Position) -> Vec<OrderIntent> {
        let fast = self.fast.update(bar.close);
        let slow = self.slow.update(bar.close);

        let (fast, slow) = match (fast, slow) {
            (Some(f), Some(s)) => (f, s),
            // Still warming up: no crossover can be defined yet.
            _ => return Vec::new(),
        };

        let diff = fast - slow;
        let prev_diff = self.prev_diff.replace(diff);

        let prev_diff = match prev_diff {
            Some(d) => d,
            // First bar with both averages defined: nothing to compare against.
            None => return Vec::new(),
        };

        let crossed_up = diff > 0.0 && prev_diff <= 0.0;
        let crossed_down = diff < 0.0 && prev_diff >= 0.0;

        let mut intents = Vec::new();

        if crossed_up && !position.is_long() {
            // Flat goes long; an open short flips (the loop closes it first).
            intents.push(OrderIntent::enter_long("bullish crossover"));
        }

        if crossed_down && !position.is_short() {
            if self.allow_short {
                intents.push(OrderIntent::enter_short("bearish crossover"));
            } else if position.is_long() {
                intents.push(OrderIntent::exit("bearish crossover"));
            }
        }

        intents
    }
}
