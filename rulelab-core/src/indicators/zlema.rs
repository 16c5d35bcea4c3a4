//! Zero-lag EMA — an EMA of a de-lagged (lead-adjusted) price series.
//!
//! De-lagged price: close + (close - close[lag]) where lag = max((period-1)/2, 1).
//! When fewer than `lag` prior closes exist, the current close stands in and
//! the de-lag term vanishes. Smoothing alpha = 2 / (period + 1), seeded by the
//! first de-lagged value.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ZeroLagEma {
    lag: usize,
    alpha: f64,
    /// Recent closes, oldest first; bounded to `lag` entries.
    history: VecDeque<f64>,
    value: Option<f64>,
}

impl ZeroLagEma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "zero-lag EMA period must be >= 1");
        let lag = ((period - 1) / 2).max(1);
        Self {
            lag,
            alpha: 2.0 / (period as f64 + 1.0),
            history: VecDeque::with_capacity(lag + 1),
            value: None,
        }
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Feed one close, returning the updated zero-lag EMA.
    pub fn update(&mut self, close: f64) -> f64 {
        let lagged = if self.history.len() >= self.lag {
            *self.history.front().expect("history bounded to lag entries")
        } else {
            close
        };
        let delagged = close + (close - lagged);

        self.history.push_back(close);
        if self.history.len() > self.lag {
            self.history.pop_front();
        }

        let next = match self.value {
            Some(prev) => self.alpha * delagged + (1.0 - self.alpha) * prev,
            None => delagged,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}
