//! Average True Range with Wilder smoothing, updated bar by bar.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! The first `period` TR values are simple-averaged to seed the ATR;
//! afterwards `atr = (atr * (period - 1) + tr) / period`.

use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilderAtr {
    period: usize,
    prev_close: Option<f64>,
    seed_sum: f64,
    seed_count: usize,
    value: Option<f64>,
}

impl WilderAtr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            seed_sum: 0.0,
            seed_count: 0,
            value: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed one bar, returning the ATR once seeded.
    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        let tr = self.true_range(bar);
        self.prev_close = Some(bar.close);

        match self.value {
            Some(atr) => {
                let next = (atr * (self.period as f64 - 1.0) + tr) / self.period as f64;
                self.value = Some(next);
            }
            None => {
                self.seed_sum += tr;
                self.seed_count += 1;
                if self.seed_count == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// First bar has no previous close: TR degrades to high - low.
    fn true_range(&self, bar: &Bar) -> f64 {
        let hl = bar.high - bar.low;
        match self.prev_close {
            Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
            None => hl,
        }
    }
}
