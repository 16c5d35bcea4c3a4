//! Run parameters and run result for the bar loop.

use crate::domain::{RiskConfig, TradeRecord};

/// Everything the bar loop needs besides the bars and the policy.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub symbol: String,
    pub initial_capital: f64,
    pub risk: RiskConfig,
    /// Stop distance (percent of price) threaded into the sizer's per-trade
    /// risk cap; comes from the policy's parameter map.
    pub stop_loss_pct: Option<f64>,
}

impl RunParams {
    pub fn new(symbol: impl Into<String>, initial_capital: f64) -> Self {
        Self {
            symbol: symbol.into(),
            initial_capital,
            risk: RiskConfig::default(),
            stop_loss_pct: None,
        }
    }
}

/// Raw output of the bar loop. The runner layers metrics and timestamps on top.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// One mark-to-market equity value per processed bar, recorded before
    /// that bar's decisions.
    pub equity_curve: Vec<f64>,
    pub trades: Vec<TradeRecord>,
    /// Equity after the end-of-window flatten; the position is always flat
    /// here, so this equals final cash.
    pub final_equity: f64,
    pub bar_count: usize,
    /// Close events that arrived with no matching open record (defensive
    /// no-ops, surfaced for diagnostics).
    pub skipped_closes: usize,
}
