//! Backtest result — equity curve, trade log, and metrics map.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rulelab_core::domain::TradeRecord;

use crate::config::RunId;

/// Single point in the equity curve: mark-to-market equity at the start of
/// that bar's processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Complete result of a single backtest run.
///
/// Assembled once at the end of the run, never mutated afterward. The
/// `metrics` map always contains `final_value`, `initial_capital` and `pnl`;
/// the remaining keys are derived performance statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub policy: String,
    pub symbol: String,
    pub timeframe: String,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub metrics: BTreeMap<String, f64>,
    /// Close events the engine skipped for lack of a matching open record.
    #[serde(default)]
    pub skipped_closes: usize,
}
