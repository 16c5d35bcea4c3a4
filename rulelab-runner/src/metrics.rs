//! Performance statistics computed from the equity curve and trade log.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rulelab_core::domain::TradeRecord;

use crate::result::EquityPoint;

/// Bars per year used for annualizing ratios (daily-bar convention).
const ANNUALIZATION_BARS: f64 = 252.0;

/// Performance statistics for a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total return as a fraction of initial capital.
    pub total_return: f64,
    /// Annualized Sharpe ratio over per-bar returns (risk-free rate 0).
    pub sharpe: f64,
    /// Sortino ratio (downside deviation only).
    pub sortino: f64,
    /// Maximum drawdown as a fraction of the running peak.
    pub max_drawdown: f64,
    /// Fraction of trades with positive pnl.
    pub win_rate: f64,
    /// Gross profit / gross loss.
    pub profit_factor: f64,
    pub num_trades: usize,
    /// Mean per-trade return fraction.
    pub avg_trade_return: f64,
    pub final_value: f64,
    pub initial_capital: f64,
    /// Realized profit: final value minus initial capital. Equals the sum of
    /// trade pnl because the engine flattens at end of window.
    pub pnl: f64,
}

impl PerformanceMetrics {
    /// Compute statistics from a finished run.
    ///
    /// `final_value` comes from the engine's post-flatten equity, not the last
    /// curve point (which is recorded before the final bar's fills).
    pub fn compute(
        equity_curve: &[EquityPoint],
        trades: &[TradeRecord],
        initial_capital: f64,
        final_value: f64,
    ) -> Self {
        let total_return = (final_value - initial_capital) / initial_capital;

        let bar_returns: Vec<f64> = equity_curve
            .windows(2)
            .filter(|w| w[0].equity != 0.0)
            .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
            .collect();

        let sharpe = compute_sharpe(&bar_returns);
        let sortino = compute_sortino(&bar_returns);
        let max_drawdown = compute_max_drawdown(equity_curve);

        let num_trades = trades.len();
        let winners: Vec<&TradeRecord> = trades.iter().filter(|t| t.pnl > 0.0).collect();
        let losers: Vec<&TradeRecord> = trades.iter().filter(|t| t.pnl <= 0.0).collect();

        let win_rate = if num_trades > 0 {
            winners.len() as f64 / num_trades as f64
        } else {
            0.0
        };

        let gross_profit: f64 = winners.iter().map(|t| t.pnl).sum();
        let gross_loss: f64 = losers.iter().map(|t| t.pnl.abs()).sum();
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            0.0
        };

        let avg_trade_return = if num_trades > 0 {
            trades.iter().map(|t| t.return_pct()).sum::<f64>() / num_trades as f64
        } else {
            0.0
        };

        Self {
            total_return,
            sharpe,
            sortino,
            max_drawdown,
            win_rate,
            profit_factor,
            num_trades,
            avg_trade_return,
            final_value,
            initial_capital,
            pnl: final_value - initial_capital,
        }
    }

    /// Flatten into the result's ordered metrics map.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("total_return".to_string(), self.total_return);
        map.insert("sharpe".to_string(), self.sharpe);
        map.insert("sortino".to_string(), self.sortino);
        map.insert("max_drawdown".to_string(), self.max_drawdown);
        map.insert("win_rate".to_string(), self.win_rate);
        map.insert("profit_factor".to_string(), self.profit_factor);
        map.insert("num_trades".to_string(), self.num_trades as f64);
        map.insert("avg_trade_return".to_string(), self.avg_trade_return);
        map.insert("final_value".to_string(), self.final_value);
        map.insert("initial_capital".to_string(), self.initial_capital);
        map.insert("pnl".to_string(), self.pnl);
        map
    }
}

fn compute_sharpe(bar_returns: &[f64]) -> f64 {
    if bar_returns.is_empty() {
        return 0.0;
    }
    let mean = bar_returns.iter().sum::<f64>() / bar_returns.len() as f64;
    let variance = bar_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / bar_returns.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev > 0.0 {
        mean / std_dev * ANNUALIZATION_BARS.sqrt()
    } else {
        0.0
    }
}

fn compute_sortino(bar_returns: &[f64]) -> f64 {
    if bar_returns.is_empty() {
        return 0.0;
    }
    let mean = bar_returns.iter().sum::<f64>() / bar_returns.len() as f64;
    let downside: Vec<f64> = bar_returns.iter().filter(|&&r| r < 0.0).copied().collect();
    if downside.is_empty() {
        return 0.0;
    }
    let downside_variance =
        downside.iter().map(|r| r.powi(2)).sum::<f64>() / downside.len() as f64;
    let downside_dev = downside_variance.sqrt();
    if downside_dev > 0.0 {
        mean / downside_dev * ANNUALIZATION_BARS.sqrt()
    } else {
        0.0
    }
}

fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.is_empty() {
        return 0.0;
    }
    let mut peak = equity_curve[0].equity;
    let mut max_dd = 0.0;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
