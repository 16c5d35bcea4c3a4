//! Backtest runner — validates the input contract, builds the policy, drives
//! the engine, and assembles the final result.

use thiserror::Error;

use rulelab_core::domain::{Bar, ProductType};
use rulelab_core::engine::{run_policy, RunParams};
use rulelab_core::policy::{build_policy, PolicyError};

use crate::config::{BacktestConfig, ConfigError};
use crate::metrics::PerformanceMetrics;
use crate::result::{BacktestResult, EquityPoint};

/// Errors from the runner. All of these fire before the bar loop starts; a
/// caller receives either a complete result or one of these, never a partial.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("empty bar sequence")]
    EmptyBars,
    #[error("bar timestamps must be strictly increasing (violation at index {0})")]
    UnorderedBars(usize),
    #[error("bar at index {0} has invalid OHLC values")]
    InsaneBar(usize),
}

/// Run a single backtest: `config` + pre-materialized `bars` → result.
///
/// The bar sequence comes from an external coverage provider; the runner never
/// fetches or resamples data. Configuration problems (unknown policy,
/// non-positive capital, bad bars) reject the run before any bar is processed.
pub fn run_backtest(config: &BacktestConfig, bars: &[Bar]) -> Result<BacktestResult, RunError> {
    config.validate()?;
    validate_bars(bars)?;

    let risk = config.risk_config();
    let mut policy = build_policy(&config.policy, &config.params, &risk)?;

    let mut params = RunParams::new(config.symbol.clone(), config.initial_capital);
    params.stop_loss_pct = config.params.get("stop_loss_pct").copied();
    params.risk = risk;

    let run = run_policy(bars, policy.as_mut(), &params);

    let equity_curve: Vec<EquityPoint> = bars
        .iter()
        .zip(&run.equity_curve)
        .map(|(bar, &equity)| EquityPoint {
            timestamp: bar.timestamp,
            equity,
        })
        .collect();

    // Product labeling for downstream cost models: explicit cost config wins,
    // otherwise derived from the broker product type.
    let product_label = config
        .cost
        .as_ref()
        .and_then(|c| c.product.clone())
        .or_else(|| match params.risk.product {
            ProductType::Intraday => Some("MIS".to_string()),
            ProductType::Delivery => Some("CNC".to_string()),
            ProductType::Auto => None,
        });
    let mut trades = run.trades;
    if let Some(label) = &product_label {
        for trade in &mut trades {
            trade.product = Some(label.clone());
        }
    }

    let metrics = PerformanceMetrics::compute(
        &equity_curve,
        &trades,
        config.initial_capital,
        run.final_equity,
    );

    Ok(BacktestResult {
        run_id: config.run_id(),
        policy: config.policy.clone(),
        symbol: config.symbol.clone(),
        timeframe: config.timeframe.clone(),
        equity_curve,
        trades,
        metrics: metrics.to_map(),
        skipped_closes: run.skipped_closes,
    })
}

/// Input contract: non-empty, strictly increasing timestamps, sane OHLC.
fn validate_bars(bars: &[Bar]) -> Result<(), RunError> {
    if bars.is_empty() {
        return Err(RunError::EmptyBars);
    }
    for (i, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(RunError::InsaneBar(i));
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(RunError::UnorderedBars(i));
        }
    }
    Ok(())
}
