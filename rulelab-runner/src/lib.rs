//! RuleLab Runner — backtest orchestration over the core engine.
//!
//! Wires configuration, validation, the policy factory, the bar loop, and
//! metrics into a single `run_backtest` call, plus a rayon-parallel batch
//! entry point. Data acquisition and persistence stay outside: callers hand
//! in a materialized bar series and take away a serializable result.

pub mod batch;
pub mod config;
pub mod metrics;
pub mod result;
pub mod runner;

pub use batch::{run_batch, BatchJob};
pub use config::{BacktestConfig, ConfigError, CostConfig, RunId};
pub use metrics::PerformanceMetrics;
pub use result::{BacktestResult, EquityPoint};
pub use runner::{run_backtest, RunError};
