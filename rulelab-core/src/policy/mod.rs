//! Decision policies — consume bars, emit order intents.
//!
//! Policies are position-aware but ledger-blind: they see the current bar and
//! the current position, never cash or equity. All rolling indicator state is
//! owned by the policy struct and advanced exactly once per bar, whether or
//! not an intent is emitted.

pub mod ma_crossover;
pub mod zero_lag_trend;

pub use ma_crossover::MaCrossover;
pub use zero_lag_trend::ZeroLagTrend;

use std::collections::BTreeMap;

use crate::domain::{Bar, OrderIntent, Position, RiskConfig};

/// Trait for decision policies.
///
/// # Architecture invariant
/// `decide` must only use data from bars it has already been fed — no
/// lookahead. Given the same parameter set and bar sequence, the emitted
/// intents are identical run to run.
pub trait DecisionPolicy: Send + std::fmt::Debug {
    /// Policy identifier (e.g. "ma_crossover").
    fn name(&self) -> &str;

    /// Advance internal state with `bar` and return zero or more intents.
    ///
    /// Quantities are resolved downstream by the position sizer; intents carry
    /// direction and reason only.
    fn decide(&mut self, bar: &Bar, position: &Position) -> Vec<OrderIntent>;
}

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during policy construction.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Extract a named f64 parameter, falling back to `default`.
fn param(params: &BTreeMap<String, f64>, name: &str, default: f64) -> f64 {
    params.get(name).copied().unwrap_or(default)
}

/// Extract a named usize parameter, falling back to `default`.
fn param_usize(params: &BTreeMap<String, f64>, name: &str, default: usize) -> usize {
    params
        .get(name)
        .copied()
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extract a named boolean parameter (any non-zero value is true).
fn param_bool(params: &BTreeMap<String, f64>, name: &str, default: bool) -> bool {
    params
        .get(name)
        .map(|&v| v != 0.0)
        .unwrap_or(default)
}

// ─── Policy factory ──────────────────────────────────────────────────

/// Create a decision policy from its string id and parameter map.
///
/// Unknown ids fail here, before any bar is processed.
pub fn build_policy(
    policy_id: &str,
    params: &BTreeMap<String, f64>,
    risk: &RiskConfig,
) -> Result<Box<dyn DecisionPolicy>, PolicyError> {
    match policy_id {
        "ma_crossover" => {
            let fast = param_usize(params, "fast_window", 10);
            let slow = param_usize(params, "slow_window", 50);
            Ok(Box::new(MaCrossover::new(fast, slow, risk.allow_short)))
        }
        "zero_lag_trend" => {
            let period = param_usize(params, "period", 14);
            let band_mult = param(params, "band_mult", 1.5);
            let stop_loss_pct = param(params, "stop_loss_pct", 3.0);
            let take_profit_pct = param(params, "take_profit_pct", 6.0);
            let pyramid_limit = param_usize(params, "pyramid_limit", 1);
            let long_only = param_bool(params, "long_only", false);
            Ok(Box::new(ZeroLagTrend::new(
                period,
                band_mult,
                stop_loss_pct,
                take_profit_pct,
                pyramid_limit,
                long_only,
                risk,
            )))
        }
        other => Err(PolicyError::UnknownPolicy(other.to_string())),
    }
}
