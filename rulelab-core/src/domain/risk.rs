//! Risk and broker-product configuration.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Broker product classification for the instrument being replayed.
///
/// Intraday (MIS) positions must be squared off at the session cutoff;
/// delivery (CNC) longs can be held overnight, but shorts in the cash segment
/// still square off. `Auto` follows the delivery rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Intraday,
    Delivery,
    Auto,
}

/// Risk limits and broker rules applied to every sized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Cap on position notional as a percentage of capital.
    pub max_position_size_pct: f64,
    /// Optional per-trade risk budget as a percentage of capital; combined
    /// with the policy's stop distance to cap quantity.
    #[serde(default)]
    pub per_trade_risk_pct: Option<f64>,
    pub allow_short: bool,
    pub use_stop_loss: bool,
    pub use_take_profit: bool,
    pub product: ProductType,
    /// Session square-off cutoff (exchange-local time-of-day). None disables
    /// constraint enforcement entirely.
    #[serde(default)]
    pub session_close_time: Option<NaiveTime>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size_pct: 100.0,
            per_trade_risk_pct: None,
            allow_short: false,
            use_stop_loss: true,
            use_take_profit: true,
            product: ProductType::Auto,
            session_close_time: None,
        }
    }
}
