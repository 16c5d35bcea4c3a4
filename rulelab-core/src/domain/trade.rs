//! TradeRecord — a completed round-trip trade.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::position::PositionSide;

/// A complete round-trip trade record: entry → exit.
///
/// Built by the trade lifecycle tracker when a leg returns to flat. Immutable
/// once appended to a run result. `quantity` is unsigned; direction lives in
/// `side`. `pnl` is the ledger's realized P&L for the closing fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: PositionSide,
    pub quantity: f64,

    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,

    pub pnl: f64,

    /// Why the policy opened this leg (e.g. "bullish crossover").
    #[serde(default)]
    pub entry_reason: Option<String>,
    /// Why the leg closed — policy exit, square-off, or "end of window".
    #[serde(default)]
    pub exit_reason: Option<String>,
    /// Broker product label (e.g. "MIS", "CNC") for downstream cost models.
    #[serde(default)]
    pub product: Option<String>,
}

impl TradeRecord {
    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.quantity == 0.0 {
            return 0.0;
        }
        self.pnl / (self.entry_price * self.quantity)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
