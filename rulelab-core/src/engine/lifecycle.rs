//! Trade lifecycle — pairs an opening fill with its closing fill.

use chrono::NaiveDateTime;

use crate::domain::{PositionSide, TradeRecord};

/// An open leg being tracked: created on flat → non-zero, consumed on → flat.
#[derive(Debug, Clone)]
struct OpenTrade {
    side: PositionSide,
    quantity: f64,
    entry_time: NaiveDateTime,
    entry_price: f64,
    entry_reason: Option<String>,
}

/// State machine per run: Flat → Open → Closed.
///
/// Reasons are consume-once: they move into the `TradeRecord` on close, so a
/// stale reason can never leak into the next trade. A close event with no
/// matching open record is counted and skipped — never fabricated.
#[derive(Debug)]
pub struct TradeTracker {
    symbol: String,
    open: Option<OpenTrade>,
    trades: Vec<TradeRecord>,
    skipped_closes: usize,
}

impl TradeTracker {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            open: None,
            trades: Vec::new(),
            skipped_closes: 0,
        }
    }

    /// Record a position opening: flat → non-zero. `quantity` is signed.
    pub fn on_open(
        &mut self,
        time: NaiveDateTime,
        price: f64,
        quantity: f64,
        reason: Option<String>,
    ) {
        let side = if quantity > 0.0 {
            PositionSide::Long
        } else {
            PositionSide::Short
        };
        self.open = Some(OpenTrade {
            side,
            quantity: quantity.abs(),
            entry_time: time,
            entry_price: price,
            entry_reason: reason,
        });
    }

    /// Record a same-direction extension: the open record absorbs the added
    /// quantity at the ledger's new average entry.
    pub fn on_extend(&mut self, added_quantity: f64, new_avg_entry: f64) {
        if let Some(open) = self.open.as_mut() {
            open.quantity += added_quantity.abs();
            open.entry_price = new_avg_entry;
        }
    }

    /// Record a position close: non-zero → flat. The exit timestamp is the
    /// closing event's own timestamp — for forced closures that is the
    /// enforcement event, not the policy's.
    pub fn on_close(
        &mut self,
        time: NaiveDateTime,
        price: f64,
        realized_pnl: f64,
        reason: Option<String>,
    ) {
        let open = match self.open.take() {
            Some(open) => open,
            None => {
                // Close with no matching open: skip rather than fabricate.
                self.skipped_closes += 1;
                return;
            }
        };

        self.trades.push(TradeRecord {
            symbol: self.symbol.clone(),
            side: open.side,
            quantity: open.quantity,
            entry_time: open.entry_time,
            entry_price: open.entry_price,
            exit_time: time,
            exit_price: price,
            pnl: realized_pnl,
            entry_reason: open.entry_reason,
            exit_reason: reason,
            product: None,
        });
    }

    pub fn has_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn skipped_closes(&self) -> usize {
        self.skipped_closes
    }

    pub fn into_trades(self) -> (Vec<TradeRecord>, usize) {
        (self.trades, self.skipped_closes)
    }
}
