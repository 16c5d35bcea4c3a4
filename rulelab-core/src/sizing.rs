//! Position sizing — notional cap plus optional per-trade risk cap.

use crate::domain::{Position, PositionSide, RiskConfig};

/// Size an order as a whole number of units.
///
/// `capital` is the ledger's current cash. The notional cap is
/// `capital * max_position_size_pct / 100`; same-direction adds only get the
/// headroom left after the open leg's notional, while opposite-direction (or
/// flat) requests get the full cap, since the opposing leg is flattened before
/// the new one opens.
///
/// When a per-trade risk budget and a stop distance are both configured and
/// stops are enabled, the quantity is additionally capped so that a stop-out
/// loses at most `capital * per_trade_risk_pct / 100`.
///
/// Degenerate prices (<= 0) fall back to a single unit rather than dividing
/// by zero; a floored-to-zero quantity with real headroom rounds up to 1.
pub fn size_order(
    side: PositionSide,
    price: f64,
    position: &Position,
    capital: f64,
    risk: &RiskConfig,
    stop_loss_pct: Option<f64>,
) -> f64 {
    if price <= 0.0 {
        return 1.0;
    }

    let max_notional = capital * risk.max_position_size_pct / 100.0;
    let remaining_notional = if side == position.side() {
        max_notional - position.quantity.abs() * price
    } else {
        max_notional
    };
    if remaining_notional <= 0.0 {
        return 0.0;
    }

    let mut quantity = remaining_notional / price;

    if risk.use_stop_loss {
        if let (Some(risk_pct), Some(stop_pct)) = (risk.per_trade_risk_pct, stop_loss_pct) {
            if stop_pct > 0.0 {
                let risk_budget = capital * risk_pct / 100.0;
                let stop_distance = price * stop_pct / 100.0;
                quantity = quantity.min(risk_budget / stop_distance);
            }
        }
    }

    quantity.floor().max(1.0)
}
