//! Bar-by-bar orchestration loop — the heart of the engine.
//!
//! Four phases per bar:
//! 1. Mark-to-market: record equity at the bar's close, before decisions
//! 2. Decide: the policy consumes the bar and emits intents
//! 3. Fill: size each intent and apply it to the ledger and tracker
//! 4. Enforce: session square-off rules may force a closing fill
//!
//! After the last bar any residual exposure is flattened at the last close
//! with reason "end of window", so every opened trade closes and final equity
//! reconciles exactly with the trade log.

use chrono::NaiveDateTime;

use crate::domain::{Bar, IntentAction, OrderIntent, PositionSide};
use crate::policy::DecisionPolicy;
use crate::sizing::size_order;

use super::constraints::square_off_reason;
use super::ledger::Ledger;
use super::lifecycle::TradeTracker;
use super::state::{RunParams, RunResult};

/// Replay `bars` through `policy` under `params`.
///
/// The caller validates preconditions (non-empty, time-ordered, sane OHLC);
/// the loop itself never fails — numeric edge cases degrade in the sizer.
pub fn run_policy(
    bars: &[Bar],
    policy: &mut dyn DecisionPolicy,
    params: &RunParams,
) -> RunResult {
    let mut ledger = Ledger::new(params.initial_capital);
    let mut tracker = TradeTracker::new(params.symbol.clone());
    let mut equity_curve = Vec::with_capacity(bars.len());

    for bar in bars {
        // ─── Phase 1: Mark-to-market ───
        // Equity at the start of bar processing: the previous bar's fills are
        // already in cash/position, marked at this bar's close.
        equity_curve.push(ledger.equity(bar.close));

        // ─── Phase 2: Decide ───
        let intents = policy.decide(bar, ledger.position());

        // ─── Phase 3: Fill ───
        for intent in intents {
            apply_intent(intent, bar, &mut ledger, &mut tracker, params);
        }

        // ─── Phase 4: Enforce ───
        // A forced close carries the enforcer's reason and this bar's
        // timestamp, superseding anything the policy queued this bar.
        if let Some(reason) =
            square_off_reason(&params.risk, ledger.position(), bar.timestamp.time())
        {
            close_position(
                bar.timestamp,
                bar.close,
                &mut ledger,
                &mut tracker,
                Some(reason.to_string()),
            );
        }
    }

    // End of data: flatten residual exposure.
    if let Some(last) = bars.last() {
        if !ledger.position().is_flat() {
            close_position(
                last.timestamp,
                last.close,
                &mut ledger,
                &mut tracker,
                Some("end of window".to_string()),
            );
        }
    }

    let final_equity = ledger.cash();
    let (trades, skipped_closes) = tracker.into_trades();

    RunResult {
        equity_curve,
        trades,
        final_equity,
        bar_count: bars.len(),
        skipped_closes,
    }
}

/// Size one intent and apply the resulting fill(s).
fn apply_intent(
    intent: OrderIntent,
    bar: &Bar,
    ledger: &mut Ledger,
    tracker: &mut TradeTracker,
    params: &RunParams,
) {
    let side = match intent.action {
        IntentAction::Exit => {
            if !ledger.position().is_flat() {
                close_position(
                    bar.timestamp,
                    bar.close,
                    ledger,
                    tracker,
                    Some(intent.reason),
                );
            }
            return;
        }
        IntentAction::EnterLong => PositionSide::Long,
        IntentAction::EnterShort => PositionSide::Short,
    };

    // Short-sale restriction applies to any policy, not just ones that
    // consult the flag themselves.
    if side == PositionSide::Short && !params.risk.allow_short {
        return;
    }

    // A direction flip closes the opposing leg first; the flip's reason
    // doubles as that leg's exit reason.
    let opposing = match side {
        PositionSide::Long => ledger.position().is_short(),
        PositionSide::Short => ledger.position().is_long(),
        PositionSide::Flat => false,
    };
    if opposing {
        close_position(
            bar.timestamp,
            bar.close,
            ledger,
            tracker,
            Some(intent.reason.clone()),
        );
    }

    let quantity = size_order(
        side,
        bar.close,
        ledger.position(),
        ledger.cash(),
        &params.risk,
        params.stop_loss_pct,
    );
    if quantity <= 0.0 {
        return;
    }

    let signed = match side {
        PositionSide::Long => quantity,
        PositionSide::Short => -quantity,
        PositionSide::Flat => return,
    };
    let report = ledger.apply_fill(signed, bar.close);
    if report.opened {
        tracker.on_open(bar.timestamp, bar.close, signed, Some(intent.reason));
    } else {
        tracker.on_extend(quantity, ledger.position().avg_entry_price);
    }
}

/// Close the whole open leg at `price`, feeding the tracker.
fn close_position(
    time: NaiveDateTime,
    price: f64,
    ledger: &mut Ledger,
    tracker: &mut TradeTracker,
    reason: Option<String>,
) {
    let delta = -ledger.position().quantity;
    if delta == 0.0 {
        return;
    }
    let report = ledger.apply_fill(delta, price);
    tracker.on_close(time, price, report.realized_pnl, reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Position, ProductType};
    use chrono::NaiveDate;

    /// Scripted policy: a fixed intent list per bar index. Keeps loop tests
    /// independent of indicator warm-up arithmetic.
    #[derive(Debug)]
    struct Scripted {
        script: Vec<(usize, OrderIntent)>,
        bar_index: usize,
    }

    impl Scripted {
        fn new(script: Vec<(usize, OrderIntent)>) -> Self {
            Self {
                script,
                bar_index: 0,
            }
        }
    }

    impl DecisionPolicy for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn decide(&mut self, _bar: &Bar, _position: &Position) -> Vec<OrderIntent> {
            let idx = self.bar_index;
            self.bar_index += 1;
            self.script
                .iter()
                .filter(|(i, _)| *i == idx)
                .map(|(_, intent)| intent.clone())
                .collect()
        }
    }

    fn daily_bar(index: usize, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::days(index as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    fn intraday_bar(index: usize, hour: u32, minute: u32, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap()
                + chrono::Duration::days(index as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    fn params(capital: f64) -> RunParams {
        RunParams::new("TEST", capital)
    }

    #[test]
    fn idle_policy_keeps_equity_flat() {
        let bars: Vec<Bar> = (0..10).map(|i| daily_bar(i, 100.0 + i as f64)).collect();
        let mut policy = Scripted::new(vec![]);
        let result = run_policy(&bars, &mut policy, &params(50_000.0));

        assert_eq!(result.bar_count, 10);
        assert_eq!(result.equity_curve.len(), 10);
        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity, 50_000.0);
        for &eq in &result.equity_curve {
            assert_eq!(eq, 50_000.0);
        }
    }

    #[test]
    fn equity_recorded_before_decisions() {
        // Entry on bar 2 at close 102: bar 2's equity point must predate the
        // fill (still all cash), bar 3's must mark the open position.
        let bars: Vec<Bar> = (0..5).map(|i| daily_bar(i, 100.0 + i as f64)).collect();
        let mut policy = Scripted::new(vec![(2, OrderIntent::enter_long("bullish crossover"))]);
        let mut p = params(100_000.0);
        p.risk.max_position_size_pct = 10.0;

        let result = run_policy(&bars, &mut policy, &p);
        assert_eq!(result.equity_curve[2], 100_000.0);
        // 98 units at 102 → marked at 103 on bar 3: +98.
        assert_eq!(result.equity_curve[3], 100_000.0 + 98.0);
    }

    #[test]
    fn end_of_window_flattens_residual_exposure() {
        let bars: Vec<Bar> = (0..6).map(|i| daily_bar(i, 100.0 + i as f64)).collect();
        let mut policy = Scripted::new(vec![(1, OrderIntent::enter_long("trend up entry"))]);
        let result = run_policy(&bars, &mut policy, &params(100_000.0));

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason.as_deref(), Some("end of window"));
        assert_eq!(trade.exit_time, bars[5].timestamp);
        // Equity identity: all exposure closed, pnl fully realized.
        let pnl: f64 = result.trades.iter().map(|t| t.pnl).sum();
        assert!((result.final_equity - 100_000.0 - pnl).abs() < 1e-9);
    }

    #[test]
    fn exit_intent_closes_with_policy_reason() {
        let bars: Vec<Bar> = (0..6).map(|i| daily_bar(i, 100.0 + i as f64)).collect();
        let mut policy = Scripted::new(vec![
            (1, OrderIntent::enter_long("bullish crossover")),
            (4, OrderIntent::exit("bearish crossover")),
        ]);
        let result = run_policy(&bars, &mut policy, &params(100_000.0));

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_reason.as_deref(), Some("bullish crossover"));
        assert_eq!(trade.exit_reason.as_deref(), Some("bearish crossover"));
        assert_eq!(trade.entry_time, bars[1].timestamp);
        assert_eq!(trade.exit_time, bars[4].timestamp);
        // Long 1 bar at 101 → exit at 104.
        assert!(trade.pnl > 0.0);
    }

    #[test]
    fn short_entries_dropped_when_disallowed() {
        let bars: Vec<Bar> = (0..6).map(|i| daily_bar(i, 100.0)).collect();
        let mut policy = Scripted::new(vec![(1, OrderIntent::enter_short("bearish crossover"))]);
        let result = run_policy(&bars, &mut policy, &params(100_000.0));
        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity, 100_000.0);
    }

    #[test]
    fn flip_closes_long_then_opens_short() {
        let bars: Vec<Bar> = (0..6).map(|i| daily_bar(i, 100.0 + i as f64)).collect();
        let mut policy = Scripted::new(vec![
            (1, OrderIntent::enter_long("bullish crossover")),
            (3, OrderIntent::enter_short("bearish crossover")),
        ]);
        let mut p = params(100_000.0);
        p.risk.allow_short = true;

        let result = run_policy(&bars, &mut policy, &p);
        assert_eq!(result.trades.len(), 2);

        let closed_long = &result.trades[0];
        assert_eq!(closed_long.side, PositionSide::Long);
        assert_eq!(closed_long.exit_reason.as_deref(), Some("bearish crossover"));
        assert_eq!(closed_long.exit_time, bars[3].timestamp);

        let short = &result.trades[1];
        assert_eq!(short.side, PositionSide::Short);
        assert_eq!(short.entry_reason.as_deref(), Some("bearish crossover"));
        assert_eq!(short.exit_reason.as_deref(), Some("end of window"));
    }

    #[test]
    fn square_off_overrides_entry_reason_same_bar() {
        // Intraday product, entry fires on a bar already past the cutoff:
        // the enforcer closes it the same bar with its own reason.
        let bars = vec![
            intraday_bar(0, 9, 15, 100.0),
            intraday_bar(0, 15, 20, 101.0),
            intraday_bar(1, 9, 15, 102.0),
        ];
        let mut policy = Scripted::new(vec![(1, OrderIntent::enter_long("trend up entry"))]);
        let mut p = params(100_000.0);
        p.risk.product = ProductType::Intraday;
        p.risk.session_close_time = Some("15:15:00".parse().unwrap());

        let result = run_policy(&bars, &mut policy, &p);
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_reason.as_deref(), Some("trend up entry"));
        assert_eq!(
            trade.exit_reason.as_deref(),
            Some("intraday square-off (MIS long)")
        );
        assert_eq!(trade.exit_time, bars[1].timestamp);
    }

    #[test]
    fn policy_exit_leaves_nothing_for_the_enforcer() {
        // The policy itself exits on the cutoff bar; the enforcer then sees a
        // flat book and the policy's reason stands.
        let bars = vec![
            intraday_bar(0, 9, 15, 100.0),
            intraday_bar(0, 11, 0, 101.0),
            intraday_bar(0, 15, 20, 102.0),
        ];
        let mut policy = Scripted::new(vec![
            (1, OrderIntent::enter_long("bullish crossover")),
            (2, OrderIntent::exit("take profit")),
        ]);
        let mut p = params(100_000.0);
        p.risk.product = ProductType::Intraday;
        p.risk.session_close_time = Some("15:15:00".parse().unwrap());

        let result = run_policy(&bars, &mut policy, &p);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason.as_deref(), Some("take profit"));
    }

    #[test]
    fn delivery_long_survives_cutoff_until_end_of_window() {
        let bars = vec![
            intraday_bar(0, 9, 15, 100.0),
            intraday_bar(0, 15, 20, 101.0),
            intraday_bar(1, 9, 15, 102.0),
        ];
        let mut policy = Scripted::new(vec![(0, OrderIntent::enter_long("trend up entry"))]);
        let mut p = params(100_000.0);
        p.risk.product = ProductType::Delivery;
        p.risk.session_close_time = Some("15:15:00".parse().unwrap());

        let result = run_policy(&bars, &mut policy, &p);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason.as_deref(), Some("end of window"));
    }

    #[test]
    fn pyramiding_extends_single_trade() {
        let bars: Vec<Bar> = (0..6).map(|i| daily_bar(i, 100.0)).collect();
        let mut policy = Scripted::new(vec![
            (1, OrderIntent::enter_long("trend up entry")),
            (3, OrderIntent::enter_long("trend up entry")),
        ]);
        let mut p = params(100_000.0);
        p.risk.max_position_size_pct = 20.0;
        // Risk-cap the first entry (100 units) so the notional cap leaves
        // headroom for the add.
        p.risk.per_trade_risk_pct = Some(0.2);
        p.stop_loss_pct = Some(2.0);

        let result = run_policy(&bars, &mut policy, &p);
        // One round trip: the second entry extends the same leg.
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_reason.as_deref(), Some("trend up entry"));
        assert!(trade.quantity > 100.0, "second entry should add units");
    }

    #[test]
    fn empty_bars_produce_empty_result() {
        let mut policy = Scripted::new(vec![]);
        let result = run_policy(&[], &mut policy, &params(10_000.0));
        assert_eq!(result.bar_count, 0);
        assert!(result.equity_curve.is_empty());
        assert_eq!(result.final_equity, 10_000.0);
    }
}
