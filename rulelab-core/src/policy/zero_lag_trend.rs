//! Zero-lag trend policy — ATR-banded trend flips with stop/target exits and
//! pyramiding.
//!
//! Trend state is derived from a zero-lag EMA of the close with a Wilder-ATR
//! band around it. A reversal into an up-trend closes any short and adds long
//! units up to the pyramid limit; the mirror applies for down-trends unless
//! shorting is suppressed.

use crate::domain::{Bar, OrderIntent, Position, RiskConfig};
use crate::indicators::{WilderAtr, ZeroLagEma};

use super::DecisionPolicy;

/// Zero-lag trend policy with stop-loss, take-profit and pyramiding.
///
/// Exit rules run before entry rules every bar, against the open leg's
/// average entry price. Stop/target distances are percentages of entry.
/// During the ATR warm-up window the band is undefined and the trend stays 0,
/// so no entries can fire; the zero-lag EMA still advances.
#[derive(Debug, Clone)]
pub struct ZeroLagTrend {
    atr: WilderAtr,
    zlema: ZeroLagEma,
    band_mult: f64,
    stop_loss_pct: f64,
    take_profit_pct: f64,
    pyramid_limit: usize,
    long_only: bool,
    allow_short: bool,
    use_stop_loss: bool,
    use_take_profit: bool,

    /// Current trend state: -1, 0, or +1. 0 persists until a band fires.
    trend: i8,
    /// Units entered into the current long/short leg, for the pyramid cap.
    units_long: usize,
    units_short: usize,
}

impl ZeroLagTrend {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        period: usize,
        band_mult: f64,
        stop_loss_pct: f64,
        take_profit_pct: f64,
        pyramid_limit: usize,
        long_only: bool,
        risk: &RiskConfig,
    ) -> Self {
        assert!(period >= 1, "period must be >= 1");
        assert!(band_mult > 0.0, "band_mult must be positive");
        Self {
            atr: WilderAtr::new(period),
            zlema: ZeroLagEma::new(period),
            band_mult,
            stop_loss_pct,
            take_profit_pct,
            pyramid_limit: pyramid_limit.max(1),
            long_only,
            allow_short: risk.allow_short,
            use_stop_loss: risk.use_stop_loss,
            use_take_profit: risk.use_take_profit,
            trend: 0,
            units_long: 0,
            units_short: 0,
        }
    }

    fn shorts_enabled(&self) -> bool {
        self.allow_short && !self.long_only
    }

    /// Stop/target checks for the open leg. At most one exit per bar; the
    /// stop is checked first (adverse fill wins on ambiguous wide bars).
    fn exit_intent(&self, bar: &Bar, position: &Position) -> Option<OrderIntent> {
        let entry = position.avg_entry_price;
        if position.is_long() {
            if self.use_stop_loss && bar.low <= entry * (1.0 - self.stop_loss_pct / 100.0) {
                return Some(OrderIntent::exit("stop loss"));
            }
            if self.use_take_profit && bar.high >= entry * (1.0 + self.take_profit_pct / 100.0) {
                return Some(OrderIntent::exit("take profit"));
            }
        } else if position.is_short() {
            if self.use_stop_loss && bar.high >= entry * (1.0 + self.stop_loss_pct / 100.0) {
                return Some(OrderIntent::exit("stop loss"));
            }
            if self.use_take_profit && bar.low <= entry * (1.0 - self.take_profit_pct / 100.0) {
                return Some(OrderIntent::exit("take profit"));
            }
        }
        None
    }
}

impl DecisionPolicy for ZeroLagTrend {
    fn name(&self) -> &str {
        "zero_lag_trend"
    }

    fn decide(&mut self, bar: &Bar, position: &Position) -> Vec<OrderIntent> {
        // Indicator state advances every bar, intent or not.
        let atr = self.atr.update(bar);
        let zlema = self.zlema.update(bar.close);

        let prev_trend = self.trend;
        if let Some(atr) = atr {
            let band = atr * self.band_mult;
            if bar.close > zlema + band && self.trend != 1 {
                self.trend = 1;
            } else if bar.close < zlema - band && self.trend != -1 {
                self.trend = -1;
            }
        }

        // The pyramid count follows the actual leg: a flat position means the
        // previous leg is gone, however it closed.
        if position.is_flat() {
            self.units_long = 0;
            self.units_short = 0;
        }

        let mut intents = Vec::new();

        // Exits before entries.
        if let Some(exit) = self.exit_intent(bar, position) {
            if position.is_long() {
                self.units_long = 0;
            } else {
                self.units_short = 0;
            }
            intents.push(exit);
        }

        let bullish_reversal = prev_trend <= 0 && self.trend > 0;
        let bearish_reversal = prev_trend >= 0 && self.trend < 0;

        if bullish_reversal {
            if position.is_short() {
                self.units_short = 0;
                intents.push(OrderIntent::exit("trend reversal to long"));
            }
            if self.units_long < self.pyramid_limit {
                self.units_long += 1;
                intents.push(OrderIntent::enter_long("trend up entry"));
            }
        } else if bearish_reversal {
            if position.is_long() {
                self.units_long = 0;
                intents.push(OrderIntent::exit("trend reversal to short"));
            }
            if self.shorts_enabled() && self.units_short < self.pyramid_limit {
                self.units_short += 1;
                intents.push(OrderIntent::enter_short("trend down entry"));
            }
        }

        intents
    }
}
