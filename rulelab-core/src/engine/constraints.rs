//! Session constraint enforcement — broker square-off rules.

use chrono::NaiveTime;

use crate::domain::{Position, PositionSide, ProductType, RiskConfig};

/// Decide whether the open position must be squared off at this bar.
///
/// Evaluated once per bar after the policy's fills. Returns the forced-close
/// reason, which takes precedence over anything the policy queued this bar.
/// Rule table (first match wins), active only when a session cutoff is
/// configured, the position is open, and the bar's time-of-day has reached it:
///
/// | product        | side  | action                                         |
/// |----------------|-------|------------------------------------------------|
/// | intraday       | short | close ("intraday square-off (MIS short)")      |
/// | intraday       | long  | close ("intraday square-off (MIS long)")       |
/// | delivery/auto  | short | close ("intraday square-off for short in cash segment") |
/// | delivery/auto  | long  | hold                                           |
pub fn square_off_reason(
    risk: &RiskConfig,
    position: &Position,
    time_of_day: NaiveTime,
) -> Option<&'static str> {
    let cutoff = risk.session_close_time?;
    if position.is_flat() || time_of_day < cutoff {
        return None;
    }

    match (risk.product, position.side()) {
        (ProductType::Intraday, PositionSide::Short) => Some("intraday square-off (MIS short)"),
        (ProductType::Intraday, PositionSide::Long) => Some("intraday square-off (MIS long)"),
        (ProductType::Delivery | ProductType::Auto, PositionSide::Short) => {
            Some("intraday square-off for short in cash segment")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(product: ProductType, cutoff: Option<&str>) -> RiskConfig {
        RiskConfig {
            product,
            session_close_time: cutoff.map(|s| s.parse().unwrap()),
            ..RiskConfig::default()
        }
    }

    fn long() -> Position {
        Position {
            quantity: 10.0,
            avg_entry_price: 100.0,
        }
    }

    fn short() -> Position {
        Position {
            quantity: -10.0,
            avg_entry_price: 100.0,
        }
    }

    fn t(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    #[test]
    fn intraday_long_squares_off_at_cutoff() {
        let r = risk(ProductType::Intraday, Some("15:15:00"));
        assert_eq!(
            square_off_reason(&r, &long(), t("15:15:00")),
            Some("intraday square-off (MIS long)")
        );
        assert_eq!(
            square_off_reason(&r, &long(), t("15:30:00")),
            Some("intraday square-off (MIS long)")
        );
    }

    #[test]
    fn intraday_short_squares_off_at_cutoff() {
        let r = risk(ProductType::Intraday, Some("15:15:00"));
        assert_eq!(
            square_off_reason(&r, &short(), t("15:20:00")),
            Some("intraday square-off (MIS short)")
        );
    }

    #[test]
    fn before_cutoff_no_action() {
        let r = risk(ProductType::Intraday, Some("15:15:00"));
        assert_eq!(square_off_reason(&r, &long(), t("15:14:59")), None);
    }

    #[test]
    fn delivery_long_holds_overnight() {
        let r = risk(ProductType::Delivery, Some("15:15:00"));
        assert_eq!(square_off_reason(&r, &long(), t("15:30:00")), None);
    }

    #[test]
    fn delivery_short_squares_off() {
        let r = risk(ProductType::Delivery, Some("15:15:00"));
        assert_eq!(
            square_off_reason(&r, &short(), t("15:30:00")),
            Some("intraday square-off for short in cash segment")
        );
    }

    #[test]
    fn auto_follows_delivery_rules() {
        let r = risk(ProductType::Auto, Some("15:15:00"));
        assert_eq!(square_off_reason(&r, &long(), t("15:30:00")), None);
        assert_eq!(
            square_off_reason(&r, &short(), t("15:30:00")),
            Some("intraday square-off for short in cash segment")
        );
    }

    #[test]
    fn no_cutoff_disables_enforcement() {
        let r = risk(ProductType::Intraday, None);
        assert_eq!(square_off_reason(&r, &long(), t("23:59:59")), None);
    }

    #[test]
    fn flat_position_never_forced() {
        let r = risk(ProductType::Intraday, Some("15:15:00"));
        assert_eq!(square_off_reason(&r, &Position::flat(), t("15:30:00")), None);
    }
}
