//! Position — signed exposure owned by the broker ledger.

use serde::{Deserialize, Serialize};

/// Which way a position (or a completed trade) points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
    Flat,
}

/// Signed position: quantity > 0 is long, < 0 is short, 0 is flat.
///
/// A position is long XOR short, never both. Flipping direction goes through
/// a close fill first; the engine never applies a sign-crossing fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub quantity: f64,
    pub avg_entry_price: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self {
            quantity: 0.0,
            avg_entry_price: 0.0,
        }
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0.0
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0.0
    }

    pub fn side(&self) -> PositionSide {
        if self.is_long() {
            PositionSide::Long
        } else if self.is_short() {
            PositionSide::Short
        } else {
            PositionSide::Flat
        }
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity * (current_price - self.avg_entry_price)
    }
}
