//! Simulated position ledger — the state carried bar-to-bar by every
//! simulation, committed or what-if.

use serde::{Deserialize, Serialize};

/// Position and realized-profit state at a bar boundary.
///
/// Invariant: `open_size` is either 0 or the fixed position size of the
/// gear configuration — the strategy never scales in or out.
/// `gross_profit` changes only at a sell event, by
/// `(close_at_sell - open_price) * open_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub open_size: i64,
    pub open_price: f64,
    pub gross_profit: f64,
}

impl LedgerState {
    /// The state every run starts from: flat, nothing realized.
    pub fn flat() -> Self {
        Self {
            open_size: 0,
            open_price: 0.0,
            gross_profit: 0.0,
        }
    }

    /// Unrealized mark-to-market against `price`.
    pub fn position_value(&self, price: f64) -> f64 {
        self.open_size as f64 * (price - self.open_price)
    }

    /// Checks the ledger shape. A violation here is a programmer error,
    /// not a data problem, so callers assert on it in debug builds.
    pub fn is_well_formed(&self, position_size: i64) -> bool {
        (self.open_size == 0 || self.open_size == position_size)
            && (self.open_size != 0 || self.open_price == 0.0)
    }
}

/// Per-bar outcome row of a committed selector run.
///
/// `buy_price`/`sell_price` are NaN unless the action occurred that bar.
/// `gear` is `None` for a period where no candidate produced a finite
/// score (the ledger is force-flattened over such a period).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BarOutcome {
    pub gear: Option<usize>,
    pub active_price: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub open_size: i64,
    pub open_price: f64,
    pub gross_profit: f64,
    pub position_value: f64,
}

impl BarOutcome {
    pub fn state(&self) -> LedgerState {
        LedgerState {
            open_size: self.open_size,
            open_price: self.open_price,
            gross_profit: self.gross_profit,
        }
    }
}
