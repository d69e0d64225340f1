//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC price sample at a point in time.
///
/// Bars arrive with strictly increasing timestamps and are append-only:
/// once a bar is written to a feed it is never mutated. The engine consumes
/// intraday feeds (session-cutoff logic reads the bar's clock time), but
/// nothing here assumes a particular sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// Typical price: (open + high + low + close) / 4.
    ///
    /// All trend lines smooth this series, not the raw close.
    pub fn typical_price(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high/low bracket open and close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}
