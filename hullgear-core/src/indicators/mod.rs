//! Trend-line indicators.
//!
//! Both indicators implement the `Indicator` trait and are computed once,
//! up front, over the whole feed. They smooth the bar's typical price
//! (ohlc4), not the close — entries and exits read kinematics off these
//! lines, and only the fill itself uses the close.

pub mod hma;
pub mod wma;

pub use hma::Hma;
pub use wma::{wma_of_series, Wma};

use crate::domain::Bar;

/// A causal, precomputable trend line over a bar feed.
///
/// `compute` returns one value per bar; values inside the lookback window
/// are NaN. A value at index i depends only on bars <= i.
pub trait Indicator {
    fn name(&self) -> &str;

    /// Number of leading bars that produce NaN output.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from prices for testing.
///
/// All four OHLC fields are set to the price, so typical price equals the
/// input exactly and indicator expectations stay hand-checkable. Bars are
/// spaced one minute apart starting well before the session cutoff.
#[cfg(test)]
pub fn make_bars(prices: &[f64]) -> Vec<crate::domain::Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc
        .with_ymd_and_hms(2022, 9, 9, 9, 30, 0)
        .unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| crate::domain::Bar {
            time: base + chrono::Duration::minutes(i as i64),
            open: p,
            high: p,
            low: p,
            close: p,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
