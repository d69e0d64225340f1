//! Weighted Moving Average (WMA).
//!
//! Linear weights 1..=period with the most recent value weighted heaviest:
//! WMA[t] = sum_{k=0..period-1} (period-k) * x[t-k] / (period*(period+1)/2)
//! Lookback: period - 1.

use crate::domain::Bar;
use crate::indicators::Indicator;

#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    name: String,
}

impl Wma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "WMA period must be >= 1");
        Self {
            period,
            name: format!("wma_{period}"),
        }
    }
}

impl Indicator for Wma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
        wma_of_series(&typical, self.period)
    }
}

/// Compute raw WMA values from a pre-extracted f64 slice.
///
/// Used by `Hma`, which needs a WMA of an intermediate series. A NaN
/// anywhere inside a window makes that window's output NaN; later windows
/// without NaN recover. Output is NaN for the first `period - 1` indices.
pub fn wma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let denom = (period * (period + 1)) as f64 / 2.0;

    for i in (period - 1)..n {
        let mut acc = 0.0;
        for k in 0..period {
            // weight `period - k` on the value k bars back
            acc += (period - k) as f64 * values[i - k];
        }
        result[i] = acc / denom;
    }

    result
}
