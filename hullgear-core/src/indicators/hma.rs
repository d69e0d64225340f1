//! Hull Moving Average (HMA).
//!
//! HMA(n) = WMA(2*WMA(n/2) - WMA(n), round(sqrt(n)))
//!
//! The doubled short WMA cancels most of the lag of the long one; the
//! final sqrt-period WMA smooths the residual noise. Every gear's three
//! trend lines are HMAs at different periods.
//! Lookback: (n - 1) + (round(sqrt(n)) - 1).

use crate::domain::Bar;
use crate::indicators::wma::wma_of_series;
use crate::indicators::Indicator;

#[derive(Debug, Clone)]
pub struct Hma {
    period: usize,
    half: usize,
    root: usize,
    name: String,
}

impl Hma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "HMA period must be >= 1");
        let half = (period / 2).max(1);
        let root = ((period as f64).sqrt().round() as usize).max(1);
        Self {
            period,
            half,
            root,
            name: format!("hma_{period}"),
        }
    }

    /// Compute from a pre-extracted series (the gear builds all three
    /// lines from a single typical-price vector).
    pub fn compute_series(&self, values: &[f64]) -> Vec<f64> {
        let long = wma_of_series(values, self.period);
        let short = wma_of_series(values, self.half);
        let raw: Vec<f64> = short
            .iter()
            .zip(long.iter())
            .map(|(s, l)| 2.0 * s - l)
            .collect();
        wma_of_series(&raw, self.root)
    }
}

impl Indicator for Hma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (self.period - 1) + (self.root - 1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
        self.compute_series(&typical)
    }
}
