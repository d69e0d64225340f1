//! Kinematics stack — successive finite differences of a trend line.
//!
//! speed, accel, jerk and jounce are nested differences over lookback
//! windows {1, 2, 4, 8}: each order compares the previous order against
//! itself 2^k bars ago and halves the gap k times. There is no extra
//! smoothing here; whatever noise survives comes from the source line.
//!
//! Any term whose window reaches past the start of history is NaN, and
//! NaN propagates upward — the deepest leg of jounce(i) is the speed at
//! i - 14, so a line needs 16 finite points before jounce is finite at
//! its tip. Decision predicates treat NaN as "no signal"
//! (comparisons against NaN are false), so nothing trades on undefined
//! history.

use serde::{Deserialize, Serialize};

/// Display/decision scale applied by `sample`.
pub const REPORT_SCALE: f64 = 100.0;

/// One scaled reading of the four derivatives at a bar index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KinematicsSample {
    pub speed: f64,
    pub accel: f64,
    pub jerk: f64,
    pub jounce: f64,
}

impl KinematicsSample {
    /// All four values NaN — the reading for any out-of-range index.
    pub fn undefined() -> Self {
        Self {
            speed: f64::NAN,
            accel: f64::NAN,
            jerk: f64::NAN,
            jounce: f64::NAN,
        }
    }
}

/// Value at `index`, NaN when the index precedes history (or runs past
/// the end — callers step one bar back freely without bounds checks).
fn value_at(line: &[f64], index: i64) -> f64 {
    if index < 0 || index as usize >= line.len() {
        f64::NAN
    } else {
        line[index as usize]
    }
}

/// First difference: line[i] - line[i-1]. Unscaled.
pub fn speed(line: &[f64], index: i64) -> f64 {
    value_at(line, index) - value_at(line, index - 1)
}

/// Second difference over a 2-bar window. Unscaled.
pub fn accel(line: &[f64], index: i64) -> f64 {
    (speed(line, index) - speed(line, index - 2)) / 2.0
}

/// Third difference over a 4-bar window. Unscaled.
pub fn jerk(line: &[f64], index: i64) -> f64 {
    (accel(line, index) - accel(line, index - 4)) / 4.0
}

/// Fourth difference over an 8-bar window. Unscaled.
pub fn jounce(line: &[f64], index: i64) -> f64 {
    (jerk(line, index) - jerk(line, index - 8)) / 8.0
}

/// All four derivatives at `index`, scaled by `REPORT_SCALE`.
///
/// The scale is uniform across the four terms, so the signs of the
/// partial sums the trading predicates test are unaffected.
pub fn sample(line: &[f64], index: i64) -> KinematicsSample {
    KinematicsSample {
        speed: REPORT_SCALE * speed(line, index),
        accel: REPORT_SCALE * accel(line, index),
        jerk: REPORT_SCALE * jerk(line, index),
        jounce: REPORT_SCALE * jounce(line, index),
    }
}
