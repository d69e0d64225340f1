//! Gear — one candidate trend-following configuration.
//!
//! A gear owns three Hull MA trend lines over typical price (fast = h1,
//! medium = h2, slow = a shared slow period) and precomputes, once over
//! the whole feed, the standalone trace of the buy/sell state machine:
//! per-bar position size, open price, realized profit, buy/sell marks and
//! the currently displayed ("active") line. The selector never re-runs
//! this state machine; it consults the trace through the `TrendTrace`
//! capability interface.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, LedgerState};
use crate::indicators::Hma;
use crate::kinematics::{self, KinematicsSample};

/// Forced-exit session cutoff: at or after 19:50 feed clock time, any
/// open position is closed on the bar. Both comparisons are per-field,
/// so 20:10 does NOT trigger.
pub const SESSION_CUTOFF_HOUR: u32 = 19;
pub const SESSION_CUTOFF_MINUTE: u32 = 50;

/// Smoothing pair identifying a gear within the candidate grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GearParams {
    pub h1: usize,
    pub h2: usize,
}

impl GearParams {
    pub fn name(&self) -> String {
        format!("hma_{}_{}", self.h1, self.h2)
    }
}

/// Settings shared by every gear in a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GearConfig {
    /// Period of the slow (third) trend line.
    pub slow_period: usize,
    /// Fixed position size; open size is always 0 or this.
    pub position_size: i64,
    /// Stop-profit threshold the unrealized-profit ratio is measured
    /// against when picking the displayed line.
    pub stop_profit: f64,
}

impl Default for GearConfig {
    fn default() -> Self {
        Self {
            slow_period: 16,
            position_size: 300,
            stop_profit: 0.05,
        }
    }
}

/// Which of the three trend lines is displayed as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLineId {
    Fast,
    Medium,
    Slow,
}

/// One row of a gear's precomputed standalone trace.
#[derive(Debug, Clone, Copy)]
pub struct GearBar {
    pub open_size: i64,
    pub open_price: f64,
    pub gross_profit: f64,
    pub position_value: f64,
    /// NaN unless a buy fired this bar.
    pub buy_price: f64,
    /// NaN unless a sell fired this bar.
    pub sell_price: f64,
    pub active_line: TrendLineId,
    pub active_price: f64,
}

/// Capability interface the selector sees.
///
/// The selector makes no assumption about how a candidate derives its
/// trade decisions; it only follows the precomputed position trace and
/// reads prices/signals for reporting.
pub trait TrendTrace: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the displayed trend line at `index`.
    fn active_price(&self, index: usize) -> f64;

    /// Kinematics of the displayed trend line at `index`.
    fn signals_at(&self, index: usize) -> KinematicsSample;

    /// Standalone position size at `index` — what the gear would hold had
    /// it been active since the start of the feed.
    fn open_size(&self, index: usize) -> i64;

    /// Fixed size this trace opens positions at.
    fn position_size(&self) -> i64;
}

/// One candidate trend simulator with its precomputed trace.
#[derive(Debug, Clone)]
pub struct Gear {
    params: GearParams,
    config: GearConfig,
    fast: Vec<f64>,
    medium: Vec<f64>,
    slow: Vec<f64>,
    trace: Vec<GearBar>,
}

impl Gear {
    /// Build the three trend lines and run the state machine over the
    /// whole feed. O(bars * max_period) and done exactly once per gear.
    pub fn new(params: GearParams, config: GearConfig, bars: &[Bar]) -> Self {
        let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
        let fast = Hma::new(params.h1).compute_series(&typical);
        let medium = Hma::new(params.h2).compute_series(&typical);
        let slow = Hma::new(config.slow_period).compute_series(&typical);

        let mut gear = Self {
            params,
            config,
            fast,
            medium,
            slow,
            trace: Vec::with_capacity(bars.len()),
        };
        gear.build_trace(bars);
        gear
    }

    pub fn params(&self) -> GearParams {
        self.params
    }

    pub fn line(&self, id: TrendLineId) -> &[f64] {
        match id {
            TrendLineId::Fast => &self.fast,
            TrendLineId::Medium => &self.medium,
            TrendLineId::Slow => &self.slow,
        }
    }

    pub fn trace(&self) -> &[GearBar] {
        &self.trace
    }

    /// Entry predicate: the line is rising and the rise is strengthening.
    /// NaN operands make this false — no entry without a defined signal.
    pub fn can_buy(line: &[f64], index: i64) -> bool {
        let s = kinematics::sample(line, index);
        s.speed > 0.0 && s.accel > 0.0
    }

    /// Exit predicate: escalating decay detector. Any partial sum of the
    /// kinematics stack turning negative triggers the exit, catching
    /// decelerating trends at increasingly long horizons. NaN operands
    /// make each affected disjunct false.
    pub fn can_sell(line: &[f64], index: i64) -> bool {
        let s = kinematics::sample(line, index);
        s.speed < 0.0
            || s.speed + s.accel < 0.0
            || s.speed + s.accel + s.jerk < 0.0
            || s.speed + s.accel + s.jerk + s.jounce < 0.0
    }

    /// Display-line selection. Does not gate entries (always the fast
    /// line) — it decides which line exits are read from and which price
    /// is reported as active.
    fn select_line(&self, state: &LedgerState, close: f64, current: TrendLineId) -> TrendLineId {
        if state.open_size == 0 {
            return TrendLineId::Fast;
        }
        let profit = if state.open_price != 0.0 {
            close - state.open_price
        } else {
            0.0
        };
        let ratio = profit / self.config.stop_profit;
        if ratio < 1.0 && current != TrendLineId::Slow {
            TrendLineId::Medium
        } else {
            TrendLineId::Slow
        }
    }

    fn build_trace(&mut self, bars: &[Bar]) {
        let mut state = LedgerState::flat();
        let mut active = TrendLineId::Fast;
        let size = self.config.position_size;

        for (i, bar) in bars.iter().enumerate() {
            let close = bar.close;
            let idx = i as i64;
            active = self.select_line(&state, close, active);

            let mut buy_price = f64::NAN;
            let mut sell_price = f64::NAN;

            let at_cutoff = bar.time.hour() >= SESSION_CUTOFF_HOUR
                && bar.time.minute() >= SESSION_CUTOFF_MINUTE;

            if at_cutoff {
                if state.open_size > 0 {
                    state.gross_profit += (close - state.open_price) * state.open_size as f64;
                    state.open_size = 0;
                    state.open_price = 0.0;
                    sell_price = close;
                }
            } else if state.open_size == 0
                && Self::can_buy(&self.fast, idx - 1)
                && !Self::can_sell(&self.medium, idx)
            {
                state.open_size = size;
                state.open_price = close;
                buy_price = close;
            } else if state.open_size > 0
                && Self::can_sell(self.line(active), idx - 1)
                && !Self::can_buy(&self.fast, idx)
            {
                state.gross_profit += (close - state.open_price) * state.open_size as f64;
                state.open_size = 0;
                state.open_price = 0.0;
                sell_price = close;
            }

            debug_assert!(state.is_well_formed(size));

            self.trace.push(GearBar {
                open_size: state.open_size,
                open_price: state.open_price,
                gross_profit: state.gross_profit,
                position_value: state.position_value(close),
                buy_price,
                sell_price,
                active_line: active,
                active_price: line_value(self.line(active), i),
            });
        }
    }
}

fn line_value(line: &[f64], index: usize) -> f64 {
    line.get(index).copied().unwrap_or(f64::NAN)
}

impl TrendTrace for Gear {
    fn len(&self) -> usize {
        self.trace.len()
    }

    fn active_price(&self, index: usize) -> f64 {
        self.trace[index].active_price
    }

    fn signals_at(&self, index: usize) -> KinematicsSample {
        let line = self.line(self.trace[index].active_line);
        kinematics::sample(line, index as i64)
    }

    fn open_size(&self, index: usize) -> i64 {
        self.trace[index].open_size
    }

    fn position_size(&self) -> i64 {
        self.config.position_size
    }
}
