//! Run result: the committed ledger trace plus summary statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hullgear_core::domain::{Bar, BarOutcome};

use crate::config::{RunConfig, RunId};

/// Bumped whenever the serialized result layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a run.
///
/// Contains the per-bar ledger trace, per-period gear choices, summary
/// statistics, and the config that produced it (for reruns and artifact
/// inspection). `run_id` is the config hash, so identical configs map to
/// identical artifact names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub schema_version: u32,

    /// Config hash identifying this run.
    pub run_id: RunId,

    /// When the run was executed.
    pub created_at: DateTime<Utc>,

    /// The config that produced this result.
    pub config: RunConfig,

    /// Final score: realized profit plus mark-to-market at the last bar.
    pub score: f64,

    /// Chosen gear per period (`None` = the period ran with no gear).
    pub choices: Vec<Option<usize>>,

    /// One row per bar of the committed ledger.
    pub trace: Vec<TraceRow>,

    pub stats: RunStats,
}

/// One committed ledger row, keyed by bar time.
///
/// Trade marks and the active trend line are `None` where undefined
/// (no fill on the bar, no gear active) so the rows serialize cleanly
/// to both JSON and CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceRow {
    pub time: DateTime<Utc>,
    pub close: f64,
    pub gear: Option<usize>,
    pub active_price: Option<f64>,
    pub buy_price: Option<f64>,
    pub sell_price: Option<f64>,
    pub open_size: i64,
    pub open_price: f64,
    pub gross_profit: f64,
    pub position_value: f64,
}

impl TraceRow {
    pub fn from_outcome(bar: &Bar, outcome: &BarOutcome) -> Self {
        Self {
            time: bar.time,
            close: bar.close,
            gear: outcome.gear,
            active_price: finite(outcome.active_price),
            buy_price: finite(outcome.buy_price),
            sell_price: finite(outcome.sell_price),
            open_size: outcome.open_size,
            open_price: outcome.open_price,
            gross_profit: outcome.gross_profit,
            position_value: outcome.position_value,
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Summary statistics over a run's trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunStats {
    pub bars: usize,
    pub periods: usize,
    pub buys: usize,
    pub sells: usize,
    /// Realized profit at the last bar.
    pub gross_profit: f64,
    /// Mark-to-market of any still-open position at the last bar.
    pub final_position_value: f64,
}

impl RunStats {
    pub fn from_trace(trace: &[TraceRow], periods: usize) -> Self {
        let buys = trace.iter().filter(|row| row.buy_price.is_some()).count();
        let sells = trace.iter().filter(|row| row.sell_price.is_some()).count();
        let (gross_profit, final_position_value) = trace
            .last()
            .map(|row| (row.gross_profit, row.position_value))
            .unwrap_or((0.0, 0.0));

        Self {
            bars: trace.len(),
            periods,
            buys,
            sells,
            gross_profit,
            final_position_value,
        }
    }
}
