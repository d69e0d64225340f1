//! Run orchestration — wires the feed, the gear grid, the selector and
//! the path search together.
//!
//! Two entry points:
//! - `run_selection()`: one selector pass (greedy or scripted) over the
//!   configured grid. Used by `hullgear run`.
//! - `run_search()`: full path search, then an uncut replay of the
//!   winning path. Used by `hullgear search`.

use chrono::Utc;
use rayon::prelude::*;
use thiserror::Error;

use hullgear_core::domain::Bar;
use hullgear_core::gear::Gear;
use hullgear_core::selector::{GearScript, GearSelector, SelectorConfig, SelectorError, SelectorRun};

use crate::config::{ConfigError, RunConfig};
use crate::feed::{prepend_lead_in, FeedError};
use crate::result::{BacktestResult, RunStats, TraceRow, SCHEMA_VERSION};
use crate::search::{PathSearch, SearchError, SearchOutcome};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("selector error: {0}")]
    Selector(#[from] SelectorError),
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Precomputes one standalone gear trace per grid point, in parallel.
///
/// Gear order follows `GearGrid::params()`, so gear indices are stable
/// across runs of the same config.
pub fn build_gears(bars: &[Bar], config: &RunConfig) -> Vec<Gear> {
    let gear_config = config.gear_config();
    config
        .grid
        .params()
        .into_par_iter()
        .map(|params| Gear::new(params, gear_config, bars))
        .collect()
}

/// Runs one selector pass over the configured grid and packages the
/// committed ledger as a result.
pub fn run_selection(config: &RunConfig, bars: &[Bar]) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let bars = prepend_lead_in(bars, config.lead_in)?;
    let gears = build_gears(&bars, config);

    let selector_config = SelectorConfig {
        period: config.period,
        mode: config.mode.to_selection_mode(),
        partial_run: config.partial_run,
        seed: config.seed,
    };
    let run = GearSelector::new(&bars, &gears, selector_config)?.run()?;
    Ok(package(config, &bars, run))
}

/// Runs the path search over the configured grid, then replays the
/// winning path uncut so the result carries its full ledger trace.
///
/// The replay goes through the same scripted selector the search scored
/// with, so the result's score equals the search score exactly.
pub fn run_search(
    config: &RunConfig,
    bars: &[Bar],
) -> Result<(BacktestResult, SearchOutcome), RunError> {
    config.validate()?;
    let bars = prepend_lead_in(bars, config.lead_in)?;
    let gears = build_gears(&bars, config);

    let search = PathSearch::new(&bars, &gears, config.period, config.seed)?;
    let outcome = search.search()?;

    let script = GearScript::new(outcome.best.path.clone());
    let replay_config = SelectorConfig::scripted(config.period, script);
    let run = GearSelector::new(&bars, &gears, replay_config)?.run()?;

    let result = package(config, &bars, run);
    Ok((result, outcome))
}

fn package(config: &RunConfig, bars: &[Bar], run: SelectorRun) -> BacktestResult {
    let trace: Vec<TraceRow> = bars
        .iter()
        .zip(run.ledger.iter())
        .map(|(bar, outcome)| TraceRow::from_outcome(bar, outcome))
        .collect();
    let stats = RunStats::from_trace(&trace, run.choices.len());

    BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        created_at: Utc::now(),
        config: config.clone(),
        score: run.score(),
        choices: run.choices,
        trace,
        stats,
    }
}
