//! Run orchestration for the hullgear engine: config, feed loading,
//! path search, and artifact export on top of `hullgear-core`.

pub mod config;
pub mod export;
pub mod feed;
pub mod result;
pub mod runner;
pub mod search;

pub use config::{ConfigError, GearGrid, ModeConfig, RunConfig, RunId};
pub use result::{BacktestResult, RunStats, TraceRow, SCHEMA_VERSION};
pub use runner::{build_gears, run_search, run_selection, RunError};
pub use search::{PathSearch, ScoredPath, SearchError, SearchOutcome};
