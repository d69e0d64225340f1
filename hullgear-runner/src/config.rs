//! Serializable run configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hullgear_core::gear::{GearConfig, GearParams};
use hullgear_core::selector::{GearScript, SelectionMode};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Candidate gear grid: the cartesian product of the h1 and h2 period
/// lists. The original sweep used `range(3, 40, 8)` on both axes,
/// which is the default here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GearGrid {
    pub h1: Vec<usize>,
    pub h2: Vec<usize>,
}

impl Default for GearGrid {
    fn default() -> Self {
        Self {
            h1: vec![3, 11, 19, 27, 35],
            h2: vec![3, 11, 19, 27, 35],
        }
    }
}

impl GearGrid {
    /// Total number of candidate gears in this grid.
    pub fn size(&self) -> usize {
        self.h1.len() * self.h2.len()
    }

    /// All (h1, h2) pairs, h1-major, in a stable order — gear indices in
    /// scripts and search paths refer to this ordering.
    pub fn params(&self) -> Vec<GearParams> {
        let mut out = Vec::with_capacity(self.size());
        for &h1 in &self.h1 {
            for &h2 in &self.h2 {
                out.push(GearParams { h1, h2 });
            }
        }
        out
    }
}

/// Selection mode configuration (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeConfig {
    /// Per-period greedy what-if selection.
    Greedy,

    /// Replay a predetermined gear sequence, optionally falling back to
    /// a constant gear past its end.
    Scripted {
        sequence: Vec<usize>,
        #[serde(default)]
        fallback: Option<usize>,
    },
}

impl ModeConfig {
    pub fn to_selection_mode(&self) -> SelectionMode {
        match self {
            ModeConfig::Greedy => SelectionMode::Greedy,
            ModeConfig::Scripted { sequence, fallback } => match fallback {
                Some(gear) => {
                    SelectionMode::Scripted(GearScript::with_fallback(sequence.clone(), *gear))
                }
                None => SelectionMode::Scripted(GearScript::new(sequence.clone())),
            },
        }
    }
}

/// Complete configuration for a run.
///
/// Captures everything needed to reproduce a result: the period length,
/// the candidate grid, ledger constants, the feed lead-in, the selection
/// mode and the master seed. Two identical configs hash to the same
/// `RunId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Bars per selection period.
    #[serde(default = "default_period")]
    pub period: usize,

    /// Fixed position size.
    #[serde(default = "default_position_size")]
    pub position_size: i64,

    /// Stop-profit threshold for the display-line ratio.
    #[serde(default = "default_stop_profit")]
    pub stop_profit: f64,

    /// Period of every gear's slow (third) trend line.
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,

    /// Synthetic lead-in bars prepended by the feed loader.
    #[serde(default = "default_lead_in")]
    pub lead_in: usize,

    /// Master seed for all shuffles (greedy order, frontier order).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Truncate runs to the first N periods (mostly for diagnostics;
    /// the path search sets its own cutoffs).
    #[serde(default)]
    pub partial_run: Option<usize>,

    /// Candidate gear grid.
    #[serde(default)]
    pub grid: GearGrid,

    /// Selection mode.
    #[serde(default = "default_mode")]
    pub mode: ModeConfig,
}

fn default_period() -> usize {
    20
}
fn default_position_size() -> i64 {
    300
}
fn default_stop_profit() -> f64 {
    0.05
}
fn default_slow_period() -> usize {
    16
}
fn default_lead_in() -> usize {
    24
}
fn default_seed() -> u64 {
    42
}
fn default_mode() -> ModeConfig {
    ModeConfig::Greedy
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            position_size: default_position_size(),
            stop_profit: default_stop_profit(),
            slow_period: default_slow_period(),
            lead_in: default_lead_in(),
            seed: default_seed(),
            partial_run: None,
            grid: GearGrid::default(),
            mode: default_mode(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::Invalid("period must be >= 1".into()));
        }
        if self.grid.h1.is_empty() || self.grid.h2.is_empty() {
            return Err(ConfigError::Invalid("gear grid must not be empty".into()));
        }
        if self.grid.h1.iter().chain(&self.grid.h2).any(|&h| h == 0) {
            return Err(ConfigError::Invalid("smoothing periods must be >= 1".into()));
        }
        if self.slow_period == 0 {
            return Err(ConfigError::Invalid("slow_period must be >= 1".into()));
        }
        if self.position_size <= 0 {
            return Err(ConfigError::Invalid("position_size must be > 0".into()));
        }
        if !(self.stop_profit > 0.0) {
            return Err(ConfigError::Invalid("stop_profit must be > 0".into()));
        }
        if self.partial_run == Some(0) {
            return Err(ConfigError::Invalid("partial_run must be >= 1".into()));
        }
        if let ModeConfig::Scripted { sequence, fallback } = &self.mode {
            let count = self.grid.size();
            for &gear in sequence.iter().chain(fallback.iter()) {
                if gear >= count {
                    return Err(ConfigError::Invalid(format!(
                        "scripted gear index {gear} out of range for a {count}-gear grid"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Settings shared by every gear in this run.
    pub fn gear_config(&self) -> GearConfig {
        GearConfig {
            slow_period: self.slow_period,
            position_size: self.position_size,
            stop_profit: self.stop_profit,
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Enables artifact naming and result de-duplication: two runs with
    /// identical configs share the same RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
