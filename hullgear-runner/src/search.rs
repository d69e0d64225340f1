//! Breadth-first gear path search.
//!
//! Enumerates gear assignments level by level: a path of length L fixes
//! the gear for the first L periods, and is scored by replaying it as a
//! scripted selector run cut off after those periods. Each level expands
//! every frontier path by every candidate gear and scores the children
//! in parallel; the rayon collect is the level barrier, so level L+1
//! never starts until all of level L is scored. Every third level the
//! frontier is pruned to the paths tied for the best prefix score.
//!
//! All shuffle order derives from the master seed, so a search is
//! reproducible regardless of thread count.

use rand::seq::SliceRandom;
use rayon::prelude::*;
use thiserror::Error;

use hullgear_core::domain::Bar;
use hullgear_core::gear::TrendTrace;
use hullgear_core::rng::SeedHierarchy;
use hullgear_core::selector::{GearScript, GearSelector, SelectorConfig, SelectorError};

/// Frontier prune cadence, in levels.
pub const PRUNE_INTERVAL: usize = 3;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to score path {path:?}: {source}")]
    Scoring {
        path: Vec<usize>,
        source: SelectorError,
    },

    #[error("no path scored finite at level {level}")]
    NoViablePath { level: usize },
}

/// A gear path together with its prefix score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPath {
    pub score: f64,
    pub path: Vec<usize>,
}

/// Outcome of a completed search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Winning path, one gear index per period.
    pub best: ScoredPath,
    /// Levels expanded (equals the period count).
    pub levels: usize,
    /// Total paths scored across all levels.
    pub scored_paths: usize,
}

pub struct PathSearch<'a, T: TrendTrace> {
    bars: &'a [Bar],
    gears: &'a [T],
    period: usize,
    seeds: SeedHierarchy,
}

impl<'a, T: TrendTrace + Sync> PathSearch<'a, T> {
    pub fn new(
        bars: &'a [Bar],
        gears: &'a [T],
        period: usize,
        seed: u64,
    ) -> Result<Self, SelectorError> {
        // feed/gear/period validation is the selector's; run it once up front
        GearSelector::new(bars, gears, SelectorConfig::greedy(period, seed))?;
        Ok(Self {
            bars,
            gears,
            period,
            seeds: SeedHierarchy::new(seed),
        })
    }

    /// Number of periods a full path must cover.
    pub fn period_count(&self) -> usize {
        self.bars.len().div_ceil(self.period)
    }

    /// Scores one path as a scripted run over its first `path.len()`
    /// periods.
    pub fn score_path(&self, path: &[usize]) -> Result<f64, SearchError> {
        let config = SelectorConfig::scripted(self.period, GearScript::new(path.to_vec()))
            .with_partial_run(path.len());
        let run = GearSelector::new(self.bars, self.gears, config)
            .and_then(|selector| selector.run())
            .map_err(|source| SearchError::Scoring {
                path: path.to_vec(),
                source,
            })?;
        Ok(run.score())
    }

    /// Runs the search to the full period count and returns the winner.
    ///
    /// Ties on the final score resolve to the lexicographically smallest
    /// path, so the winner is independent of shuffle order.
    pub fn search(&self) -> Result<SearchOutcome, SearchError> {
        let levels = self.period_count();
        let mut scored_paths = 0usize;

        let mut frontier: Vec<ScoredPath> = Vec::new();
        for level in 1..=levels {
            let candidates: Vec<Vec<usize>> = if level == 1 {
                (0..self.gears.len()).map(|gear| vec![gear]).collect()
            } else {
                frontier
                    .iter()
                    .flat_map(|parent| {
                        (0..self.gears.len()).map(|gear| {
                            let mut path = parent.path.clone();
                            path.push(gear);
                            path
                        })
                    })
                    .collect()
            };

            scored_paths += candidates.len();
            let mut scored: Vec<ScoredPath> = candidates
                .into_par_iter()
                .map(|path| {
                    let score = self.score_path(&path)?;
                    Ok(ScoredPath { score, path })
                })
                .collect::<Result<Vec<_>, SearchError>>()?;

            scored.retain(|candidate| !candidate.score.is_nan());
            if scored.is_empty() {
                return Err(SearchError::NoViablePath { level });
            }

            let mut rng = self.seeds.rng_for("frontier-level", level as u64);
            scored.shuffle(&mut rng);

            if level % PRUNE_INTERVAL == 0 {
                prune_to_best(&mut scored);
            }
            frontier = scored;
        }

        let best = frontier
            .into_iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .expect("NaN scores were filtered")
                    // on equal scores prefer the smaller path
                    .then_with(|| b.path.cmp(&a.path))
            })
            .expect("frontier is never left empty");

        Ok(SearchOutcome {
            best,
            levels,
            scored_paths,
        })
    }
}

/// Keeps only the paths tied for the maximum score.
fn prune_to_best(frontier: &mut Vec<ScoredPath>) {
    let top = frontier
        .iter()
        .map(|candidate| candidate.score)
        .fold(f64::NEG_INFINITY, f64::max);
    frontier.retain(|candidate| candidate.score == top);
}
