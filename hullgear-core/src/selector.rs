//! Gear selector — period-wise choice of the active gear and the single
//! committed ledger.
//!
//! The feed is split into fixed-length periods. At each period boundary
//! the selector either replays a scripted choice or greedily what-if
//! simulates every candidate over the period, seeded from the committed
//! boundary state, and keeps the best ending score. The chosen gear's
//! bars are then replayed for real against the committed ledger through
//! the *same* step function the what-if used, so commit and evaluation
//! agree bit-for-bit.
//!
//! What-if ledgers are private copies; the committed ledger has exactly
//! one writer. A `partial_run` cutoff skips the tail periods entirely,
//! which is what makes prefix scoring cheap for the path search.

use rand::seq::SliceRandom;
use std::ops::Range;
use thiserror::Error;

use crate::domain::{Bar, BarOutcome, LedgerState};
use crate::gear::TrendTrace;
use crate::rng::SeedHierarchy;

/// Errors from selector construction or a selector run.
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("scripted sequence has no gear for period {period} (length {len}, no fallback)")]
    SequenceExhausted { period: usize, len: usize },

    #[error("gear index {index} out of range for {count} candidates (period {period})")]
    GearIndexOutOfRange {
        index: usize,
        count: usize,
        period: usize,
    },

    #[error("bar feed is empty")]
    EmptyFeed,

    #[error("no candidate gears configured")]
    NoGears,

    #[error("period length must be >= 1")]
    InvalidPeriod,

    #[error("gear {gear} trace length {trace_len} does not match feed length {feed_len}")]
    TraceLengthMismatch {
        gear: usize,
        trace_len: usize,
        feed_len: usize,
    },
}

/// A scripted sequence of gear choices, one per period.
///
/// The optional fallback replaces the original's infinite default
/// generator: once explicit choices run out, `gear_at` yields the
/// fallback instead of iterating forever. Without a fallback, running
/// past the end is a configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearScript {
    choices: Vec<usize>,
    fallback: Option<usize>,
}

impl GearScript {
    pub fn new(choices: Vec<usize>) -> Self {
        Self {
            choices,
            fallback: None,
        }
    }

    pub fn with_fallback(choices: Vec<usize>, fallback: usize) -> Self {
        Self {
            choices,
            fallback: Some(fallback),
        }
    }

    /// Script that picks the same gear for every period.
    pub fn constant(gear: usize) -> Self {
        Self::with_fallback(Vec::new(), gear)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Gear for `period`, or `None` when the script is exhausted and no
    /// fallback is configured.
    pub fn gear_at(&self, period: usize) -> Option<usize> {
        self.choices.get(period).copied().or(self.fallback)
    }
}

/// How the selector picks a gear at each period boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Simulate every candidate over the period and keep the best score.
    Greedy,
    /// Replay a predetermined sequence.
    Scripted(GearScript),
}

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Bars per period. The final period of a bounded feed may be shorter.
    pub period: usize,
    pub mode: SelectionMode,
    /// Process only the first N periods; `None` runs the whole feed.
    pub partial_run: Option<usize>,
    /// Master seed for the greedy evaluation-order shuffle.
    pub seed: u64,
}

impl SelectorConfig {
    pub fn greedy(period: usize, seed: u64) -> Self {
        Self {
            period,
            mode: SelectionMode::Greedy,
            partial_run: None,
            seed,
        }
    }

    pub fn scripted(period: usize, script: GearScript) -> Self {
        Self {
            period,
            mode: SelectionMode::Scripted(script),
            partial_run: None,
            seed: 0,
        }
    }

    pub fn with_partial_run(mut self, periods: usize) -> Self {
        self.partial_run = Some(periods);
        self
    }
}

/// Result of a selector run: the committed ledger plus per-period choices.
#[derive(Debug, Clone)]
pub struct SelectorRun {
    /// One outcome row per committed bar.
    pub ledger: Vec<BarOutcome>,
    /// Chosen gear per processed period (`None` = no viable candidate).
    pub choices: Vec<Option<usize>>,
}

impl SelectorRun {
    /// Score at the cutoff bar: realized profit plus mark-to-market.
    pub fn score(&self) -> f64 {
        match self.ledger.last() {
            Some(row) => row.gross_profit + row.position_value,
            None => 0.0,
        }
    }

    pub fn final_state(&self) -> LedgerState {
        self.ledger
            .last()
            .map(|row| row.state())
            .unwrap_or_else(LedgerState::flat)
    }
}

/// Single-bar ledger transition, shared verbatim by what-if evaluation
/// and the committed replay.
///
/// The ledger is synced to the gear's precomputed standalone trace: the
/// trace going long while the ledger is flat is a buy, the trace going
/// flat while the ledger is long is a sell, and no gear at all closes any
/// open position. Fills and mark-to-market use the bar close.
fn step<T: TrendTrace>(
    bars: &[Bar],
    index: usize,
    gear: Option<(usize, &T)>,
    state: LedgerState,
) -> (LedgerState, BarOutcome) {
    let close = bars[index].close;
    let mut next = state;
    let mut buy_price = f64::NAN;
    let mut sell_price = f64::NAN;

    match gear {
        None => {
            if next.open_size > 0 {
                next.gross_profit += (close - next.open_price) * next.open_size as f64;
                next.open_size = 0;
                next.open_price = 0.0;
                sell_price = close;
            }
        }
        Some((_, trace)) => {
            let target = trace.open_size(index);
            if target > next.open_size && next.open_size == 0 {
                next.open_size = target;
                next.open_price = close;
                buy_price = close;
            } else if target < next.open_size && next.open_size > 0 {
                next.gross_profit += (close - next.open_price) * next.open_size as f64;
                next.open_size = 0;
                next.open_price = 0.0;
                sell_price = close;
            }
        }
    }

    if let Some((_, trace)) = gear {
        debug_assert!(
            next.is_well_formed(trace.position_size()),
            "ledger shape violated at bar {index}: {next:?}"
        );
    }

    let outcome = BarOutcome {
        gear: gear.map(|(index, _)| index),
        active_price: gear
            .map(|(_, trace)| trace.active_price(index))
            .unwrap_or(f64::NAN),
        buy_price,
        sell_price,
        open_size: next.open_size,
        open_price: next.open_price,
        gross_profit: next.gross_profit,
        position_value: next.position_value(close),
    };

    (next, outcome)
}

/// Fold `step` over a bar range from a seed state. Returns the ending
/// state and the last bar's mark-to-market — together they make the
/// period score.
fn simulate_span<T: TrendTrace>(
    bars: &[Bar],
    range: Range<usize>,
    gear: Option<(usize, &T)>,
    mut state: LedgerState,
) -> (LedgerState, f64) {
    let mut last_value = 0.0;
    for i in range {
        let (next, outcome) = step(bars, i, gear, state);
        state = next;
        last_value = outcome.position_value;
    }
    (state, last_value)
}

/// Period-wise gear selection over a bar feed.
#[derive(Debug)]
pub struct GearSelector<'a, T: TrendTrace> {
    bars: &'a [Bar],
    gears: &'a [T],
    config: SelectorConfig,
    seeds: SeedHierarchy,
}

impl<'a, T: TrendTrace> GearSelector<'a, T> {
    pub fn new(bars: &'a [Bar], gears: &'a [T], config: SelectorConfig) -> Result<Self, SelectorError> {
        if bars.is_empty() {
            return Err(SelectorError::EmptyFeed);
        }
        if gears.is_empty() {
            return Err(SelectorError::NoGears);
        }
        if config.period == 0 {
            return Err(SelectorError::InvalidPeriod);
        }
        for (index, gear) in gears.iter().enumerate() {
            if gear.len() != bars.len() {
                return Err(SelectorError::TraceLengthMismatch {
                    gear: index,
                    trace_len: gear.len(),
                    feed_len: bars.len(),
                });
            }
        }
        let seeds = SeedHierarchy::new(config.seed);
        Ok(Self {
            bars,
            gears,
            config,
            seeds,
        })
    }

    /// Number of periods in the full feed (the last may be short).
    pub fn period_count(&self) -> usize {
        self.bars.len().div_ceil(self.config.period)
    }

    /// Run selection and commit the ledger period by period.
    pub fn run(&self) -> Result<SelectorRun, SelectorError> {
        let total = self.period_count();
        let limit = match self.config.partial_run {
            Some(cut) => cut.min(total),
            None => total,
        };

        let mut ledger: Vec<BarOutcome> = Vec::with_capacity(limit * self.config.period);
        let mut choices = Vec::with_capacity(limit);
        let mut state = LedgerState::flat();

        for period in 0..limit {
            let range = self.period_range(period);
            let choice = self.choose(period, range.clone(), state)?;
            let gear = choice.map(|index| (index, &self.gears[index]));

            for i in range {
                let (next, outcome) = step(self.bars, i, gear, state);
                state = next;
                ledger.push(outcome);
            }
            choices.push(choice);
        }

        Ok(SelectorRun { ledger, choices })
    }

    fn period_range(&self, period: usize) -> Range<usize> {
        let start = period * self.config.period;
        let end = (start + self.config.period).min(self.bars.len());
        start..end
    }

    fn choose(
        &self,
        period: usize,
        range: Range<usize>,
        seed_state: LedgerState,
    ) -> Result<Option<usize>, SelectorError> {
        match &self.config.mode {
            SelectionMode::Scripted(script) => {
                let index =
                    script
                        .gear_at(period)
                        .ok_or_else(|| SelectorError::SequenceExhausted {
                            period,
                            len: script.len(),
                        })?;
                if index >= self.gears.len() {
                    return Err(SelectorError::GearIndexOutOfRange {
                        index,
                        count: self.gears.len(),
                        period,
                    });
                }
                Ok(Some(index))
            }
            SelectionMode::Greedy => Ok(self.choose_greedy(period, range, seed_state)),
        }
    }

    /// What-if simulate every candidate over the period, in a shuffled
    /// order, each from its own copy of the committed boundary state.
    ///
    /// Strict `>` keeps the first-seen candidate under the shuffled order
    /// on exact ties; the per-period sub-seed makes the tie-break
    /// reproducible. NaN scores are never winners; if no candidate scores
    /// finite, the period runs with no gear at all.
    fn choose_greedy(
        &self,
        period: usize,
        range: Range<usize>,
        seed_state: LedgerState,
    ) -> Option<usize> {
        let mut order: Vec<usize> = (0..self.gears.len()).collect();
        let mut rng = self.seeds.rng_for("greedy-period", period as u64);
        order.shuffle(&mut rng);

        let mut best: Option<(f64, usize)> = None;
        for index in order {
            let gear = Some((index, &self.gears[index]));
            let (state, last_value) = simulate_span(self.bars, range.clone(), gear, seed_state);
            let score = state.gross_profit + last_value;
            if score.is_nan() {
                continue;
            }
            best = match best {
                None => Some((score, index)),
                Some((top, _)) if score > top => Some((score, index)),
                keep => keep,
            };
        }
        best.map(|(_, index)| index)
    }
}
