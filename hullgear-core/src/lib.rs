//! Hullgear Core — engine, domain types, trend lines, gear selection.
//!
//! This crate contains the heart of the gear-shifting backtester:
//! - Domain types (bars, position ledgers)
//! - WMA/Hull-MA trend lines over typical price
//! - The kinematics stack (speed/accel/jerk/jounce finite differences)
//! - Per-gear trend simulation with the buy/sell state machine
//! - The period-wise gear selector (greedy what-if scoring or scripted
//!   replay) with its single committed ledger
//! - A BLAKE3-based seed hierarchy for reproducible shuffles

pub mod domain;
pub mod gear;
pub mod indicators;
pub mod kinematics;
pub mod rng;
pub mod selector;
