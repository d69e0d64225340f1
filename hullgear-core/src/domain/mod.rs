//! Domain types: bars and position ledgers.

pub mod bar;
pub mod ledger;

pub use bar::Bar;
pub use ledger::{BarOutcome, LedgerState};
