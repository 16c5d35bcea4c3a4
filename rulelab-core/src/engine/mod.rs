//! Engine internals: ledger, constraints, trade lifecycle, and the bar loop.

pub mod constraints;
pub mod ledger;
pub mod lifecycle;
pub mod loop_runner;
pub mod state;

pub use constraints::square_off_reason;
pub use ledger::{FillReport, Ledger};
pub use lifecycle::TradeTracker;
pub use loop_runner::run_policy;
pub use state::{RunParams, RunResult};
