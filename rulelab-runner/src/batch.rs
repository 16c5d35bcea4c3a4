//! Batch execution — many isolated runs in parallel.
//!
//! Each job owns its config and bar series; runs share no mutable state, so
//! they parallelize without locks. Failures stay per-job: one rejected config
//! does not poison the batch.

use rayon::prelude::*;

use rulelab_core::domain::Bar;

use crate::config::BacktestConfig;
use crate::result::BacktestResult;
use crate::runner::{run_backtest, RunError};

/// One unit of batch work.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub config: BacktestConfig,
    pub bars: Vec<Bar>,
}

/// Run every job, in parallel, preserving input order in the output.
pub fn run_batch(jobs: &[BatchJob]) -> Vec<Result<BacktestResult, RunError>> {
    jobs.par_iter()
        .map(|job| run_backtest(&job.config, &job.bars))
        .collect()
}
