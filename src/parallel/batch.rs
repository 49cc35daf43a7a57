//! Independent runs over several draw counts.
//!
//! Each run owns its generator and only reads the shared engine, so runs are
//! distributed across the pool freely. Output order matches input order.

use rayon::prelude::*;
use serde::Serialize;

use crate::parallel::pool::WorkerPool;
use crate::simulation::{DrawBounds, Prediction, SimulationEngine, SimulationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepEntry {
    pub draws: u32,
    pub prediction: Prediction,
}

/// Every draw count in `bounds`, ascending.
pub fn draw_counts(bounds: DrawBounds) -> Vec<u32> {
    (bounds.min..=bounds.max).collect()
}

/// Headline prediction for each requested draw count. The first failing run aborts the sweep.
pub fn run_sweep(
    engine: &SimulationEngine,
    draws: &[u32],
    pool: &WorkerPool,
) -> Result<Vec<SweepEntry>, SimulationError> {
    pool.install(|| {
        draws
            .par_iter()
            .map(|&n| {
                engine.run(n).map(|run| SweepEntry {
                    draws: n,
                    prediction: run.prediction,
                })
            })
            .collect()
    })
}
