pub mod batch;
pub mod pool;

pub use batch::{draw_counts, run_sweep, SweepEntry};
pub use pool::WorkerPool;
