//! Monte Carlo forecasting of an integer-valued yearly series.
//!
//! Historical counts become an empirical distribution ([simulation::FrequencyTable]),
//! whose cumulative probabilities are laid out as integer intervals over `0..1000`
//! ([simulation::IntervalTable]). A linear congruential generator
//! ([simulation::CongruentialGenerator]) produces digits that
//! [simulation::SimulationEngine] maps back onto historical outcomes.

pub mod cli;
pub mod data;
pub mod logging;
pub mod parallel;
pub mod report;
pub mod server;
pub mod simulation;
