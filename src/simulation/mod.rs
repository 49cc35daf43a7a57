pub mod engine;
pub mod error;
pub mod frequency;
pub mod interval;
pub mod rng;

pub use engine::{
    DrawBounds, EngineConfig, Prediction, SimulationEngine, SimulationRun, SimulationStep,
    DRAW_LIMIT, MAX_DRAWS, MIN_DRAWS,
};
pub use error::{ErrorKind, SimulationError};
pub use frequency::{FrequencyEntry, FrequencyTable, HistoricalRecord, PROBABILITY_EPSILON};
pub use interval::{Interval, IntervalSlot, IntervalTable, DEFAULT_SCALE};
pub use rng::{scale_to_digit, CongruentialGenerator, Draw, GeneratorConfig};
