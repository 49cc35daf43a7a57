//! Monte Carlo forecast engine: draws from the congruential generator, scales
//! each residue onto the interval table and records the predicted category.
//!
//! Frequency and interval tables are built once in [SimulationEngine::new] and
//! only read afterwards; every [SimulationEngine::run] owns a freshly seeded
//! generator, so runs are reproducible and can execute concurrently.

use serde::{Deserialize, Serialize};

use crate::simulation::error::SimulationError;
use crate::simulation::frequency::{FrequencyTable, HistoricalRecord};
use crate::simulation::interval::{IntervalTable, DEFAULT_SCALE};
use crate::simulation::rng::{CongruentialGenerator, GeneratorConfig};

pub const MIN_DRAWS: u32 = 1;
pub const MAX_DRAWS: u32 = 20;
/// Largest upper draw bound a configuration may declare.
pub const DRAW_LIMIT: u32 = 10_000;

/// Accepted draw counts, inclusive. Requests outside are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for DrawBounds {
    fn default() -> Self {
        Self {
            min: MIN_DRAWS,
            max: MAX_DRAWS,
        }
    }
}

impl DrawBounds {
    pub fn check(&self, draws: u32) -> Result<(), SimulationError> {
        if (self.min..=self.max).contains(&draws) {
            Ok(())
        } else {
            Err(SimulationError::DrawCountOutOfRange {
                requested: draws,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub generator: GeneratorConfig,
    pub scale: u32,
    pub draws: DrawBounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            scale: DEFAULT_SCALE,
            draws: DrawBounds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationStep {
    pub index: u32,
    pub seed_in: u64,
    pub raw: u64,
    pub modded: u64,
    pub scaled_digit: u32,
    /// Dataset position of the predicted entry; tells duplicate categories apart.
    #[serde(skip)]
    pub predicted_position: usize,
    pub predicted_category: i32,
    /// Historical count of the predicted category.
    pub predicted_count: u64,
}

/// Headline forecast taken from the final step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub category: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationRun {
    pub draws: u32,
    pub steps: Vec<SimulationStep>,
    pub prediction: Prediction,
}

#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: EngineConfig,
    frequencies: FrequencyTable,
    intervals: IntervalTable,
}

impl SimulationEngine {
    pub fn new(records: &[HistoricalRecord], config: EngineConfig) -> Result<Self, SimulationError> {
        config.generator.validate()?;
        if config.draws.min == 0
            || config.draws.min > config.draws.max
            || config.draws.max > DRAW_LIMIT
        {
            return Err(SimulationError::InvalidDrawBounds {
                min: config.draws.min,
                max: config.draws.max,
            });
        }
        let frequencies = FrequencyTable::build(records)?;
        let intervals = IntervalTable::assign(&frequencies, config.scale)?;
        tracing::debug!(
            records = records.len(),
            total = frequencies.total(),
            scale = config.scale,
            "built frequency and interval tables"
        );
        Ok(Self {
            config,
            frequencies,
            intervals,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn intervals(&self) -> &IntervalTable {
        &self.intervals
    }

    /// Run `draws` generator steps from the configured seed.
    pub fn run(&self, draws: u32) -> Result<SimulationRun, SimulationError> {
        self.config.draws.check(draws)?;
        let mut rng = CongruentialGenerator::new(self.config.generator)?;
        let mut steps = Vec::with_capacity(draws as usize);

        for index in 1..=draws {
            let draw = rng.next();
            let scaled_digit = rng.scale_to_digit(draw.modded, self.config.scale);
            let slot = self.intervals.lookup(scaled_digit).inspect_err(|err| {
                tracing::error!(index, scaled_digit, %err, "interval lookup failed");
            })?;
            steps.push(SimulationStep {
                index,
                seed_in: draw.seed_in,
                raw: draw.raw,
                modded: draw.modded,
                scaled_digit,
                predicted_position: slot.position,
                predicted_category: slot.category,
                predicted_count: slot.count,
            });
        }

        let prediction = steps
            .last()
            .map(|step| Prediction {
                category: step.predicted_category,
                count: step.predicted_count,
            })
            .ok_or(SimulationError::DrawCountOutOfRange {
                requested: draws,
                min: self.config.draws.min,
                max: self.config.draws.max,
            })?;

        tracing::debug!(
            draws,
            category = prediction.category,
            count = prediction.count,
            "simulation finished"
        );

        Ok(SimulationRun {
            draws,
            steps,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SimulationEngine {
        let records = [
            HistoricalRecord::new(2001, 1),
            HistoricalRecord::new(2002, 1),
        ];
        SimulationEngine::new(&records, EngineConfig::default()).expect("valid engine")
    }

    #[test]
    fn bounds_are_strict() {
        let engine = engine();
        assert!(engine.run(0).is_err());
        assert!(engine.run(21).is_err());
        assert_eq!(engine.run(1).map(|run| run.steps.len()), Ok(1));
        assert_eq!(engine.run(20).map(|run| run.steps.len()), Ok(20));
    }

    #[test]
    fn first_step_uses_seed() {
        let run = engine().run(1).expect("run should succeed");
        let step = run.steps[0];
        assert_eq!(step.index, 1);
        assert_eq!(step.seed_in, 50);
        assert_eq!(step.raw, 1265);
        assert_eq!(step.modded, 77);
        assert_eq!(step.scaled_digit, 777);
        assert_eq!(step.predicted_category, 2002);
        assert_eq!(run.prediction.category, 2002);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = EngineConfig {
            draws: DrawBounds { min: 5, max: 2 },
            ..EngineConfig::default()
        };
        assert!(SimulationEngine::new(&[HistoricalRecord::new(1, 1)], config).is_err());
    }

    #[test]
    fn oversized_upper_bound_is_rejected() {
        let config = EngineConfig {
            draws: DrawBounds {
                min: 1,
                max: 4_000_000_000,
            },
            ..EngineConfig::default()
        };
        assert_eq!(
            SimulationEngine::new(&[HistoricalRecord::new(1, 1)], config).err(),
            Some(SimulationError::InvalidDrawBounds {
                min: 1,
                max: 4_000_000_000
            })
        );

        let at_limit = EngineConfig {
            draws: DrawBounds {
                min: 1,
                max: DRAW_LIMIT,
            },
            ..EngineConfig::default()
        };
        assert!(SimulationEngine::new(&[HistoricalRecord::new(1, 1)], at_limit).is_ok());
    }

    #[test]
    fn steps_record_dataset_position() {
        let records = [
            HistoricalRecord::new(2001, 1),
            HistoricalRecord::new(2001, 1),
        ];
        let engine = SimulationEngine::new(&records, EngineConfig::default()).expect("valid engine");
        let run = engine.run(3).expect("run should succeed");
        // 777, 595, 50 over intervals 0-499 and 500-999.
        let positions: Vec<usize> = run.steps.iter().map(|step| step.predicted_position).collect();
        assert_eq!(positions, vec![1, 1, 0]);
    }
}
