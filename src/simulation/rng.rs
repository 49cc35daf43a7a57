//! Linear congruential generator for the forecast simulation.
//! Deterministic: the same parameters and seed produce the same sequence. Not cryptographically secure.

use serde::{Deserialize, Serialize};

use crate::simulation::error::SimulationError;

pub const DEFAULT_MULTIPLIER: u64 = 25;
pub const DEFAULT_INCREMENT: u64 = 15;
pub const DEFAULT_MODULUS: u64 = 99;
pub const DEFAULT_SEED: u64 = 50;

/// `z' = (a * z + c) mod m`, starting from `seed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub multiplier: u64,
    pub increment: u64,
    pub modulus: u64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            increment: DEFAULT_INCREMENT,
            modulus: DEFAULT_MODULUS,
            seed: DEFAULT_SEED,
        }
    }
}

impl GeneratorConfig {
    /// Checks positivity, `seed < modulus`, and that `a * (m - 1) + c` fits in a u64 so
    /// [CongruentialGenerator::next] never overflows.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.modulus == 0 {
            return Err(SimulationError::InvalidGenerator("modulus must be positive".into()));
        }
        if self.multiplier == 0 {
            return Err(SimulationError::InvalidGenerator("multiplier must be positive".into()));
        }
        if self.increment == 0 {
            return Err(SimulationError::InvalidGenerator("increment must be positive".into()));
        }
        if self.seed >= self.modulus {
            return Err(SimulationError::InvalidGenerator(format!(
                "seed {} must be below modulus {}",
                self.seed, self.modulus
            )));
        }
        self.multiplier
            .checked_mul(self.modulus - 1)
            .and_then(|product| product.checked_add(self.increment))
            .map(|_| ())
            .ok_or_else(|| {
                SimulationError::InvalidGenerator(
                    "multiplier * (modulus - 1) + increment overflows u64".into(),
                )
            })
    }
}

/// Values produced by a single generator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub seed_in: u64,
    pub raw: u64,
    pub modded: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CongruentialGenerator {
    config: GeneratorConfig,
    state: u64,
}

impl CongruentialGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            state: config.seed,
        })
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    pub fn modulus(&self) -> u64 {
        self.config.modulus
    }

    /// Advance one step and return the pre-step state alongside `a*z + c` and its residue.
    #[inline]
    pub fn next(&mut self) -> Draw {
        let seed_in = self.state;
        let raw = self.config.multiplier * seed_in + self.config.increment;
        let modded = raw % self.config.modulus;
        self.state = modded;
        Draw {
            seed_in,
            raw,
            modded,
        }
    }

    /// `floor(modded / m * target_scale)` in exact integer arithmetic.
    pub fn scale_to_digit(&self, modded: u64, target_scale: u32) -> u32 {
        scale_to_digit(modded, self.config.modulus, target_scale)
    }
}

/// Map a residue in `[0, modulus)` onto `[0, target_scale)`, flooring. Inputs at or
/// above the modulus clamp to `target_scale - 1`.
pub fn scale_to_digit(modded: u64, modulus: u64, target_scale: u32) -> u32 {
    if modulus == 0 || target_scale == 0 {
        return 0;
    }
    let scaled = u128::from(modded) * u128::from(target_scale) / u128::from(modulus);
    let max_digit = u128::from(target_scale - 1);
    scaled.min(max_digit) as u32
}
