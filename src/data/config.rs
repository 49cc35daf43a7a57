//! Simulation settings: generator parameters, interval scale and draw bounds.
//! Read from YAML or JSON; the default file is optional, an explicit one is not.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::simulation::{DrawBounds, EngineConfig, GeneratorConfig, DEFAULT_SCALE};

pub const DEFAULT_SETTINGS_PATH: &str = "data/simulation.yaml";
pub const SETTINGS_PATH_ENV: &str = "MCFORECAST_CONFIG";
pub const DEFAULT_DRAWS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub generator: GeneratorConfig,
    pub scale: u32,
    pub draws: DrawBounds,
    pub default_draws: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            scale: DEFAULT_SCALE,
            draws: DrawBounds::default(),
            default_draws: DEFAULT_DRAWS,
        }
    }
}

impl SimulationSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            generator: self.generator,
            scale: self.scale,
            draws: self.draws,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read settings: {err}"),
            Self::Json(err) => write!(f, "failed to parse settings JSON: {err}"),
            Self::Yaml(err) => write!(f, "failed to parse settings YAML: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load_settings(path: impl AsRef<Path>) -> Result<SimulationSettings, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(ConfigError::Read)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).map_err(ConfigError::Json)
    } else {
        serde_yaml::from_str(&raw).map_err(ConfigError::Yaml)
    }
}

/// Settings from `MCFORECAST_CONFIG` if set, else from [DEFAULT_SETTINGS_PATH] when that
/// file exists, else built-in defaults.
pub fn resolve_settings() -> Result<SimulationSettings, ConfigError> {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV) {
        return load_settings(path);
    }
    let default_path = Path::new(DEFAULT_SETTINGS_PATH);
    if default_path.exists() {
        load_settings(default_path)
    } else {
        Ok(SimulationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings: SimulationSettings =
            serde_yaml::from_str("default_draws: 7\n").expect("valid yaml");
        assert_eq!(settings.default_draws, 7);
        assert_eq!(settings.generator, GeneratorConfig::default());
        assert_eq!(settings.scale, 1000);
    }

    #[test]
    fn generator_block_overrides_parameters() {
        let settings: SimulationSettings = serde_yaml::from_str(
            "generator:\n  multiplier: 21\n  increment: 7\n  modulus: 100\n  seed: 3\n",
        )
        .expect("valid yaml");
        assert_eq!(settings.generator.multiplier, 21);
        assert_eq!(settings.generator.seed, 3);
        assert_eq!(settings.engine_config().generator.modulus, 100);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(matches!(
            load_settings("does/not/exist.yaml"),
            Err(ConfigError::Read(_))
        ));
    }
}
