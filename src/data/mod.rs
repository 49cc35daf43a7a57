pub mod config;
pub mod dataset;
pub mod validate;

pub use config::{load_settings, resolve_settings, ConfigError, SimulationSettings};
pub use dataset::{load_dataset, Dataset, DatasetError};
pub use validate::{validate_dataset, ValidationReport, ValidationSeverity};
