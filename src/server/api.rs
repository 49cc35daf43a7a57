use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::config::SimulationSettings;
use crate::data::dataset::Dataset;
use crate::parallel::{draw_counts, run_sweep, SweepEntry, WorkerPool};
use crate::report::{frequency_rows, FrequencyRow, SimulationReport};
use crate::simulation::{SimulationEngine, SimulationError};

/// Dataset, settings and engine shared by every request. Built once at startup
/// and only read afterwards.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub dataset: Dataset,
    pub settings: SimulationSettings,
    pub engine: SimulationEngine,
}

impl ApiContext {
    pub fn new(dataset: Dataset, settings: SimulationSettings) -> Result<Self, SimulationError> {
        let engine = SimulationEngine::new(&dataset.records, settings.engine_config())?;
        Ok(Self {
            dataset,
            settings,
            engine,
        })
    }

    /// Built-in registrant series with default settings.
    pub fn sample() -> Result<Self, SimulationError> {
        Self::new(Dataset::sample(), SimulationSettings::default())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub draws: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequencyResponse {
    pub status: &'static str,
    pub dataset: String,
    pub total: u64,
    pub scale: u32,
    pub rows: Vec<FrequencyRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub status: &'static str,
    pub dataset: String,
    pub results: Vec<SweepEntry>,
}

#[derive(Debug)]
pub enum SimulateError {
    Parse(serde_json::Error),
    Validation(String),
    Internal(String),
}

impl fmt::Display for SimulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Validation(m) => write!(f, "{m}"),
            Self::Internal(m) => write!(f, "{m}"),
        }
    }
}

impl std::error::Error for SimulateError {}

impl From<SimulationError> for SimulateError {
    fn from(err: SimulationError) -> Self {
        if err.is_invalid_input() {
            Self::Validation(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "mcforecast-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn dataset_payload(ctx: &ApiContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "name": ctx.dataset.name,
        "total": ctx.dataset.total(),
        "records": ctx.dataset.records,
    }))
}

pub fn frequency_payload(ctx: &ApiContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&FrequencyResponse {
        status: "ok",
        dataset: ctx.dataset.name.clone(),
        total: ctx.engine.frequencies().total(),
        scale: ctx.engine.intervals().scale(),
        rows: frequency_rows(&ctx.engine),
    })
}

/// `{"draws": n}`; a missing or empty body uses the configured default draw count.
pub fn simulate_payload(ctx: &ApiContext, body: &str) -> Result<String, SimulateError> {
    let draws = if body.trim().is_empty() {
        None
    } else {
        let req: SimulateRequest = serde_json::from_str(body).map_err(SimulateError::Parse)?;
        req.draws
    };
    let draws = draws.unwrap_or(ctx.settings.default_draws);

    let run = ctx.engine.run(draws)?;
    let report = SimulationReport::new(&ctx.dataset.name, &ctx.engine, run);
    encode(&serde_json::json!({
        "status": "ok",
        "draws": draws,
        "report": report,
    }))
}

pub fn sweep_payload(ctx: &ApiContext) -> Result<String, SimulateError> {
    let draws = draw_counts(ctx.settings.draws);
    let results = run_sweep(&ctx.engine, &draws, &WorkerPool::default())?;
    encode(&SweepResponse {
        status: "ok",
        dataset: ctx.dataset.name.clone(),
        results,
    })
}

/// Serialize a response body. Failures map to 500, not to a bad request.
fn encode<T: Serialize>(value: &T) -> Result<String, SimulateError> {
    serde_json::to_string_pretty(value).map_err(|err| SimulateError::Internal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn response_encoding_failure_is_internal() {
        // JSON object keys must be strings.
        let unencodable = BTreeMap::from([((1, 2), 3)]);
        assert!(matches!(encode(&unencodable), Err(SimulateError::Internal(_))));
    }

    #[test]
    fn malformed_request_body_is_a_parse_error() {
        let ctx = ApiContext::sample().expect("sample context");
        assert!(matches!(
            simulate_payload(&ctx, "{\"draws\": \"five\"}"),
            Err(SimulateError::Parse(_))
        ));
    }
}
