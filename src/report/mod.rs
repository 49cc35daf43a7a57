pub mod export_csv;
pub mod table;

use serde::Serialize;

use crate::simulation::{Prediction, SimulationEngine, SimulationRun, SimulationStep};

pub use export_csv::{export_run, frequency_csv, trace_csv, ExportError, ExportReport};
pub use table::{
    category_hits, frequency_rows, render_frequency_tsv, render_trace_tsv, CategoryHits,
    FrequencyRow,
};

/// Everything a presentation layer needs for one run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub dataset: String,
    pub generated_at: String,
    pub total: u64,
    pub frequency: Vec<FrequencyRow>,
    pub steps: Vec<SimulationStep>,
    pub hits: Vec<CategoryHits>,
    pub prediction: Prediction,
}

impl SimulationReport {
    pub fn new(dataset: &str, engine: &SimulationEngine, run: SimulationRun) -> Self {
        let hits = category_hits(engine, &run);
        Self {
            dataset: dataset.to_string(),
            generated_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            total: engine.frequencies().total(),
            frequency: frequency_rows(engine),
            steps: run.steps,
            hits,
            prediction: run.prediction,
        }
    }
}
