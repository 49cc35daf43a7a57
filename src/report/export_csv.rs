//! CSV export of the frequency table and the simulation trace.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::report::table::FrequencyRow;
use crate::simulation::SimulationStep;

pub const FREQUENCY_FILE_NAME: &str = "frequency.csv";
pub const TRACE_FILE_NAME: &str = "trace.csv";

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to write export: {err}"),
            Self::Csv(err) => write!(f, "failed to encode CSV: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn frequency_csv(rows: &[FrequencyRow]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, rows)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn trace_csv(steps: &[SimulationStep]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, steps)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Paths written by [export_run].
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub frequency_path: PathBuf,
    pub trace_path: PathBuf,
    pub rows: usize,
    pub steps: usize,
}

/// Write `frequency.csv` and `trace.csv` into `out_dir`, creating it if needed.
pub fn export_run(
    out_dir: impl AsRef<Path>,
    rows: &[FrequencyRow],
    steps: &[SimulationStep],
) -> Result<ExportReport, ExportError> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let frequency_path = out_dir.join(FREQUENCY_FILE_NAME);
    write_csv(fs::File::create(&frequency_path)?, rows)?;

    let trace_path = out_dir.join(TRACE_FILE_NAME);
    write_csv(fs::File::create(&trace_path)?, steps)?;

    tracing::info!(
        frequency = %frequency_path.display(),
        trace = %trace_path.display(),
        "exported simulation"
    );
    Ok(ExportReport {
        frequency_path,
        trace_path,
        rows: rows.len(),
        steps: steps.len(),
    })
}
