//! Historical datasets: the built-in registrant series plus loaders for JSON,
//! YAML, CSV and XLSX files. Record order in the file is chronological order.

use std::fmt;
use std::fs;
use std::path::Path;

use calamine::Reader;
use serde::{Deserialize, Serialize};

use crate::simulation::HistoricalRecord;

pub const SAMPLE_DATASET_NAME: &str = "new-student-registrants";

/// Yearly new-student registrants, 2015 through 2024.
pub const SAMPLE_RECORDS: [HistoricalRecord; 10] = [
    HistoricalRecord::new(2015, 1383),
    HistoricalRecord::new(2016, 2293),
    HistoricalRecord::new(2017, 2634),
    HistoricalRecord::new(2018, 2707),
    HistoricalRecord::new(2019, 2734),
    HistoricalRecord::new(2020, 2872),
    HistoricalRecord::new(2021, 3396),
    HistoricalRecord::new(2022, 3700),
    HistoricalRecord::new(2023, 3715),
    HistoricalRecord::new(2024, 4670),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<HistoricalRecord>,
}

impl Dataset {
    pub fn sample() -> Self {
        Self {
            name: SAMPLE_DATASET_NAME.to_string(),
            records: SAMPLE_RECORDS.to_vec(),
        }
    }

    pub fn total(&self) -> u64 {
        self.records.iter().map(|record| record.count).sum()
    }
}

#[derive(Debug)]
pub enum DatasetError {
    Read(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Csv(csv::Error),
    Xlsx(calamine::Error),
    InvalidRow { row: usize, message: String },
    UnsupportedFormat(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read dataset: {err}"),
            Self::Json(err) => write!(f, "failed to parse dataset JSON: {err}"),
            Self::Yaml(err) => write!(f, "failed to parse dataset YAML: {err}"),
            Self::Csv(err) => write!(f, "failed to parse dataset CSV: {err}"),
            Self::Xlsx(err) => write!(f, "failed to read dataset workbook: {err}"),
            Self::InvalidRow { row, message } => write!(f, "row {row}: {message}"),
            Self::UnsupportedFormat(ext) => {
                write!(f, "unsupported dataset format '{ext}' (expected json, yaml, csv or xlsx)")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

/// Accepted JSON/YAML shapes: a bare record list or `{ name, records }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Records(Vec<HistoricalRecord>),
    Named {
        #[serde(default)]
        name: Option<String>,
        records: Vec<HistoricalRecord>,
    },
}

impl DatasetFile {
    fn into_dataset(self, fallback_name: String) -> Dataset {
        match self {
            Self::Records(records) => Dataset {
                name: fallback_name,
                records,
            },
            Self::Named { name, records } => Dataset {
                name: name.unwrap_or(fallback_name),
                records,
            },
        }
    }
}

/// Load a dataset, picking the parser from the file extension.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "json" => {
            let raw = fs::read_to_string(path).map_err(DatasetError::Read)?;
            parse_json(&raw, name)?
        }
        "yaml" | "yml" => {
            let raw = fs::read_to_string(path).map_err(DatasetError::Read)?;
            let file: DatasetFile = serde_yaml::from_str(&raw).map_err(DatasetError::Yaml)?;
            file.into_dataset(name)
        }
        "csv" => {
            let raw = fs::read_to_string(path).map_err(DatasetError::Read)?;
            Dataset {
                name,
                records: parse_csv(&raw)?,
            }
        }
        "xlsx" | "xls" | "xlsm" | "ods" => Dataset {
            name,
            records: read_from_workbook(path)?,
        },
        other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
    };

    tracing::debug!(
        path = %path.display(),
        records = dataset.records.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

pub fn parse_json(raw: &str, fallback_name: String) -> Result<Dataset, DatasetError> {
    let file: DatasetFile = serde_json::from_str(raw).map_err(DatasetError::Json)?;
    Ok(file.into_dataset(fallback_name))
}

/// Parse `category,count` rows (a `year,registrants` header is accepted too).
pub fn parse_csv(raw: &str) -> Result<Vec<HistoricalRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    reader
        .deserialize::<HistoricalRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatasetError::Csv)
}

fn read_from_workbook(path: &Path) -> Result<Vec<HistoricalRecord>, DatasetError> {
    let mut wb = calamine::open_workbook_auto(path).map_err(DatasetError::Xlsx)?;
    let names = wb.sheet_names();
    let Some(sheet_name) = names.first() else {
        return Ok(Vec::new());
    };
    let range = wb.worksheet_range(sheet_name).map_err(DatasetError::Xlsx)?;
    parse_sheet_rows(range.rows())
}

/// Category and count from the first two columns of each row. A leading
/// non-numeric row is treated as the header and blank rows are skipped.
pub fn parse_sheet_rows<'a, I>(rows: I) -> Result<Vec<HistoricalRecord>, DatasetError>
where
    I: IntoIterator<Item = &'a [calamine::Data]>,
{
    let mut records = Vec::new();
    for (row_index, row) in rows.into_iter().enumerate() {
        let row_number = row_index + 1;
        if row.iter().all(cell_is_empty) {
            continue;
        }
        let category = cell_to_i64(row.first());
        let count = cell_to_i64(row.get(1));
        match (category, count) {
            // Header row.
            (None, None) if row_index == 0 => continue,
            (Some(category), Some(count)) => {
                let category = i32::try_from(category).map_err(|_| DatasetError::InvalidRow {
                    row: row_number,
                    message: format!("category {category} is out of range"),
                })?;
                let count = u64::try_from(count).map_err(|_| DatasetError::InvalidRow {
                    row: row_number,
                    message: format!("count {count} is negative"),
                })?;
                records.push(HistoricalRecord::new(category, count));
            }
            _ => {
                return Err(DatasetError::InvalidRow {
                    row: row_number,
                    message: "expected integer category and count in the first two columns"
                        .to_string(),
                })
            }
        }
    }
    Ok(records)
}

fn cell_to_i64(d: Option<&calamine::Data>) -> Option<i64> {
    match d {
        Some(calamine::Data::Int(i)) => Some(*i),
        Some(calamine::Data::Float(f))
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
        {
            Some(*f as i64)
        }
        Some(calamine::Data::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_is_empty(d: &calamine::Data) -> bool {
    match d {
        calamine::Data::Empty => true,
        calamine::Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
