use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::data::dataset::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Check a dataset before it is handed to the engine. Errors make the engine
/// refuse the dataset (or make a prediction ambiguous); warnings flag records
/// that can never be predicted or suspicious ordering.
pub fn validate_dataset(dataset: &Dataset) -> ValidationReport {
    let mut report = ValidationReport::default();

    if dataset.records.is_empty() {
        report.push(ValidationSeverity::Error, &dataset.name, "dataset has no records");
        return report;
    }

    let total = dataset
        .records
        .iter()
        .try_fold(0u64, |acc, record| acc.checked_add(record.count));
    match total {
        Some(0) => report.push(
            ValidationSeverity::Error,
            &dataset.name,
            "all counts are zero; probabilities are undefined",
        ),
        None => report.push(
            ValidationSeverity::Error,
            &dataset.name,
            "counts overflow a 64-bit total",
        ),
        Some(_) => {}
    }

    let mut seen = HashSet::new();
    for (index, record) in dataset.records.iter().enumerate() {
        let context = format!("record {} (category {})", index + 1, record.category);
        if !seen.insert(record.category) {
            report.push(ValidationSeverity::Error, &context, "duplicate category");
        }
        if record.count == 0 {
            report.push(
                ValidationSeverity::Warning,
                &context,
                "zero count; this category can never be predicted",
            );
        }
    }

    for (index, pair) in dataset.records.windows(2).enumerate() {
        if pair[1].category <= pair[0].category {
            report.push(
                ValidationSeverity::Warning,
                format!("record {}", index + 2),
                format!(
                    "category {} does not follow {}; records are expected in chronological order",
                    pair[1].category, pair[0].category
                ),
            );
        }
    }

    report.push(
        ValidationSeverity::Info,
        &dataset.name,
        format!("{} record(s)", dataset.records.len()),
    );
    report
}
