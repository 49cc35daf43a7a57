//! Empirical frequency table: turns historical (category, count) pairs into
//! probabilities and a running cumulative distribution.

use serde::{Deserialize, Serialize};

use crate::simulation::error::SimulationError;

/// Tolerance for "sums to one" checks on floating probabilities.
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// One observation of the series. `category` is the year; insertion order is
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(alias = "year", alias = "Year")]
    pub category: i32,
    #[serde(alias = "registrants", alias = "Registrants")]
    pub count: u64,
}

impl HistoricalRecord {
    pub const fn new(category: i32, count: u64) -> Self {
        Self { category, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub category: i32,
    pub count: u64,
    pub probability: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    total: u64,
    entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Build the table in input order. Rejects an empty dataset and an all-zero
    /// total instead of producing NaN probabilities.
    pub fn build(records: &[HistoricalRecord]) -> Result<Self, SimulationError> {
        if records.is_empty() {
            return Err(SimulationError::EmptyDataset);
        }
        let total = records
            .iter()
            .try_fold(0u64, |acc, record| acc.checked_add(record.count))
            .ok_or(SimulationError::CountOverflow)?;
        if total == 0 {
            return Err(SimulationError::ZeroTotal);
        }

        let mut cumulative = 0.0;
        let mut entries: Vec<FrequencyEntry> = records
            .iter()
            .map(|record| {
                let probability = record.count as f64 / total as f64;
                cumulative += probability;
                FrequencyEntry {
                    category: record.category,
                    count: record.count,
                    probability,
                    cumulative,
                }
            })
            .collect();

        // Summation drift would otherwise leave the last boundary at 0.9999999999.
        if let Some(last) = entries.last_mut() {
            if (last.cumulative - 1.0).abs() <= PROBABILITY_EPSILON {
                last.cumulative = 1.0;
            }
        }

        Ok(Self { total, entries })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FrequencyEntry> {
        self.entries.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn probabilities_follow_counts() {
        let table = FrequencyTable::build(&[
            HistoricalRecord::new(2020, 1),
            HistoricalRecord::new(2021, 3),
        ])
        .expect("non-zero dataset");

        assert_eq!(table.total(), 4);
        approx_eq(table.entries()[0].probability, 0.25, 1e-12);
        approx_eq(table.entries()[1].probability, 0.75, 1e-12);
        approx_eq(table.entries()[0].cumulative, 0.25, 1e-12);
        assert_eq!(table.entries()[1].cumulative, 1.0);
    }

    #[test]
    fn zero_count_keeps_cumulative_flat() {
        let table = FrequencyTable::build(&[
            HistoricalRecord::new(1, 5),
            HistoricalRecord::new(2, 0),
            HistoricalRecord::new(3, 5),
        ])
        .expect("non-zero dataset");

        assert_eq!(table.entries()[1].probability, 0.0);
        assert_eq!(table.entries()[0].cumulative, table.entries()[1].cumulative);
    }

    #[test]
    fn rejects_empty_and_all_zero() {
        assert_eq!(FrequencyTable::build(&[]), Err(SimulationError::EmptyDataset));
        assert_eq!(
            FrequencyTable::build(&[HistoricalRecord::new(1, 0), HistoricalRecord::new(2, 0)]),
            Err(SimulationError::ZeroTotal)
        );
    }
}
