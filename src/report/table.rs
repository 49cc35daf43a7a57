//! Display rows for the frequency table and the simulation trace, plus the
//! tab-separated rendering used by the CLI `--table` mode.

use std::fmt::Write as _;

use serde::Serialize;

use crate::simulation::{SimulationEngine, SimulationRun, SimulationStep};

/// Shown in the interval column for categories that own no digits.
pub const EMPTY_INTERVAL: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub no: usize,
    pub category: i32,
    pub count: u64,
    pub probability: f64,
    pub cumulative: f64,
    pub interval: String,
}

/// Frequency entries joined with their intervals, numbered from 1.
pub fn frequency_rows(engine: &SimulationEngine) -> Vec<FrequencyRow> {
    engine
        .frequencies()
        .entries()
        .iter()
        .zip(engine.intervals().slots())
        .enumerate()
        .map(|(index, (entry, slot))| FrequencyRow {
            no: index + 1,
            category: entry.category,
            count: entry.count,
            probability: entry.probability,
            cumulative: entry.cumulative,
            interval: slot
                .interval
                .map(|interval| interval.to_string())
                .unwrap_or_else(|| EMPTY_INTERVAL.to_string()),
        })
        .collect()
}

/// How often each category was predicted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryHits {
    pub category: i32,
    pub count: u64,
    pub hits: u32,
}

/// Hit counts in dataset order; categories never predicted are listed with zero.
pub fn category_hits(engine: &SimulationEngine, run: &SimulationRun) -> Vec<CategoryHits> {
    engine
        .frequencies()
        .entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| CategoryHits {
            category: entry.category,
            count: entry.count,
            hits: run
                .steps
                .iter()
                .filter(|step| step.predicted_position == position)
                .count() as u32,
        })
        .collect()
}

pub fn render_frequency_tsv(rows: &[FrequencyRow]) -> String {
    let mut out = String::from("no\tcategory\tcount\tprobability\tcumulative\tinterval\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{:.6}\t{:.6}\t{}",
            row.no, row.category, row.count, row.probability, row.cumulative, row.interval
        );
    }
    out
}

pub fn render_trace_tsv(steps: &[SimulationStep]) -> String {
    let mut out = String::from("index\tseed_in\traw\tmodded\tscaled_digit\tpredicted_category\tpredicted_count\n");
    for step in steps {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            step.index,
            step.seed_in,
            step.raw,
            step.modded,
            step.scaled_digit,
            step.predicted_category,
            step.predicted_count
        );
    }
    out
}
