//! Integer interval assignment over a fixed-resolution scale.
//!
//! Every entry of a [FrequencyTable] is given a contiguous sub-range of
//! `[0, scale - 1]`. Bounds are chained from the previous entry rather than
//! recomputed from the cumulative value, and the final occupied interval is
//! stretched to `scale - 1`, so the table is a strict partition of the scale.

use std::fmt;

use serde::Serialize;

use crate::simulation::error::SimulationError;
use crate::simulation::frequency::FrequencyTable;

/// Three-digit resolution used by the registrant forecast.
pub const DEFAULT_SCALE: u32 = 1000;

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub lower_bound: u32,
    pub upper_bound: u32,
}

impl Interval {
    pub fn contains(&self, value: u32) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    pub fn width(&self) -> u32 {
        self.upper_bound - self.lower_bound + 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower_bound, self.upper_bound)
    }
}

/// One row of the interval table. `interval` is `None` when the entry's share of
/// the scale rounds to nothing; such a category can never be predicted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalSlot {
    /// Position of the entry in the dataset.
    pub position: usize,
    pub category: i32,
    pub count: u64,
    pub interval: Option<Interval>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalTable {
    scale: u32,
    slots: Vec<IntervalSlot>,
    /// Indices into `slots` of the non-empty intervals, ascending by bound.
    #[serde(skip)]
    occupied: Vec<usize>,
}

impl IntervalTable {
    pub fn assign(table: &FrequencyTable, scale: u32) -> Result<Self, SimulationError> {
        if scale == 0 {
            return Err(SimulationError::InvalidScale(scale));
        }
        if table.is_empty() {
            return Err(SimulationError::EmptyDataset);
        }

        let last_index = table.len() - 1;
        let mut cursor = 0u32;
        let mut slots = Vec::with_capacity(table.len());
        let mut occupied = Vec::with_capacity(table.len());

        for (index, entry) in table.entries().iter().enumerate() {
            let end = if index == last_index {
                scale
            } else {
                let rounded = (entry.cumulative * f64::from(scale)).round();
                (rounded.max(0.0) as u32).min(scale)
            };

            let interval = if entry.count == 0 || end <= cursor {
                None
            } else {
                let interval = Interval {
                    lower_bound: cursor,
                    upper_bound: end - 1,
                };
                cursor = end;
                occupied.push(index);
                Some(interval)
            };

            slots.push(IntervalSlot {
                position: index,
                category: entry.category,
                count: entry.count,
                interval,
            });
        }

        // Trailing zero-count entries leave the tail uncovered; the last occupied
        // interval absorbs it.
        if cursor < scale {
            let Some(&tail) = occupied.last() else {
                return Err(SimulationError::ZeroTotal);
            };
            if let Some(interval) = slots[tail].interval.as_mut() {
                interval.upper_bound = scale - 1;
            }
        }

        Ok(Self {
            scale,
            slots,
            occupied,
        })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn slots(&self) -> &[IntervalSlot] {
        &self.slots
    }

    /// Find the slot whose interval contains `digit`.
    pub fn lookup(&self, digit: u32) -> Result<&IntervalSlot, SimulationError> {
        let position = self.occupied.partition_point(|&index| {
            self.slots[index]
                .interval
                .is_some_and(|interval| interval.upper_bound < digit)
        });

        self.occupied
            .get(position)
            .map(|&index| &self.slots[index])
            .filter(|slot| slot.interval.is_some_and(|interval| interval.contains(digit)))
            .ok_or(SimulationError::IntervalNotFound { digit })
    }
}
