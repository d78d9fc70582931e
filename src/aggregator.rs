//! Fleet-wide reading history, rolling statistics and the pollution map.

use std::collections::BTreeMap;

use crate::history::History;
use crate::models::{round2, MapEntry, Reading, StatsSnapshot, Thresholds};
use crate::mote::Mote;

// ---

/// Readings kept in the global history.
pub const GLOBAL_HISTORY_CAPACITY: usize = 1000;

/// Size of the window `statistics()` is computed over.
pub const STATS_WINDOW: usize = 100;

#[derive(Debug, Clone)]
pub struct Aggregator {
    // ---
    history: History<Reading>,
    total_ingested: u64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            history: History::with_capacity(GLOBAL_HISTORY_CAPACITY),
            total_ingested: 0,
        }
    }

    /// Append to the global history, evicting the oldest reading past capacity.
    pub fn ingest(&mut self, reading: Reading) {
        // ---
        self.history.push(reading);
        self.total_ingested += 1;
    }

    pub fn history(&self) -> &History<Reading> {
        &self.history
    }

    /// Readings ingested since creation, including evicted ones.
    pub fn total_ingested(&self) -> u64 {
        self.total_ingested
    }

    /// The last `n` readings, oldest first.
    pub fn recent_readings(&self, n: usize) -> impl Iterator<Item = &Reading> {
        self.history.recent(n)
    }

    /// Min / avg / max over the most recent [`STATS_WINDOW`] readings.
    ///
    /// Returns `None` when nothing has been ingested yet.
    pub fn statistics(&self) -> Option<StatsSnapshot> {
        // ---
        let window = self.history.recent(STATS_WINDOW);
        let count = window.len();
        if count == 0 {
            return None;
        }

        let mut pm25 = Summary::default();
        let mut pm10 = Summary::default();
        for reading in window {
            pm25.add(reading.pm25);
            pm10.add(reading.pm10);
        }

        let n = count as f64;
        Some(StatsSnapshot {
            total_readings: self.total_ingested,
            recent_readings: count,
            avg_pm25: round2(pm25.sum / n),
            avg_pm10: round2(pm10.sum / n),
            max_pm25: round2(pm25.max),
            max_pm10: round2(pm10.max),
            min_pm25: round2(pm25.min),
            min_pm10: round2(pm10.min),
        })
    }

    /// Per-mote rolling averages for every active mote, keyed by mote id.
    pub fn pollution_map(&self, motes: &[Mote], thresholds: &Thresholds) -> BTreeMap<String, MapEntry> {
        // ---
        motes
            .iter()
            .filter(|mote| mote.is_active())
            .map(|mote| {
                let avg = mote.average_pollution();
                let entry = MapEntry {
                    location: mote.location(),
                    pm25: avg.pm25,
                    pm10: avg.pm10,
                    status: thresholds.status_for(avg.pm25, avg.pm10),
                };
                (mote.id().to_string(), entry)
            })
            .collect()
    }
}

/// Running sum / min / max for one pollutant.
struct Summary {
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Summary {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}
