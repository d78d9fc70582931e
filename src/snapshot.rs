//! Serializable end-of-run snapshot.
//!
//! Readings and alerts use the export schema consumed by downstream plotting
//! and reporting tools. The core never writes a snapshot on its own; callers
//! take one on demand.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::models::{Alert, MapEntry, ReadingRecord, StatsSnapshot};
use crate::simulation::Simulation;

// ---

/// Readings included in a snapshot.
pub const SNAPSHOT_READINGS: usize = 50;

/// Alerts included in a snapshot.
pub const SNAPSHOT_ALERTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    // ---
    pub generated_at: DateTime<Utc>,
    pub cycles: u64,
    /// `None` serializes as `null` when nothing has been ingested.
    pub statistics: Option<StatsSnapshot>,
    pub pollution_map: BTreeMap<String, MapEntry>,
    pub recent_readings: Vec<ReadingRecord>,
    pub alerts: Vec<Alert>,
}

impl Snapshot {
    /// Capture the current state of a simulation.
    pub fn capture(sim: &Simulation) -> Self {
        // ---
        Self {
            generated_at: Utc::now(),
            cycles: sim.cycles(),
            statistics: sim.statistics(),
            pollution_map: sim.pollution_map(),
            recent_readings: sim
                .aggregator()
                .recent_readings(SNAPSHOT_READINGS)
                .map(ReadingRecord::from)
                .collect(),
            alerts: sim.recent_alerts(SNAPSHOT_ALERTS),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        // ---
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)?;
        tracing::info!("Snapshot written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::simulation::SimulationConfig;

    fn busy_simulation() -> Simulation {
        // ---
        let mut sim = Simulation::new(SimulationConfig {
            mote_count: 5,
            max_intensity: 1.0,
            seed: Some(2024),
            ..SimulationConfig::default()
        })
        .unwrap();
        sim.run_cycles(30);
        sim
    }

    #[test]
    fn test_capture_limits() {
        // ---
        let sim = busy_simulation();
        let snapshot = Snapshot::capture(&sim);

        assert_eq!(snapshot.cycles, 30);
        assert_eq!(snapshot.recent_readings.len(), SNAPSHOT_READINGS);
        assert!(snapshot.alerts.len() <= SNAPSHOT_ALERTS);
        assert_eq!(snapshot.pollution_map.len(), 5);
        assert_eq!(snapshot.statistics.as_ref().unwrap().total_readings, 150);

        let newest = sim.aggregator().history().latest().unwrap();
        assert_eq!(snapshot.recent_readings.last().unwrap(), &ReadingRecord::from(newest));
    }

    #[test]
    fn test_json_shape() {
        // ---
        let snapshot = Snapshot::capture(&busy_simulation());
        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();

        let reading = &json["recent_readings"][0];
        assert!(reading["mote_id"].is_string());
        assert!(reading["timestamp"].is_string());
        assert_eq!(reading["location"].as_array().unwrap().len(), 2);

        if let Some(alert) = json["alerts"].as_array().unwrap().first() {
            for key in ["timestamp", "mote_id", "location", "severity", "pm25", "pm10", "message"] {
                assert!(alert.get(key).is_some(), "alert missing {key}");
            }
        }

        let entry = json["pollution_map"]["MOTE-001"].as_object().unwrap();
        assert!(entry.contains_key("status"));
    }

    #[test]
    fn test_empty_simulation_has_null_statistics() {
        // ---
        let sim = Simulation::new(SimulationConfig {
            seed: Some(1),
            ..SimulationConfig::default()
        })
        .unwrap();
        let json = serde_json::to_value(Snapshot::capture(&sim)).unwrap();
        assert!(json["statistics"].is_null());
        assert_eq!(json["recent_readings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_write_json_round_trips_through_disk() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dust_simulation_data.json");

        let snapshot = Snapshot::capture(&busy_simulation());
        snapshot.write_json(&path).unwrap();

        let loaded: Snapshot = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.cycles, snapshot.cycles);
        assert_eq!(loaded.recent_readings, snapshot.recent_readings);
    }
}
