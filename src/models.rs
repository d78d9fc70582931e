//! Simple data models for the Smart Dust pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// PM2.5 safety threshold in µg/m³ (WHO guideline).
pub const PM25_THRESHOLD: f64 = 25.0;

/// PM10 safety threshold in µg/m³ (WHO guideline).
pub const PM10_THRESHOLD: f64 = 50.0;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---

/// Safety thresholds shared by the classifier, the alert manager and the
/// pollution map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    // ---
    pub pm25: f64,
    pub pm10: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pm25: PM25_THRESHOLD,
            pm10: PM10_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn pm25_breached(&self, pm25: f64) -> bool {
        pm25 > self.pm25
    }

    pub fn pm10_breached(&self, pm10: f64) -> bool {
        pm10 > self.pm10
    }

    /// Status implied by a pair of PM values.
    pub fn status_for(&self, pm25: f64, pm10: f64) -> Status {
        // ---
        if self.pm25_breached(pm25) || self.pm10_breached(pm10) {
            Status::Unsafe
        } else {
            Status::Safe
        }
    }
}

/// Planar mote position. Serializes as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location(pub f64, pub f64);

impl Location {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.0, self.1)
    }
}

/// One measurement emitted by a mote. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub mote_id: String,
    pub timestamp: DateTime<Utc>,
    /// PM2.5 particles (µg/m³)
    pub pm25: f64,
    /// PM10 particles (µg/m³)
    pub pm10: f64,
    /// Temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent, within `[0, 100]`
    pub humidity: f64,
    pub location: Location,
}

/// Reading as exported in snapshots and over the read API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    // ---
    pub mote_id: String,
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
    pub pm10: f64,
    pub location: Location,
}

impl From<&Reading> for ReadingRecord {
    fn from(reading: &Reading) -> Self {
        // ---
        Self {
            mote_id: reading.mote_id.clone(),
            timestamp: reading.timestamp,
            pm25: reading.pm25,
            pm10: reading.pm10,
            location: reading.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Safe,
    Unsafe,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Safe => "SAFE",
            Status::Unsafe => "UNSAFE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tiers, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    // ---
    pub status: Status,
    pub severity: Severity,
    pub pm25_level: f64,
    pub pm10_level: f64,
    pub pm25_threshold: f64,
    pub pm10_threshold: f64,
}

impl Verdict {
    pub fn is_unsafe(&self) -> bool {
        self.status == Status::Unsafe
    }
}

/// A recorded UNSAFE verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    // ---
    pub timestamp: DateTime<Utc>,
    pub mote_id: String,
    pub location: Location,
    pub severity: Severity,
    pub pm25: f64,
    pub pm10: f64,
    pub message: String,
}

/// Fleet-wide statistics over the most recent window of the global history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    // ---
    /// Readings ingested since the start of the run.
    pub total_readings: u64,
    /// Readings in the window the figures below were computed over.
    pub recent_readings: usize,
    pub avg_pm25: f64,
    pub avg_pm10: f64,
    pub max_pm25: f64,
    pub max_pm10: f64,
    pub min_pm25: f64,
    pub min_pm10: f64,
}

/// One pollution map cell, keyed by mote id in the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    // ---
    pub location: Location,
    pub pm25: f64,
    pub pm10: f64,
    pub status: Status,
}
