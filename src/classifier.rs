//! Threshold classification of individual readings.
//!
//! Pure functions: no state, no side effects.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Reading, Severity, Status, Thresholds, Verdict};

// ---

/// How the severities of two breaching pollutants are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityPolicy {
    /// PM2.5 is graded first, then PM10 overwrites it if PM10 also breaches.
    #[default]
    LastEvaluated,
    /// The more severe of the two tiers wins.
    Highest,
}

impl FromStr for SeverityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "last" | "last_evaluated" => Ok(Self::LastEvaluated),
            "highest" | "max" => Ok(Self::Highest),
            other => Err(format!("unknown severity policy '{other}'")),
        }
    }
}

/// Classify a reading with the default [`SeverityPolicy::LastEvaluated`].
pub fn analyze(reading: &Reading, thresholds: &Thresholds) -> Verdict {
    analyze_with(reading, thresholds, SeverityPolicy::LastEvaluated)
}

/// Classify a reading.
///
/// UNSAFE when either pollutant is strictly above its threshold. Tier
/// breakpoints: PM2.5 `>50` CRITICAL, `>35` HIGH, else MODERATE; PM10
/// `>100` CRITICAL, `>70` HIGH, else MODERATE.
pub fn analyze_with(reading: &Reading, thresholds: &Thresholds, policy: SeverityPolicy) -> Verdict {
    // ---
    let mut status = Status::Safe;
    let mut severity = Severity::Low;

    if thresholds.pm25_breached(reading.pm25) {
        status = Status::Unsafe;
        severity = pm25_tier(reading.pm25);
    }

    if thresholds.pm10_breached(reading.pm10) {
        status = Status::Unsafe;
        let tier = pm10_tier(reading.pm10);
        severity = match policy {
            SeverityPolicy::LastEvaluated => tier,
            SeverityPolicy::Highest => severity.max(tier),
        };
    }

    Verdict {
        status,
        severity,
        pm25_level: reading.pm25,
        pm10_level: reading.pm10,
        pm25_threshold: thresholds.pm25,
        pm10_threshold: thresholds.pm10,
    }
}

fn pm25_tier(pm25: f64) -> Severity {
    if pm25 > 50.0 {
        Severity::Critical
    } else if pm25 > 35.0 {
        Severity::High
    } else {
        Severity::Moderate
    }
}

fn pm10_tier(pm10: f64) -> Severity {
    if pm10 > 100.0 {
        Severity::Critical
    } else if pm10 > 70.0 {
        Severity::High
    } else {
        Severity::Moderate
    }
}
