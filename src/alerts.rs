//! Alert generation, the bounded alert log and observer notification.
//!
//! Observers are invoked synchronously in registration order after the alert
//! has been recorded. Each call runs in its own failure boundary: an observer
//! that returns an error or panics is logged and skipped.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::history::History;
use crate::models::{Alert, Reading, Thresholds, Verdict};

// ---

/// Alerts kept in the log.
pub const ALERT_LOG_CAPACITY: usize = 100;

/// Receives every alert raised by an [`AlertManager`].
pub trait AlertObserver: Send + Sync {
    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()>;
}

impl<F> AlertObserver for F
where
    F: Fn(&Alert) -> anyhow::Result<()> + Send + Sync,
{
    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        self(alert)
    }
}

/// Logs each alert through `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl AlertObserver for LogObserver {
    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        // ---
        tracing::warn!(
            mote = %alert.mote_id,
            severity = %alert.severity,
            location = %alert.location,
            timestamp = %alert.timestamp.to_rfc3339(),
            "{}",
            alert.message
        );
        Ok(())
    }
}

pub struct AlertManager {
    // ---
    thresholds: Thresholds,
    log: History<Alert>,
    observers: Vec<Box<dyn AlertObserver>>,
    total_raised: u64,
    observer_failures: u64,
}

impl fmt::Debug for AlertManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertManager")
            .field("thresholds", &self.thresholds)
            .field("alerts", &self.log.len())
            .field("observers", &self.observers.len())
            .field("total_raised", &self.total_raised)
            .finish()
    }
}

impl AlertManager {
    pub fn new(thresholds: Thresholds) -> Self {
        // ---
        Self {
            thresholds,
            log: History::with_capacity(ALERT_LOG_CAPACITY),
            observers: Vec::new(),
            total_raised: 0,
            observer_failures: 0,
        }
    }

    /// Add an observer. Observers run in the order they were registered.
    pub fn register<O>(&mut self, observer: O)
    where
        O: AlertObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Thresholds this manager was configured with.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Record an alert for an UNSAFE verdict and notify observers.
    ///
    /// Returns the recorded alert, or `None` for a SAFE verdict.
    pub fn evaluate(&mut self, reading: &Reading, verdict: &Verdict) -> Option<Alert> {
        // ---
        if !verdict.is_unsafe() {
            return None;
        }

        let alert = Alert {
            timestamp: reading.timestamp,
            mote_id: reading.mote_id.clone(),
            location: reading.location,
            severity: verdict.severity,
            pm25: reading.pm25,
            pm10: reading.pm10,
            message: Self::message_for(reading, verdict),
        };

        self.log.push(alert.clone());
        self.total_raised += 1;
        self.notify(&alert);

        Some(alert)
    }

    fn notify(&mut self, alert: &Alert) {
        // ---
        for (index, observer) in self.observers.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.on_alert(alert)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.observer_failures += 1;
                    tracing::warn!(observer = index, mote = %alert.mote_id, "Alert observer failed: {:#}", e);
                }
                Err(_) => {
                    self.observer_failures += 1;
                    tracing::warn!(observer = index, mote = %alert.mote_id, "Alert observer panicked");
                }
            }
        }
    }

    /// Breach list built from the thresholds the verdict was computed with.
    /// Floats print in their shortest round-trip form (`60.0`, `30.5`).
    fn message_for(reading: &Reading, verdict: &Verdict) -> String {
        // ---
        let mut issues = Vec::with_capacity(2);
        if reading.pm25 > verdict.pm25_threshold {
            issues.push(format!(
                "PM2.5: {:?} ug/m3 (threshold: {:?})",
                reading.pm25, verdict.pm25_threshold
            ));
        }
        if reading.pm10 > verdict.pm10_threshold {
            issues.push(format!(
                "PM10: {:?} ug/m3 (threshold: {:?})",
                reading.pm10, verdict.pm10_threshold
            ));
        }

        format!(
            "[!] {} ALERT at Mote {}: {}",
            verdict.severity,
            reading.mote_id,
            issues.join(", ")
        )
    }

    /// The last `n` alerts, oldest first.
    pub fn recent_alerts(&self, n: usize) -> Vec<Alert> {
        self.log.recent(n).cloned().collect()
    }

    /// Full alert log, oldest first.
    pub fn alerts(&self) -> &History<Alert> {
        &self.log
    }

    /// Alerts raised since creation, including evicted ones.
    pub fn total_raised(&self) -> u64 {
        self.total_raised
    }

    /// Observer calls that returned an error or panicked.
    pub fn observer_failures(&self) -> u64 {
        self.observer_failures
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::classifier::analyze;
    use crate::models::{Location, Severity};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn reading(seq: i64, pm25: f64, pm10: f64) -> Reading {
        // ---
        Reading {
            mote_id: "MOTE-007".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 26, 18, 0, 0).unwrap() + Duration::seconds(seq),
            pm25,
            pm10,
            temperature: 20.0,
            humidity: 40.0,
            location: Location(5.0, 6.0),
        }
    }

    fn raise(manager: &mut AlertManager, r: &Reading) -> Option<Alert> {
        let verdict = analyze(r, &Thresholds::default());
        manager.evaluate(r, &verdict)
    }

    #[test]
    fn test_safe_verdict_is_noop() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        manager.register(move |_: &Alert| -> anyhow::Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(raise(&mut manager, &reading(0, 10.0, 10.0)).is_none());
        assert!(manager.alerts().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_alert_fields_and_message() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        let r = reading(0, 60.0, 75.5);
        let alert = raise(&mut manager, &r).unwrap();

        assert_eq!(alert.mote_id, "MOTE-007");
        assert_eq!(alert.timestamp, r.timestamp);
        assert_eq!(alert.location, Location(5.0, 6.0));
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.pm25, 60.0);
        assert_eq!(alert.pm10, 75.5);
        assert_eq!(
            alert.message,
            "[!] HIGH ALERT at Mote MOTE-007: PM2.5: 60.0 ug/m3 (threshold: 25.0), \
             PM10: 75.5 ug/m3 (threshold: 50.0)"
        );
    }

    #[test]
    fn test_message_lists_only_breaching_pollutant() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        let alert = raise(&mut manager, &reading(0, 10.0, 120.0)).unwrap();
        assert_eq!(
            alert.message,
            "[!] CRITICAL ALERT at Mote MOTE-007: PM10: 120.0 ug/m3 (threshold: 50.0)"
        );
    }

    #[test]
    fn test_message_keeps_measured_precision() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        let alert = raise(&mut manager, &reading(0, 30.5, 50.25)).unwrap();
        assert_eq!(
            alert.message,
            "[!] MODERATE ALERT at Mote MOTE-007: PM2.5: 30.5 ug/m3 (threshold: 25.0), \
             PM10: 50.25 ug/m3 (threshold: 50.0)"
        );
    }

    #[test]
    fn test_message_uses_verdict_thresholds() {
        // ---
        let manager_thresholds = Thresholds::default();
        let strict = Thresholds { pm25: 10.0, pm10: 40.0 };
        let mut manager = AlertManager::new(manager_thresholds);
        assert_eq!(*manager.thresholds(), manager_thresholds);

        let r = reading(0, 15.0, 45.0);
        let verdict = analyze(&r, &strict);
        let alert = manager.evaluate(&r, &verdict).unwrap();
        assert_eq!(
            alert.message,
            "[!] MODERATE ALERT at Mote MOTE-007: PM2.5: 15.0 ug/m3 (threshold: 10.0), \
             PM10: 45.0 ug/m3 (threshold: 40.0)"
        );
    }

    #[test]
    fn test_log_bounded_to_last_100() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        for i in 0..150 {
            raise(&mut manager, &reading(i, 30.0 + i as f64, 0.0));
        }

        assert_eq!(manager.alerts().len(), ALERT_LOG_CAPACITY);
        assert_eq!(manager.total_raised(), 150);

        let kept: Vec<f64> = manager.alerts().iter().map(|a| a.pm25).collect();
        let expected: Vec<f64> = (50..150).map(|i| 30.0 + i as f64).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_recent_alerts_slices() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        assert!(manager.recent_alerts(5).is_empty());

        for i in 0..150 {
            raise(&mut manager, &reading(i, 30.0 + i as f64, 0.0));
        }

        let last5: Vec<f64> = manager.recent_alerts(5).iter().map(|a| a.pm25).collect();
        assert_eq!(last5, vec![175.0, 176.0, 177.0, 178.0, 179.0]);
        assert_eq!(manager.recent_alerts(500).len(), 100);
    }

    #[test]
    fn test_observer_receives_logged_alert_once() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        manager.register(move |alert: &Alert| -> anyhow::Result<()> {
            sink.lock().unwrap().push(alert.clone());
            Ok(())
        });

        raise(&mut manager, &reading(0, 40.0, 0.0));
        raise(&mut manager, &reading(1, 10.0, 10.0));
        raise(&mut manager, &reading(2, 0.0, 90.0));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let logged: Vec<Alert> = manager.alerts().iter().cloned().collect();
        assert_eq!(*seen, logged);
    }

    #[test]
    fn test_failing_observer_is_isolated() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        manager.register(move |_: &Alert| -> anyhow::Result<()> {
            first.lock().unwrap().push("erroring");
            Err(anyhow::anyhow!("sink unavailable"))
        });
        manager.register(|_: &Alert| -> anyhow::Result<()> { panic!("observer bug") });
        let last = order.clone();
        manager.register(move |_: &Alert| -> anyhow::Result<()> {
            last.lock().unwrap().push("healthy");
            Ok(())
        });

        let alert = raise(&mut manager, &reading(0, 99.0, 0.0));

        assert!(alert.is_some());
        assert_eq!(manager.alerts().len(), 1);
        assert_eq!(*order.lock().unwrap(), vec!["erroring", "healthy"]);
        assert_eq!(manager.observer_failures(), 2);

        // Later alerts still reach every observer.
        raise(&mut manager, &reading(1, 99.0, 0.0));
        assert_eq!(order.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_log_observer_never_fails() {
        // ---
        let mut manager = AlertManager::new(Thresholds::default());
        manager.register(LogObserver);
        raise(&mut manager, &reading(0, 30.0, 0.0));
        assert_eq!(manager.observer_failures(), 0);
        assert_eq!(manager.observer_count(), 1);
    }
}
