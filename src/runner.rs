//! Async driving loop for a [`SharedSimulation`].
//!
//! Each cycle runs under a single lock acquisition, so cancellation (duration
//! elapsed, cycle limit reached, shutdown signal) only ever happens between
//! cycles. Periodic status and the final report go to `tracing`.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use crate::simulation::{SharedSimulation, Simulation};

// ---

#[derive(Debug, Clone)]
pub struct RunOptions {
    // ---
    /// Delay between the start of consecutive cycles.
    pub interval: Duration,
    /// Stop once this much wall-clock time has passed.
    pub duration: Duration,
    /// Stop after this many cycles, if set.
    pub max_cycles: Option<u64>,
    /// Log a status block every N cycles (0 disables).
    pub status_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            duration: Duration::from_secs(60),
            max_cycles: None,
            status_every: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    DurationElapsed,
    CycleLimit,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub readings: u64,
    pub alerts: u64,
    pub stop_reason: StopReason,
}

/// Drive the simulation until the duration elapses, the cycle limit is hit or
/// `shutdown` resolves.
pub async fn run<S>(sim: SharedSimulation, options: RunOptions, shutdown: S) -> RunSummary
where
    S: Future<Output = ()>,
{
    // ---
    tokio::pin!(shutdown);

    let started = Instant::now();
    let mut ticker = time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut summary = RunSummary {
        cycles: 0,
        readings: 0,
        alerts: 0,
        stop_reason: StopReason::DurationElapsed,
    };

    info!(
        "Monitoring dust levels: interval {:?}, duration {:?}",
        options.interval, options.duration
    );

    loop {
        if options.max_cycles.is_some_and(|max| summary.cycles >= max) {
            summary.stop_reason = StopReason::CycleLimit;
            break;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping simulation");
                summary.stop_reason = StopReason::Shutdown;
                break;
            }
            _ = ticker.tick() => {}
        }

        if started.elapsed() >= options.duration {
            summary.stop_reason = StopReason::DurationElapsed;
            break;
        }

        let mut guard = sim.lock().await;
        let report = guard.tick();
        summary.cycles += 1;
        summary.readings += report.readings as u64;
        summary.alerts += report.alerts.len() as u64;

        if options.status_every > 0 && report.cycle % options.status_every == 0 {
            log_status(&guard);
        }
    }

    let guard = sim.lock().await;
    log_final_report(&guard);
    summary
}

/// Log a short status block.
pub fn log_status(sim: &Simulation) {
    // ---
    let stats = sim.statistics();
    let recent = sim.recent_alerts(3);

    info!("[STATUS] cycle {}", sim.cycles());
    match stats {
        Some(s) => {
            info!("   Total Readings: {}", s.total_readings);
            info!("   Average PM2.5: {} ug/m3", s.avg_pm25);
            info!("   Average PM10: {} ug/m3", s.avg_pm10);
            info!("   Max PM2.5: {} ug/m3", s.max_pm25);
            info!("   Max PM10: {} ug/m3", s.max_pm10);
        }
        None => info!("   No readings yet"),
    }

    if recent.is_empty() {
        info!("   [OK] No recent alerts - All levels safe");
    } else {
        info!("   [!] Recent Alerts: {}", recent.len());
    }
}

/// Log the end-of-run report: statistics, alert summary and pollution map.
pub fn log_final_report(sim: &Simulation) {
    // ---
    info!("[FINAL SIMULATION REPORT]");

    match sim.statistics() {
        Some(s) => {
            info!("Total Readings Collected: {}", s.total_readings);
            info!("Average PM2.5: {} ug/m3", s.avg_pm25);
            info!("Average PM10: {} ug/m3", s.avg_pm10);
            info!("Peak PM2.5: {} ug/m3", s.max_pm25);
            info!("Peak PM10: {} ug/m3", s.max_pm10);
        }
        None => info!("Total Readings Collected: 0"),
    }

    let alerts = sim.alert_manager();
    info!("Total Alerts Generated: {}", alerts.total_raised());
    for alert in alerts.recent_alerts(5) {
        info!("  • {}", alert.message);
    }

    info!("[POLLUTION MAP]");
    for (mote_id, entry) in sim.pollution_map() {
        info!(
            "  [{}] {}: PM2.5={}, PM10={} at {}",
            entry.status, mote_id, entry.pm25, entry.pm10, entry.location
        );
    }
}
