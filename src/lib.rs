//! Smart Dust particulate monitoring simulator.
//!
//! Simulated motes emit PM2.5 / PM10 readings that are classified against
//! fixed safety thresholds, aggregated into bounded rolling statistics and a
//! per-mote pollution map, and turned into a bounded, ordered alert log with
//! observer notification.
//!
//! Per cycle, for each active mote in creation order:
//! `Mote::sense` → `classifier::analyze` → `Aggregator::ingest` →
//! `AlertManager::evaluate`.

pub mod aggregator;
pub mod alerts;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod mote;
pub mod routes;
pub mod runner;
pub mod simulation;
pub mod snapshot;

pub use aggregator::Aggregator;
pub use alerts::{AlertManager, AlertObserver, LogObserver};
pub use classifier::{analyze, analyze_with, SeverityPolicy};
pub use config::Config;
pub use error::SimError;
pub use history::History;
pub use models::{
    Alert, Location, MapEntry, Reading, ReadingRecord, Severity, StatsSnapshot, Status, Thresholds,
    Verdict, PM10_THRESHOLD, PM25_THRESHOLD,
};
pub use mote::Mote;
pub use simulation::{CycleReport, SharedSimulation, Simulation, SimulationConfig};
pub use snapshot::Snapshot;
