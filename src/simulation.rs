//! Coordinator tying motes, classifier, aggregator and alert manager together.
//!
//! One call to [`Simulation::tick`] is one cycle: every active mote, in
//! creation order, is sensed, classified, ingested and then evaluated for
//! alerts before the next mote is touched. A `Simulation` is single-writer;
//! share it between tasks as a [`SharedSimulation`] so a whole cycle runs under
//! one lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::Mutex;

use crate::aggregator::Aggregator;
use crate::alerts::{AlertManager, AlertObserver};
use crate::classifier::{analyze_with, SeverityPolicy};
use crate::error::SimError;
use crate::models::{Alert, Location, MapEntry, StatsSnapshot, Thresholds};
use crate::mote::Mote;

// ---

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// A simulation guarded by the single lock that covers all of its state.
pub type SharedSimulation = Arc<Mutex<Simulation>>;

/// Side length of the square field motes are scattered over.
pub const FIELD_SIZE: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // ---
    /// Motes created at start.
    pub mote_count: usize,
    /// Upper bound for the random per-mote intensity.
    pub max_intensity: f64,
    /// RNG seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    pub thresholds: Thresholds,
    pub severity_policy: SeverityPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mote_count: 5,
            max_intensity: 0.8,
            seed: None,
            thresholds: Thresholds::default(),
            severity_policy: SeverityPolicy::default(),
        }
    }
}

/// What a single cycle produced.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub readings: usize,
    pub alerts: Vec<Alert>,
}

#[derive(Debug)]
pub struct Simulation {
    // ---
    motes: Vec<Mote>,
    rng: ChaCha8Rng,
    thresholds: Thresholds,
    policy: SeverityPolicy,
    aggregator: Aggregator,
    alerts: AlertManager,
    cycles: u64,
}

impl Simulation {
    /// Create `mote_count` motes named `MOTE-001`, `MOTE-002`, ... with random
    /// locations and intensities.
    ///
    /// Fails with [`SimError::InvalidMaxIntensity`] unless
    /// `0 < max_intensity <= 1`, whatever the seed.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        // ---
        if !(config.max_intensity > 0.0 && config.max_intensity <= 1.0) {
            return Err(SimError::InvalidMaxIntensity(config.max_intensity));
        }

        let mut rng = seeded_rng(config.seed);

        let mut motes = Vec::with_capacity(config.mote_count);
        for i in 0..config.mote_count {
            let location = Location(
                rng.gen_range(0.0..FIELD_SIZE),
                rng.gen_range(0.0..FIELD_SIZE),
            );
            let intensity = rng.gen::<f64>() * config.max_intensity;
            motes.push(Mote::new(format!("MOTE-{:03}", i + 1), location, intensity)?);
        }

        tracing::debug!(motes = motes.len(), seed = ?config.seed, "Simulation created");

        Ok(Self::assemble(motes, rng, &config))
    }

    /// Use a caller-supplied fleet instead of generating one.
    ///
    /// Seed, thresholds and severity policy come from `config`; `mote_count`
    /// and `max_intensity` are ignored.
    pub fn with_motes(motes: Vec<Mote>, config: SimulationConfig) -> Self {
        // ---
        let rng = seeded_rng(config.seed);
        Self::assemble(motes, rng, &config)
    }

    fn assemble(motes: Vec<Mote>, rng: ChaCha8Rng, config: &SimulationConfig) -> Self {
        // ---
        Self {
            motes,
            rng,
            thresholds: config.thresholds,
            policy: config.severity_policy,
            aggregator: Aggregator::new(),
            alerts: AlertManager::new(config.thresholds),
            cycles: 0,
        }
    }

    pub fn into_shared(self) -> SharedSimulation {
        Arc::new(Mutex::new(self))
    }

    /// Register an alert observer on the owned alert manager.
    pub fn register_observer<O>(&mut self, observer: O)
    where
        O: AlertObserver + 'static,
    {
        self.alerts.register(observer);
    }

    /// Run one cycle over all active motes.
    pub fn tick(&mut self) -> CycleReport {
        // ---
        self.cycles += 1;
        let mut report = CycleReport {
            cycle: self.cycles,
            ..CycleReport::default()
        };

        for mote in self.motes.iter_mut().filter(|m| m.is_active()) {
            let reading = mote.sense(&mut self.rng);
            let verdict = analyze_with(&reading, &self.thresholds, self.policy);

            self.aggregator.ingest(reading.clone());
            report.readings += 1;
            if let Some(alert) = self.alerts.evaluate(&reading, &verdict) {
                report.alerts.push(alert);
            }
        }

        tracing::debug!(
            cycle = report.cycle,
            readings = report.readings,
            alerts = report.alerts.len(),
            "Cycle complete"
        );
        report
    }

    /// Run `n` cycles back to back.
    pub fn run_cycles(&mut self, n: u64) -> Vec<CycleReport> {
        (0..n).map(|_| self.tick()).collect()
    }

    fn mote_mut(&mut self, id: &str) -> Option<&mut Mote> {
        self.motes.iter_mut().find(|m| m.id() == id)
    }

    /// Stop sensing a mote. Returns `false` for an unknown id.
    pub fn deactivate_mote(&mut self, id: &str) -> bool {
        // ---
        match self.mote_mut(id) {
            Some(mote) => {
                mote.deactivate();
                tracing::info!(mote = id, "Mote deactivated");
                true
            }
            None => false,
        }
    }

    /// Resume sensing a mote. Returns `false` for an unknown id.
    pub fn activate_mote(&mut self, id: &str) -> bool {
        // ---
        match self.mote_mut(id) {
            Some(mote) => {
                mote.activate();
                tracing::info!(mote = id, "Mote activated");
                true
            }
            None => false,
        }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    pub fn active_motes(&self) -> usize {
        self.motes.iter().filter(|m| m.is_active()).count()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn alert_manager(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn severity_policy(&self) -> SeverityPolicy {
        self.policy
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn statistics(&self) -> Option<StatsSnapshot> {
        self.aggregator.statistics()
    }

    pub fn pollution_map(&self) -> BTreeMap<String, MapEntry> {
        self.aggregator.pollution_map(&self.motes, &self.thresholds)
    }

    pub fn recent_alerts(&self, n: usize) -> Vec<Alert> {
        self.alerts.recent_alerts(n)
    }
}
