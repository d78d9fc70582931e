//! Configuration loader for the `smartdust` simulator.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Parsing goes through [`load_from`] so tests can
//! feed a plain map instead of touching the process environment.
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::classifier::SeverityPolicy;
use crate::simulation::SimulationConfig;

/// Parse an optional environment variable into `$ty` with a default value.
macro_rules! parse_env {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string variable; an empty value counts as "disabled".
macro_rules! optional_env {
    ($lookup:expr, $var_name:expr, $default:expr) => {
        match $lookup($var_name) {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => $default.map(String::from),
        }
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Number of motes created at start.
    pub mote_count: usize,

    /// Upper bound of the random per-mote pollution intensity.
    pub max_intensity: f64,

    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Delay between cycles.
    pub sampling_interval: Duration,

    /// Wall-clock length of the run.
    pub duration: Duration,

    /// Log a status block every N cycles (0 disables).
    pub status_every: u64,

    /// How the classifier combines per-pollutant severities.
    pub severity_policy: SeverityPolicy,

    /// Where to write the end-of-run JSON snapshot, if anywhere.
    pub snapshot_path: Option<PathBuf>,

    /// Bind address of the read-only HTTP API, if enabled.
    pub http_addr: Option<SocketAddr>,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `MOTE_COUNT` – motes to simulate (default: 5)
/// - `MAX_INTENSITY` – intensity upper bound in (0, 1] (default: 0.8)
/// - `SIM_SEED` – RNG seed (default: random)
/// - `SAMPLING_INTERVAL_MS` – delay between cycles (default: 2000)
/// - `SIM_DURATION_SECS` – run length (default: 60)
/// - `STATUS_EVERY` – status cadence in cycles (default: 5)
/// - `SEVERITY_POLICY` – `last` or `highest` (default: `last`)
/// - `SNAPSHOT_PATH` – JSON output (default: `dust_simulation_data.json`, empty disables)
/// - `HTTP_ADDR` – read API bind address (default: `0.0.0.0:8080`, empty disables)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    load_from(|name| env::var(name).ok())
}

/// Build a [`Config`] from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let mote_count = parse_env!(lookup, "MOTE_COUNT", usize, 5);
    let max_intensity = parse_env!(lookup, "MAX_INTENSITY", f64, 0.8);
    let seed = lookup("SIM_SEED")
        .map(|v| v.trim().parse::<u64>())
        .transpose()
        .map_err(|e| anyhow!("Invalid SIM_SEED: {}", e))?;
    let sampling_ms = parse_env!(lookup, "SAMPLING_INTERVAL_MS", u64, 2000);
    let duration_secs = parse_env!(lookup, "SIM_DURATION_SECS", u64, 60);
    let status_every = parse_env!(lookup, "STATUS_EVERY", u64, 5);
    let severity_policy = parse_env!(lookup, "SEVERITY_POLICY", SeverityPolicy, SeverityPolicy::default());

    let snapshot_path = optional_env!(lookup, "SNAPSHOT_PATH", Some("dust_simulation_data.json")).map(PathBuf::from);
    let http_addr = optional_env!(lookup, "HTTP_ADDR", Some("0.0.0.0:8080"))
        .map(|v| v.trim().parse::<SocketAddr>())
        .transpose()
        .map_err(|e| anyhow!("Invalid HTTP_ADDR: {}", e))?;

    if mote_count == 0 {
        bail!("MOTE_COUNT must be at least 1");
    }
    if !(max_intensity > 0.0 && max_intensity <= 1.0) {
        bail!("MAX_INTENSITY must be in (0, 1], got {}", max_intensity);
    }
    if sampling_ms == 0 {
        bail!("SAMPLING_INTERVAL_MS must be greater than 0");
    }

    Ok(Config {
        mote_count,
        max_intensity,
        seed,
        sampling_interval: Duration::from_millis(sampling_ms),
        duration: Duration::from_secs(duration_secs),
        status_every,
        severity_policy,
        snapshot_path,
        http_addr,
    })
}

impl Config {
    /// Settings for constructing the [`Simulation`](crate::Simulation).
    pub fn simulation(&self) -> SimulationConfig {
        // ---
        SimulationConfig {
            mote_count: self.mote_count,
            max_intensity: self.max_intensity,
            seed: self.seed,
            severity_policy: self.severity_policy,
            ..SimulationConfig::default()
        }
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let seed = self
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string());
        let snapshot = self
            .snapshot_path
            .as_ref()
            .map_or_else(|| "disabled".to_string(), |p| p.display().to_string());
        let http = self
            .http_addr
            .map_or_else(|| "disabled".to_string(), |a| a.to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  MOTE_COUNT           : {}", self.mote_count);
        tracing::info!("  MAX_INTENSITY        : {}", self.max_intensity);
        tracing::info!("  SIM_SEED             : {}", seed);
        tracing::info!("  SAMPLING_INTERVAL_MS : {}", self.sampling_interval.as_millis());
        tracing::info!("  SIM_DURATION_SECS    : {}", self.duration.as_secs());
        tracing::info!("  STATUS_EVERY         : {}", self.status_every);
        tracing::info!("  SEVERITY_POLICY      : {:?}", self.severity_policy);
        tracing::info!("  SNAPSHOT_PATH        : {}", snapshot);
        tracing::info!("  HTTP_ADDR            : {}", http);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        // ---
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_from(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        // ---
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.mote_count, 5);
        assert_eq!(cfg.max_intensity, 0.8);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.sampling_interval, Duration::from_secs(2));
        assert_eq!(cfg.duration, Duration::from_secs(60));
        assert_eq!(cfg.status_every, 5);
        assert_eq!(cfg.severity_policy, SeverityPolicy::LastEvaluated);
        assert_eq!(cfg.snapshot_path, Some(PathBuf::from("dust_simulation_data.json")));
        assert_eq!(cfg.http_addr, Some("0.0.0.0:8080".parse().unwrap()));
    }

    #[test]
    fn test_overrides() {
        // ---
        let cfg = load(&[
            ("MOTE_COUNT", "12"),
            ("MAX_INTENSITY", "1.0"),
            ("SIM_SEED", "42"),
            ("SAMPLING_INTERVAL_MS", "250"),
            ("SIM_DURATION_SECS", "5"),
            ("SEVERITY_POLICY", "highest"),
            ("SNAPSHOT_PATH", "out/run.json"),
            ("HTTP_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();

        assert_eq!(cfg.mote_count, 12);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.sampling_interval, Duration::from_millis(250));
        assert_eq!(cfg.severity_policy, SeverityPolicy::Highest);
        assert_eq!(cfg.snapshot_path, Some(PathBuf::from("out/run.json")));
        assert_eq!(cfg.http_addr, Some("127.0.0.1:9000".parse().unwrap()));

        let sim = cfg.simulation();
        assert_eq!(sim.mote_count, 12);
        assert_eq!(sim.seed, Some(42));
        assert_eq!(sim.severity_policy, SeverityPolicy::Highest);
    }

    #[test]
    fn test_empty_values_disable_outputs() {
        // ---
        let cfg = load(&[("SNAPSHOT_PATH", ""), ("HTTP_ADDR", "  ")]).unwrap();
        assert!(cfg.snapshot_path.is_none());
        assert!(cfg.http_addr.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        // ---
        assert!(load(&[("MOTE_COUNT", "many")]).is_err());
        assert!(load(&[("MOTE_COUNT", "0")]).is_err());
        assert!(load(&[("MAX_INTENSITY", "1.5")]).is_err());
        assert!(load(&[("MAX_INTENSITY", "0")]).is_err());
        assert!(load(&[("SIM_SEED", "-1")]).is_err());
        assert!(load(&[("SAMPLING_INTERVAL_MS", "0")]).is_err());
        assert!(load(&[("SEVERITY_POLICY", "worst")]).is_err());
        assert!(load(&[("HTTP_ADDR", "not-an-addr")]).is_err());
    }
}
