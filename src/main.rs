//! Application entry point for the `smartdust` simulator.
//!
//! This binary orchestrates a full simulation run:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Creating the mote fleet and registering the console alert observer
//! - Serving the read-only HTTP API (unless `HTTP_ADDR` is empty)
//! - Driving cycles until the duration elapses or Ctrl-C is pressed
//! - Writing the JSON snapshot (unless `SNAPSHOT_PATH` is empty)
//!
//! # Environment Variables
//! See [`smartdust_monitor::config::load_from_env`] for simulation settings.
//! - `SMARTDUST_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `SMARTDUST_SPAN_EVENTS` (optional) – span event mode for tracing
use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use smartdust_monitor::runner::{self, RunOptions};
use smartdust_monitor::{config, routes, LogObserver, Simulation, Snapshot};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let mut simulation = Simulation::new(cfg.simulation()).context("Failed to create motes")?;
    simulation.register_observer(LogObserver);
    tracing::info!("SMART DUST SIMULATION STARTED with {} active motes", simulation.active_motes());

    let sim = simulation.into_shared();

    if let Some(addr) = cfg.http_addr {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP API on {}", addr))?;
        tracing::info!("Listening on {}", addr);

        let app = routes::router(sim.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP API stopped: {}", e);
            }
        });
    }

    let options = RunOptions {
        interval: cfg.sampling_interval,
        duration: cfg.duration,
        max_cycles: None,
        status_every: cfg.status_every,
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = runner::run(sim.clone(), options, shutdown).await;
    tracing::info!(
        "Simulation finished after {} cycles ({:?}): {} readings, {} alerts",
        summary.cycles,
        summary.stop_reason,
        summary.readings,
        summary.alerts
    );

    if let Some(path) = &cfg.snapshot_path {
        let snapshot = Snapshot::capture(&*sim.lock().await);
        snapshot
            .write_json(path)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    }

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `SMARTDUST_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, falling back to `SMARTDUST_LOG_LEVEL`
///
/// Call once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("SMARTDUST_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to SMARTDUST_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("SMARTDUST_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},hyper=warn,axum=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
