//! Read-only HTTP API over a running simulation.
//!
//! Gateway module: each sibling exports a subrouter and this module merges
//! them and attaches the shared simulation as state, so `main.rs` never needs
//! to know about individual endpoints.

use axum::Router;

use crate::simulation::SharedSimulation;

mod health;
mod monitor;

// ---

pub fn router(sim: SharedSimulation) -> Router {
    // ---
    Router::new()
        .merge(monitor::router())
        .merge(health::router())
        .with_state(sim)
}
