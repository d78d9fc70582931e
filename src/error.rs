//! Library error type for the Smart Dust simulator.
//!
//! Generation, classification and aggregation never fail on self-generated
//! input; the only failures are caller contract violations at construction
//! time and snapshot I/O.

use thiserror::Error;

/// Errors surfaced by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// A mote was created with an intensity outside `[0, 1]`.
    #[error("Mote {mote_id}: intensity {intensity} is outside [0, 1]")]
    InvalidIntensity { mote_id: String, intensity: f64 },

    /// The fleet-wide intensity bound is outside `(0, 1]`.
    #[error("max intensity {0} is outside (0, 1]")]
    InvalidMaxIntensity(f64),

    /// Writing a snapshot failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
