//! Simulated Smart Dust mote (sensor node) and its reading generator.
//!
//! A mote has a fixed location and a pollution intensity in `[0, 1]` chosen at
//! creation. Each call to [`Mote::sense`] draws one synthetic reading from the
//! injected RNG and appends it to the mote's bounded history.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::SimError;
use crate::history::History;
use crate::models::{round2, Location, Reading};

// ---

/// Readings kept per mote.
pub const MOTE_HISTORY_CAPACITY: usize = 100;

/// Per-mote rolling average over its own history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub pm25: f64,
    pub pm10: f64,
}

#[derive(Debug, Clone)]
pub struct Mote {
    // ---
    id: String,
    location: Location,
    intensity: f64,
    active: bool,
    history: History<Reading>,
}

impl Mote {
    /// Create an active mote. Fails if `intensity` is not within `[0, 1]`.
    pub fn new(id: impl Into<String>, location: Location, intensity: f64) -> Result<Self, SimError> {
        // ---
        let id = id.into();
        if !(0.0..=1.0).contains(&intensity) {
            return Err(SimError::InvalidIntensity {
                mote_id: id,
                intensity,
            });
        }

        Ok(Self {
            id,
            location,
            intensity,
            active: true,
            history: History::with_capacity(MOTE_HISTORY_CAPACITY),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Recent readings, oldest first.
    pub fn history(&self) -> &History<Reading> {
        &self.history
    }

    /// Take a reading stamped with the current time.
    pub fn sense<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Reading {
        self.sense_at(rng, Utc::now())
    }

    /// Take a reading with an explicit timestamp.
    ///
    /// Baselines scale with intensity and share one multiplicative
    /// environmental factor; each pollutant then gets independent additive
    /// noise. Negative draws are floored at zero and humidity is clamped to
    /// `[0, 100]`.
    pub fn sense_at<R: Rng + ?Sized>(&mut self, rng: &mut R, timestamp: DateTime<Utc>) -> Reading {
        // ---
        let pm25_base = 10.0 + self.intensity * 40.0;
        let pm10_base = 20.0 + self.intensity * 60.0;

        let environment = 1.0 + 0.3 * gauss(rng, 1.0);
        let pm25 = (pm25_base * environment + gauss(rng, 5.0)).max(0.0);
        let pm10 = (pm10_base * environment + gauss(rng, 8.0)).max(0.0);

        let temperature = 20.0 + gauss(rng, 5.0);
        let humidity = (40.0 + gauss(rng, 15.0)).clamp(0.0, 100.0);

        let reading = Reading {
            mote_id: self.id.clone(),
            timestamp,
            pm25: round2(pm25),
            pm10: round2(pm10),
            temperature: round2(temperature),
            humidity: round2(humidity),
            location: self.location,
        };

        tracing::trace!(
            mote = %self.id,
            pm25 = reading.pm25,
            pm10 = reading.pm10,
            "sensed"
        );

        self.history.push(reading.clone());
        reading
    }

    /// Mean PM2.5 / PM10 over this mote's history, rounded to 2 decimals.
    /// Zero when no readings have been taken.
    pub fn average_pollution(&self) -> Averages {
        // ---
        if self.history.is_empty() {
            return Averages { pm25: 0.0, pm10: 0.0 };
        }

        let n = self.history.len() as f64;
        let (sum25, sum10) = self
            .history
            .iter()
            .fold((0.0, 0.0), |(a, b), r| (a + r.pm25, b + r.pm10));

        Averages {
            pm25: round2(sum25 / n),
            pm10: round2(sum10 / n),
        }
    }
}

/// Zero-mean Gaussian sample with standard deviation `sigma`.
fn gauss<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    z * sigma
}
