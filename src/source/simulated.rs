//! Synthetic data source.
//!
//! Generates plausible readings locally, with artificial latency and an
//! occasional injected failure, so the dashboard can be exercised without
//! an API key.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::AirQualitySource;
use crate::data::{MonitoredCity, Pollutants, Reading, SourceKind};
use crate::error::FetchError;

/// Default probability that a single city fetch fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.05;

/// Default artificial latency range, in milliseconds.
const DEFAULT_LATENCY_MS: (u64, u64) = (500, 1500);

/// A data source producing pseudo-random readings.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: Mutex<StdRng>,
    latency_ms: (u64, u64),
    failure_rate: f64,
    description: String,
}

/// What one fetch will do. Drawn under the RNG lock, before any await.
struct Draw {
    delay: Duration,
    fail: bool,
    aqi: u32,
    pollutants: Pollutants,
}

impl SimulatedSource {
    /// Create a simulated source with default latency and failure rate.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder for configuring the source.
    pub fn builder() -> SimulatedSourceBuilder {
        SimulatedSourceBuilder::default()
    }

    fn draw(&self) -> Draw {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let (lo, hi) = self.latency_ms;
        let delay_ms = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let fail = rng.gen_bool(self.failure_rate);
        let aqi = random_aqi(&mut *rng);
        let pollutants = random_pollutants(&mut *rng, aqi);

        Draw {
            delay: Duration::from_millis(delay_ms),
            fail,
            aqi,
            pollutants,
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws a band-weighted index: 70% in [20, 119], 20% in [120, 199],
/// 10% in [200, 399].
pub fn random_aqi<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let roll: f64 = rng.gen();
    if roll < 0.7 {
        rng.gen_range(20..120)
    } else if roll < 0.9 {
        rng.gen_range(120..200)
    } else {
        rng.gen_range(200..400)
    }
}

/// Derives pollutant values as linear functions of the index plus noise.
pub fn random_pollutants<R: Rng + ?Sized>(rng: &mut R, aqi: u32) -> Pollutants {
    let aqi = aqi as f64;
    let mut noisy = |factor: f64, noise: f64| (aqi * factor + rng.gen::<f64>() * noise).round();

    Pollutants {
        pm25: noisy(0.4, 10.0),
        pm10: noisy(0.6, 15.0),
        o3: noisy(0.3, 20.0),
        no2: noisy(0.35, 12.0),
        co: noisy(0.2, 5.0),
    }
}

#[async_trait]
impl AirQualitySource for SimulatedSource {
    async fn fetch(&self, city: &MonitoredCity) -> Result<Reading, FetchError> {
        let draw = self.draw();

        if !draw.delay.is_zero() {
            tokio::time::sleep(draw.delay).await;
        }

        if draw.fail {
            tracing::debug!(city = city.display_name, "injecting simulated failure");
            return Err(FetchError::Simulated(format!(
                "connection error for {}",
                city.display_name
            )));
        }

        Ok(Reading::new(
            city.display_name,
            draw.aqi,
            draw.pollutants,
            Utc::now(),
            SourceKind::Simulated,
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Simulated
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for configuring a [`SimulatedSource`].
#[derive(Debug, Default)]
pub struct SimulatedSourceBuilder {
    seed: Option<u64>,
    latency_ms: Option<(u64, u64)>,
    failure_rate: Option<f64>,
}

impl SimulatedSourceBuilder {
    /// Seed the generator for reproducible readings.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the artificial latency range.
    pub fn latency(mut self, min: Duration, max: Duration) -> Self {
        self.latency_ms = Some((min.as_millis() as u64, max.as_millis() as u64));
        self
    }

    /// Disable artificial latency.
    pub fn no_delay(self) -> Self {
        self.latency(Duration::ZERO, Duration::ZERO)
    }

    /// Set the per-city failure probability (clamped to `[0, 1]`).
    pub fn failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = Some(rate);
        self
    }

    /// Build the source.
    pub fn build(self) -> SimulatedSource {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let failure_rate = self.failure_rate.unwrap_or(DEFAULT_FAILURE_RATE);
        let failure_rate = if failure_rate.is_nan() {
            DEFAULT_FAILURE_RATE
        } else {
            failure_rate.clamp(0.0, 1.0)
        };

        SimulatedSource {
            rng: Mutex::new(rng),
            latency_ms: self.latency_ms.unwrap_or(DEFAULT_LATENCY_MS),
            failure_rate,
            description: "simulated".to_string(),
        }
    }
}
