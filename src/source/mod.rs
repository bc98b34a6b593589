//! Data source abstraction for fetching city readings.
//!
//! This module provides a trait-based abstraction over where readings come
//! from: a local pseudo-random generator or the IQAir AirVisual API.

mod iqair;
mod simulated;

pub use iqair::{
    has_real_key, normalize, IqAirResponse, IqAirSource, IqAirSourceBuilder, DEFAULT_BASE_URL,
    PLACEHOLDER_API_KEY,
};
pub use simulated::{SimulatedSource, SimulatedSourceBuilder, DEFAULT_FAILURE_RATE};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{MonitoredCity, Reading, SourceKind};
use crate::error::FetchError;

/// Trait for fetching one city's current air quality.
///
/// Implementations must be safe to call concurrently: the poller issues one
/// `fetch` per city at the same time.
///
/// # Example
///
/// ```
/// use airwatch::{AirQualitySource, SimulatedSource, CITY_REGISTRY};
///
/// # tokio_test::block_on(async {
/// let source = SimulatedSource::builder().seed(7).no_delay().failure_rate(0.0).build();
/// let reading = source.fetch(&CITY_REGISTRY[0]).await.unwrap();
/// assert_eq!(reading.city, "Roma");
/// # });
/// ```
#[async_trait]
pub trait AirQualitySource: Send + Sync + Debug {
    /// Fetch the current reading for `city`.
    async fn fetch(&self, city: &MonitoredCity) -> Result<Reading, FetchError>;

    /// Which kind of source this is.
    fn kind(&self) -> SourceKind;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
