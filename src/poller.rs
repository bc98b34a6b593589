//! Concurrent fetch of every monitored city.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::data::{CityReport, MonitoredCity};
use crate::source::AirQualitySource;

/// The reports produced by one poll cycle, in registry order.
#[derive(Debug, Clone, Serialize)]
pub struct PollBatch {
    pub reports: Vec<CityReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PollBatch {
    /// Number of cities that produced a reading.
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_error()).count()
    }

    /// Number of cities whose fetch failed.
    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    /// Looks up the report for a city by display name.
    pub fn get(&self, display_name: &str) -> Option<&CityReport> {
        self.reports
            .iter()
            .find(|r| r.city.display_name.eq_ignore_ascii_case(display_name))
    }
}

/// Fetches every city concurrently and waits for all of them.
///
/// One city failing never aborts the others; each outcome lands in its own
/// [`CityReport`]. The returned reports keep the order of `cities`.
pub async fn poll_all(
    source: &dyn AirQualitySource,
    cities: &'static [MonitoredCity],
) -> PollBatch {
    let started_at = Utc::now();
    tracing::debug!(cities = cities.len(), source = source.description(), "poll started");

    let fetches = cities.iter().map(|city| async move {
        let outcome = source.fetch(city).await;
        if let Err(e) = &outcome {
            tracing::warn!(city = city.display_name, error = %e, "fetch failed");
        }
        CityReport {
            city,
            fetched_at: Utc::now(),
            outcome,
        }
    });
    let reports = join_all(fetches).await;

    let batch = PollBatch {
        reports,
        started_at,
        finished_at: Utc::now(),
    };

    let ok = batch.succeeded();
    let total = batch.reports.len();
    let elapsed_ms = (batch.finished_at - batch.started_at).num_milliseconds();
    if ok == total {
        tracing::info!(ok, total, elapsed_ms, "poll complete");
    } else if ok > 0 {
        tracing::warn!(ok, total, elapsed_ms, "poll complete with failures");
    } else {
        tracing::error!(total, elapsed_ms, "poll failed for every city");
    }

    batch
}
