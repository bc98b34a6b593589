//! Normalized air-quality readings.
//!
//! Both data sources produce the same [`Reading`] shape; one poll produces
//! one [`CityReport`] per monitored city.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::{classify, Category};
use super::cities::MonitoredCity;
use crate::error::FetchError;

/// Which kind of source produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Pseudo-random readings generated locally.
    Simulated,
    /// Real readings from the IQAir AirVisual API.
    IqAir,
}

impl SourceKind {
    /// Returns the display label for this source.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Simulated => "DEMO DATA",
            SourceKind::IqAir => "LIVE - IQAir",
        }
    }

    /// Units for pm2.5, pm10, o3, no2 and co, in that order.
    pub fn pollutant_units(&self) -> [&'static str; 5] {
        match self {
            SourceKind::Simulated => ["µg/m³", "µg/m³", "ppb", "ppb", "ppm"],
            SourceKind::IqAir => ["µg/m³"; 5],
        }
    }
}

/// Pollutant concentrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pollutants {
    pub pm25: f64,
    pub pm10: f64,
    pub o3: f64,
    pub no2: f64,
    pub co: f64,
}

impl Pollutants {
    /// Returns `(name, value)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("PM2.5", self.pm25),
            ("PM10", self.pm10),
            ("O₃", self.o3),
            ("NO₂", self.no2),
            ("CO", self.co),
        ]
    }
}

/// Display name for an upstream pollutant code such as `"p2"`.
///
/// Unknown codes are returned unchanged.
pub fn pollutant_name(code: &str) -> &str {
    match code {
        "p2" => "PM2.5",
        "p1" => "PM10",
        "o3" => "O₃",
        "n2" => "NO₂",
        "s2" => "SO₂",
        "co" => "CO",
        other => other,
    }
}

/// Weather conditions reported alongside live readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weather {
    /// Temperature in °C.
    pub temperature_c: f64,
    /// Relative humidity in %.
    pub humidity_pct: f64,
    /// Atmospheric pressure in hPa.
    pub pressure_hpa: f64,
    /// Wind speed in m/s.
    pub wind_speed_ms: f64,
}

/// One city's normalized snapshot for one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Display name of the city.
    pub city: String,
    pub aqi: u32,
    pub category: &'static Category,
    pub pollutants: Pollutants,
    /// Dominant pollutant code as reported upstream (e.g. "p2").
    pub main_pollutant: Option<String>,
    pub weather: Option<Weather>,
    /// Name of the station/city the upstream matched.
    pub location_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub source: SourceKind,
}

impl Reading {
    /// Builds a reading, deriving the category from the index.
    pub fn new(
        city: &str,
        aqi: u32,
        pollutants: Pollutants,
        timestamp: DateTime<Utc>,
        source: SourceKind,
    ) -> Self {
        Self {
            city: city.to_string(),
            aqi,
            category: classify(aqi),
            pollutants,
            main_pollutant: None,
            weather: None,
            location_name: None,
            timestamp,
            source,
        }
    }
}

/// Outcome of one city's fetch within a poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityReport {
    pub city: &'static MonitoredCity,
    pub fetched_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: Result<Reading, FetchError>,
}

impl CityReport {
    /// Returns the reading if the fetch succeeded.
    pub fn reading(&self) -> Option<&Reading> {
        self.outcome.as_ref().ok()
    }

    /// Returns the error if the fetch failed.
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Returns the index, or `None` for failed fetches.
    pub fn aqi(&self) -> Option<u32> {
        self.reading().map(|r| r.aqi)
    }
}

fn serialize_outcome<S>(outcome: &Result<Reading, FetchError>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = s.serialize_map(Some(1))?;
    match outcome {
        Ok(reading) => map.serialize_entry("reading", reading)?,
        Err(err) => map.serialize_entry("error", &err.to_string())?,
    }
    map.end()
}
