//! IQAir AirVisual API client.
//!
//! Fetches current conditions for one city from the `/city` endpoint and
//! normalizes the response into a [`Reading`].
//!
//! API documentation: https://api-docs.iqair.com/
//!
//! ## Response shape
//!
//! ```json
//! {
//!   "status": "success",
//!   "data": {
//!     "city": "Rome",
//!     "current": {
//!       "pollution": { "ts": "2024-05-01T12:00:00.000Z", "aqius": 42, "mainus": "p2",
//!                      "p2": { "conc": 10.2 } },
//!       "weather":   { "tp": 21, "hu": 60, "pr": 1013, "ws": 3.1 }
//!     }
//!   }
//! }
//! ```
//!
//! On failure `data` is `{ "message": "..." }` and `status` is `"fail"`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::AirQualitySource;
use crate::data::{MonitoredCity, Pollutants, Reading, SourceKind, Weather, DEFAULT_COUNTRY};
use crate::error::FetchError;

/// Public AirVisual endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.airvisual.com/v2";

/// Value shipped in example configs; treated the same as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_IQAIR_API_KEY_HERE";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// API Response Structures
// ============================================================================

/// Top-level envelope returned by every AirVisual endpoint.
#[derive(Debug, Deserialize)]
pub struct IqAirResponse {
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl IqAirResponse {
    /// Returns `data.message`, present on error payloads.
    pub fn message(&self) -> Option<String> {
        self.data
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct CityData {
    city: Option<String>,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    pollution: Pollution,
    weather: Option<WeatherData>,
}

#[derive(Debug, Deserialize)]
struct Pollution {
    ts: DateTime<Utc>,
    aqius: u32,
    mainus: Option<String>,
    p2: Option<Concentration>,
    p1: Option<Concentration>,
    o3: Option<Concentration>,
    n2: Option<Concentration>,
    co: Option<Concentration>,
}

#[derive(Debug, Deserialize)]
struct Concentration {
    conc: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherData {
    tp: f64,
    hu: f64,
    pr: f64,
    ws: f64,
}

fn conc(c: &Option<Concentration>) -> f64 {
    c.as_ref().map(|c| c.conc).unwrap_or(0.0)
}

/// Maps an upstream envelope into a [`Reading`] for `city`.
///
/// A `status` other than `"success"` becomes [`FetchError::Api`]; a
/// successful envelope whose `data` does not match the expected shape
/// becomes [`FetchError::Parse`].
pub fn normalize(city: &MonitoredCity, response: IqAirResponse) -> Result<Reading, FetchError> {
    if response.status != "success" {
        return Err(FetchError::Api(
            response.message().unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let data: CityData = serde_json::from_value(response.data)?;
    let pollution = data.current.pollution;

    let pollutants = Pollutants {
        pm25: conc(&pollution.p2),
        pm10: conc(&pollution.p1),
        o3: conc(&pollution.o3),
        no2: conc(&pollution.n2),
        co: conc(&pollution.co),
    };

    let mut reading = Reading::new(
        city.display_name,
        pollution.aqius,
        pollutants,
        pollution.ts,
        SourceKind::IqAir,
    );
    reading.main_pollutant = pollution.mainus;
    reading.location_name = data.city;
    reading.weather = data.current.weather.map(|w| Weather {
        temperature_c: w.tp,
        humidity_pct: w.hu,
        pressure_hpa: w.pr,
        wind_speed_ms: w.ws,
    });

    Ok(reading)
}

// ============================================================================
// Client
// ============================================================================

/// Live data source backed by the AirVisual `/city` endpoint.
///
/// The base URL may point at a proxy that injects the key server-side, in
/// which case the key can be left empty.
#[derive(Debug, Clone)]
pub struct IqAirSource {
    client: Client,
    base_url: String,
    api_key: String,
    country: String,
    description: String,
}

impl IqAirSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> IqAirSourceBuilder {
        IqAirSourceBuilder::default()
    }
}

/// Returns true if `key` looks like an actual key rather than a placeholder.
pub fn has_real_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

#[async_trait]
impl AirQualitySource for IqAirSource {
    async fn fetch(&self, city: &MonitoredCity) -> Result<Reading, FetchError> {
        let url = format!("{}/city", self.base_url);

        // The key stays out of the logs.
        tracing::debug!(
            city = city.display_name,
            "GET {}?city={}&state={}&country={}&key=<hidden>",
            url,
            city.api_city,
            city.region,
            self.country
        );

        let mut query = vec![
            ("city", city.api_city),
            ("state", city.region),
            ("country", self.country.as_str()),
        ];
        if !self.api_key.is_empty() {
            query.push(("key", self.api_key.as_str()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<IqAirResponse>(&body)
                .ok()
                .and_then(|r| r.message())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string()
                });
            return Err(FetchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: IqAirResponse = serde_json::from_str(&body)?;
        let reading = normalize(city, envelope)?;

        tracing::debug!(
            city = city.display_name,
            aqi = reading.aqi,
            main = reading.main_pollutant.as_deref().unwrap_or("-"),
            "reading received"
        );
        Ok(reading)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::IqAir
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for configuring an [`IqAirSource`].
#[derive(Debug, Default)]
pub struct IqAirSourceBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    country: Option<String>,
    timeout: Option<Duration>,
}

impl IqAirSourceBuilder {
    /// Set the API base URL (defaults to [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the country sent with every request (defaults to Italy).
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> anyhow::Result<IqAirSource> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("iqair: {}", base_url);

        Ok(IqAirSource {
            client,
            base_url,
            api_key: self.api_key.unwrap_or_default(),
            country: self.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            description,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
