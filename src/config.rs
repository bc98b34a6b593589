//! Layered settings.
//!
//! Values are resolved in order, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `airwatch.toml` in the working directory if present)
//! 3. environment variables prefixed with `AIRWATCH_` (nested keys use `__`,
//!    e.g. `AIRWATCH_SIMULATION__FAILURE_RATE`)
//! 4. command-line flags
//!
//! `IQAIR_API_KEY` is honoured when no key was configured otherwise.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::data::duration::parse_duration;
use crate::data::{SourceKind, DEFAULT_COUNTRY};
use crate::monitor::default_interval;
use crate::source::{has_real_key, AirQualitySource, IqAirSource, SimulatedSource, DEFAULT_BASE_URL};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "airwatch.toml";

const ENV_PREFIX: &str = "AIRWATCH";
const API_KEY_FALLBACK_VAR: &str = "IQAIR_API_KEY";

/// Where readings come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Locally generated readings.
    #[default]
    Simulated,
    /// The IQAir AirVisual API.
    Live,
}

impl Mode {
    pub fn source_kind(self) -> SourceKind {
        match self {
            Mode::Simulated => SourceKind::Simulated,
            Mode::Live => SourceKind::IqAir,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_country")]
    pub country: String,

    /// Poll interval such as "90s" or "5m"; the mode's default when unset.
    #[serde(default)]
    pub interval: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Start monitoring as soon as the dashboard opens.
    #[serde(default = "default_autostart")]
    pub autostart: bool,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Tuning for the simulated source.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,

    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,

    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_autostart() -> bool {
    true
}

fn default_failure_rate() -> f64 {
    crate::source::DEFAULT_FAILURE_RATE
}

fn default_min_latency_ms() -> u64 {
    500
}

fn default_max_latency_ms() -> u64 {
    1500
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            failure_rate: default_failure_rate(),
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
            seed: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            api_key: String::new(),
            base_url: default_base_url(),
            country: default_country(),
            interval: None,
            timeout_secs: default_timeout_secs(),
            autostart: default_autostart(),
            simulation: SimulationSettings::default(),
        }
    }
}

/// Values supplied on the command line; `None` leaves the setting alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<Mode>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub interval: Option<String>,
    pub no_autostart: bool,
}

impl Settings {
    /// Load settings from an optional file plus the process environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = load_from(path, None)?;
        settings.apply_key_fallback(std::env::var(API_KEY_FALLBACK_VAR).ok());
        Ok(settings)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(key) = overrides.api_key {
            self.api_key = key;
        }
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if let Some(interval) = overrides.interval {
            self.interval = Some(interval);
        }
        if overrides.no_autostart {
            self.autostart = false;
        }
        self
    }

    fn apply_key_fallback(&mut self, fallback: Option<String>) {
        if self.api_key.trim().is_empty() {
            if let Some(key) = fallback {
                self.api_key = key;
            }
        }
    }

    /// Resolved poll interval.
    pub fn poll_interval(&self) -> Result<Duration> {
        match &self.interval {
            Some(s) => parse_duration(s).with_context(|| format!("invalid interval {:?}", s)),
            None => Ok(default_interval(self.mode.source_kind())),
        }
    }

    /// True in live mode when no usable API key is configured.
    pub fn api_key_missing(&self) -> bool {
        self.mode == Mode::Live && !has_real_key(&self.api_key)
    }

    /// Build the data source for the configured mode.
    pub fn build_source(&self) -> Result<Arc<dyn AirQualitySource>> {
        let source: Arc<dyn AirQualitySource> = match self.mode {
            Mode::Simulated => {
                let sim = &self.simulation;
                let mut builder = SimulatedSource::builder()
                    .latency(
                        Duration::from_millis(sim.min_latency_ms),
                        Duration::from_millis(sim.max_latency_ms.max(sim.min_latency_ms)),
                    )
                    .failure_rate(sim.failure_rate);
                if let Some(seed) = sim.seed {
                    builder = builder.seed(seed);
                }
                Arc::new(builder.build())
            }
            Mode::Live => Arc::new(
                IqAirSource::builder()
                    .base_url(&self.base_url)
                    .api_key(&self.api_key)
                    .country(&self.country)
                    .timeout(Duration::from_secs(self.timeout_secs))
                    .build()
                    .context("failed to build HTTP client")?,
            ),
        };
        Ok(source)
    }
}

fn load_from(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Settings> {
    let file = match path {
        Some(p) => File::from(p).required(true),
        None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(env),
        )
        .build()
        .context("failed to read configuration")?;

    config
        .try_deserialize()
        .context("invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.mode, Mode::Simulated);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.country, "Italy");
        assert!(settings.autostart);
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_live_mode_defaults_to_five_minutes() {
        let settings = Settings {
            mode: Mode::Live,
            ..Settings::default()
        };
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            mode = "live"
            api_key = "abc"
            interval = "2m"
            autostart = false

            [simulation]
            failure_rate = 0.5
            seed = 11
            "#,
        );
        let settings = load_from(Some(file.path()), no_env()).unwrap();

        assert_eq!(settings.mode, Mode::Live);
        assert_eq!(settings.api_key, "abc");
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_secs(120));
        assert!(!settings.autostart);
        assert_eq!(settings.simulation.failure_rate, 0.5);
        assert_eq!(settings.simulation.seed, Some(11));
        assert_eq!(settings.simulation.max_latency_ms, 1500);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_from(Some(&missing), no_env()).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("mode = \"simulated\"\ncountry = \"Italy\"\n");
        let env = [
            ("AIRWATCH_MODE", "live"),
            ("AIRWATCH_SIMULATION__FAILURE_RATE", "0.25"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let settings = load_from(Some(file.path()), Some(env)).unwrap();

        assert_eq!(settings.mode, Mode::Live);
        assert_eq!(settings.simulation.failure_rate, 0.25);
    }

    #[test]
    fn test_cli_overrides_win() {
        let settings = Settings::default().with_overrides(Overrides {
            mode: Some(Mode::Live),
            api_key: Some("from-cli".to_string()),
            interval: Some("90s".to_string()),
            no_autostart: true,
            ..Overrides::default()
        });
        assert_eq!(settings.mode, Mode::Live);
        assert_eq!(settings.api_key, "from-cli");
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_secs(90));
        assert!(!settings.autostart);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_key_fallback_only_when_unset() {
        let mut settings = Settings::default();
        settings.apply_key_fallback(Some("env-key".to_string()));
        assert_eq!(settings.api_key, "env-key");

        settings.apply_key_fallback(Some("other".to_string()));
        assert_eq!(settings.api_key, "env-key");
    }

    #[test]
    fn test_api_key_missing_only_matters_in_live_mode() {
        let mut settings = Settings::default();
        assert!(!settings.api_key_missing());

        settings.mode = Mode::Live;
        assert!(settings.api_key_missing());

        settings.api_key = crate::source::PLACEHOLDER_API_KEY.to_string();
        assert!(settings.api_key_missing());

        settings.api_key = "real".to_string();
        assert!(!settings.api_key_missing());
    }

    #[test]
    fn test_bad_interval_is_reported() {
        let settings = Settings {
            interval: Some("often".to_string()),
            ..Settings::default()
        };
        let err = settings.poll_interval().unwrap_err();
        assert!(err.to_string().contains("often"));
    }

    #[test]
    fn test_huge_interval_is_an_error() {
        let settings = Settings {
            interval: Some("1e20s".to_string()),
            ..Settings::default()
        };
        assert!(settings.poll_interval().is_err());
    }

    #[test]
    fn test_build_source_matches_mode() {
        let settings = Settings::default();
        assert_eq!(settings.build_source().unwrap().kind(), SourceKind::Simulated);

        let settings = Settings {
            mode: Mode::Live,
            base_url: "http://localhost:9".to_string(),
            ..Settings::default()
        };
        let source = settings.build_source().unwrap();
        assert_eq!(source.kind(), SourceKind::IqAir);
        assert_eq!(source.description(), "iqair: http://localhost:9");
    }
}
