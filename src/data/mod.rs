//! Data models and processing for air-quality readings.
//!
//! ## Submodules
//!
//! - [`category`]: the six AQI bands and [`classify`]
//! - [`cities`]: the registry of monitored cities
//! - [`duration`]: parsing and formatting of interval strings (e.g., "90s", "5m")
//! - [`reading`]: normalized [`Reading`]s and per-city [`CityReport`]s
//! - [`stats`]: aggregate [`Summary`] and display ordering
//!
//! ## Data Flow
//!
//! ```text
//! AirQualitySource::fetch()   (one per city, concurrently)
//!        │
//!        ▼
//! CityReport { outcome: Result<Reading, FetchError> }
//!        │
//!        ├──▶ Summary::compute()   (successes only)
//!        │
//!        └──▶ sorted_reports()     (descending index, errors last)
//! ```

pub mod category;
pub mod cities;
pub mod duration;
pub mod reading;
pub mod stats;

pub use category::{classify, Category, CATEGORIES};
pub use cities::{MonitoredCity, CITY_REGISTRY, DEFAULT_COUNTRY};
pub use reading::{pollutant_name, CityReport, Pollutants, Reading, SourceKind, Weather};
pub use stats::{sorted_reports, worst_severity, Summary};
