//! # airwatch
//!
//! A terminal dashboard and library for monitoring air quality across
//! Italian cities.
//!
//! Readings come either from a local pseudo-random generator (no API key
//! needed) or from the IQAir AirVisual API. Every monitored city is polled
//! concurrently; the results are classified into the six US AQI bands,
//! summarized, and shown worst-first in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Application                            │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐    │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │    │
//! │  │ (state) │    │ (stats)  │    │(render) │    │          │    │
//! │  └────┬────┘    └──────────┘    └─────────┘    └──────────┘    │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐                     │
//! │  │ monitor │───▶│  poller  │───▶│ source  │◀── Simulated | IqAir│
//! │  │ (timer) │    │(fan-out) │    │ (fetch) │                     │
//! │  └─────────┘    └──────────┘    └─────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: application state, selection, export
//! - **[`monitor`]**: start/stop/refresh control over the repeating poll
//! - **[`poller`]**: concurrent fetch of every city into a [`PollBatch`]
//! - **[`source`]**: the [`AirQualitySource`] trait with simulated and IQAir implementations
//! - **[`data`]**: AQI bands, the city registry, readings and statistics
//! - **[`config`]**: layered settings (file, environment, command line)
//! - **[`ui`]**: terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Simulated readings, no key required
//! airwatch
//!
//! # Live readings from IQAir, polled every 5 minutes
//! AIRWATCH_API_KEY=... airwatch --mode live
//!
//! # Poll once and write JSON
//! airwatch --export snapshot.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use airwatch::{poll_all, SimulatedSource, Summary, CITY_REGISTRY};
//!
//! # tokio_test::block_on(async {
//! let source = SimulatedSource::builder().seed(1).no_delay().failure_rate(0.0).build();
//! let batch = poll_all(&source, CITY_REGISTRY).await;
//! assert_eq!(batch.reports.len(), CITY_REGISTRY.len());
//!
//! let summary = Summary::compute(&batch.reports).expect("no failures");
//! assert!(summary.min <= summary.average && summary.average <= summary.max);
//! # });
//! ```
//!
//! ### Driving the controller
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use airwatch::{MonitorController, SimulatedSource, CITY_REGISTRY};
//!
//! # tokio_test::block_on(async {
//! let source = Arc::new(SimulatedSource::new());
//! let mut monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
//! monitor.start();
//! while let Some(batch) = monitor.recv_batch().await {
//!     println!("{}/{} cities reported", batch.succeeded(), batch.reports.len());
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod monitor;
pub mod poller;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Mode, Settings};
pub use data::{
    classify, sorted_reports, Category, CityReport, MonitoredCity, Pollutants, Reading, SourceKind,
    Summary, Weather, CATEGORIES, CITY_REGISTRY,
};
pub use error::FetchError;
pub use monitor::{MonitorController, StartOutcome};
pub use poller::{poll_all, PollBatch};
pub use source::{AirQualitySource, IqAirSource, SimulatedSource};
