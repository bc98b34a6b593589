//! Pipeline Integration Tests
//!
//! These tests drive the public API end to end:
//! - source -> poller -> summary/sort
//! - controller start/stop/refresh delivering batches to the app
//! - dashboard rendering into an in-memory terminal

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use airwatch::ui::{self, Theme};
use airwatch::{
    poll_all, sorted_reports, AirQualitySource, App, FetchError, MonitorController, MonitoredCity,
    Pollutants, Reading, SourceKind, StartOutcome, Summary, CITY_REGISTRY,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Returns a fixed index per city; `None` makes that city fail.
#[derive(Debug)]
struct Scripted {
    aqis: Vec<Option<u32>>,
}

#[async_trait]
impl AirQualitySource for Scripted {
    async fn fetch(&self, city: &MonitoredCity) -> Result<Reading, FetchError> {
        let idx = CITY_REGISTRY
            .iter()
            .position(|c| c == city)
            .ok_or_else(|| FetchError::Api("city_not_found".to_string()))?;
        match self.aqis.get(idx).copied().flatten() {
            Some(aqi) => Ok(Reading::new(
                city.display_name,
                aqi,
                Pollutants {
                    pm25: aqi as f64 * 0.4,
                    ..Pollutants::default()
                },
                Utc::now(),
                SourceKind::Simulated,
            )),
            None => Err(FetchError::Network(format!("{} unreachable", city.display_name))),
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Simulated
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

fn scripted(aqis: &[Option<u32>]) -> Arc<Scripted> {
    Arc::new(Scripted { aqis: aqis.to_vec() })
}

fn render_to_string(app: &App) -> String {
    render_with_width(app, 140)
}

fn render_with_width(app: &App, width: u16) -> String {
    let backend = TestBackend::new(width, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            let chunks = ratatui::layout::Layout::vertical([
                ratatui::layout::Constraint::Length(1),
                ratatui::layout::Constraint::Min(8),
                ratatui::layout::Constraint::Length(1),
            ])
            .split(area);
            ui::common::render_header(frame, app, chunks[0]);
            ui::summary::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }
        })
        .unwrap();

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Poll -> Stats -> Sort
// ============================================================================

#[tokio::test]
async fn test_partial_failure_batch_flows_through_stats_and_sort() {
    let source = scripted(&[Some(45), None, Some(210), Some(88), Some(45), None, Some(130)]);
    let batch = poll_all(source.as_ref(), CITY_REGISTRY).await;

    assert_eq!(batch.reports.len(), 7);
    assert_eq!(batch.failed(), 2);

    let summary = Summary::compute(&batch.reports).expect("five cities succeeded");
    assert_eq!(summary.min, 45);
    assert_eq!(summary.max, 210);
    assert_eq!(summary.best_city, "Roma");
    assert_eq!(summary.worst_city, "Napoli");
    assert_eq!(summary.average, 104); // 518 / 5 = 103.6
    assert_eq!((summary.succeeded, summary.total), (5, 7));

    let order: Vec<_> = sorted_reports(&batch.reports)
        .iter()
        .map(|r| r.city.display_name)
        .collect();
    assert_eq!(
        order,
        ["Napoli", "Venezia", "Torino", "Roma", "Firenze", "Milano", "Bologna"]
    );
}

#[tokio::test]
async fn test_all_failed_batch_has_no_stats() {
    let source = scripted(&[None; 7]);
    let batch = poll_all(source.as_ref(), CITY_REGISTRY).await;

    assert_eq!(batch.succeeded(), 0);
    assert!(Summary::compute(&batch.reports).is_none());
    assert!(sorted_reports(&batch.reports).iter().all(|r| r.is_error()));
}

// ============================================================================
// Controller -> App
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_controller_feeds_app_until_stopped() {
    let source = scripted(&[Some(60); 7]);
    let monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
    let mut app = App::new(monitor, Theme::dark());

    app.start_monitoring();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(app.reload_data());
    assert_eq!(app.summary.as_ref().map(|s| s.average), Some(60));

    // One tick later another batch lands
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(app.reload_data());

    app.stop_monitoring();
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(!app.reload_data());
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_rejected() {
    let source = scripted(&[Some(10); 7]);
    let mut monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));

    assert_eq!(monitor.start(), StartOutcome::Started);
    assert_eq!(monitor.start(), StartOutcome::AlreadyRunning);
    assert!(monitor.stop());
    assert!(!monitor.stop());
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test]
async fn test_dashboard_renders_cities_and_stats() {
    let source = scripted(&[Some(42), None, Some(175), Some(42), Some(42), Some(42), Some(42)]);
    let batch = poll_all(source.as_ref(), CITY_REGISTRY).await;

    let monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
    let mut app = App::new(monitor, Theme::dark());
    app.apply_batch(batch);

    let screen = render_to_string(&app);
    assert!(screen.contains("AIRWATCH"));
    assert!(screen.contains("DEMO DATA"));
    assert!(screen.contains("Average AQI"));
    assert!(screen.contains("Napoli"));
    assert!(screen.contains("Unhealthy"));
    assert!(screen.contains("Milano unreachable"));
    assert!(screen.contains("6/7"));
}

#[tokio::test]
async fn test_wide_dashboard_adds_band_description_column() {
    let source = scripted(&[Some(30); 7]);
    let batch = poll_all(source.as_ref(), CITY_REGISTRY).await;

    let monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
    let mut app = App::new(monitor, Theme::dark());
    app.apply_batch(batch);

    let narrow = render_with_width(&app, 140);
    assert!(!narrow.contains("Description"));
    assert!(!narrow.contains("satisfactory"));

    let wide = render_with_width(&app, 180);
    assert!(wide.contains("Description"));
    assert!(wide.contains("Air quality is satisfactory"));
}

#[tokio::test]
async fn test_dashboard_shows_placeholder_when_nothing_succeeded() {
    let source = scripted(&[None; 7]);
    let batch = poll_all(source.as_ref(), CITY_REGISTRY).await;

    let monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
    let mut app = App::new(monitor, Theme::dark());
    app.api_key_missing = true;
    app.apply_batch(batch);

    let screen = render_to_string(&app);
    assert!(screen.contains("No data available."));
    assert!(screen.contains("IQAir API key"));
    assert!(!screen.contains("Average AQI"));
}

#[tokio::test]
async fn test_detail_overlay_shows_advice() {
    let source = scripted(&[Some(320), Some(20), Some(20), Some(20), Some(20), Some(20), Some(20)]);
    let batch = poll_all(source.as_ref(), CITY_REGISTRY).await;

    let monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
    let mut app = App::new(monitor, Theme::dark());
    app.apply_batch(batch);
    app.enter_detail();
    assert!(app.show_detail_overlay);

    let screen = render_to_string(&app);
    assert!(screen.contains("City Detail"));
    assert!(screen.contains("Roma"));
    assert!(screen.contains("Hazardous"));
    assert!(screen.contains("Advice:"));
}
