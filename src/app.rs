//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{sorted_reports, CityReport, SourceKind, Summary};
use crate::monitor::{MonitorController, StartOutcome};
use crate::poller::PollBatch;
use crate::ui::Theme;

/// Default file written by the in-app export.
pub const DEFAULT_EXPORT_PATH: &str = "airwatch_export.json";

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Monitoring
    monitor: MonitorController,
    pub batch: Option<PollBatch>,
    pub summary: Option<Summary>,
    pub last_update: Option<Instant>,
    /// Live mode without a usable API key.
    pub api_key_missing: bool,

    // Navigation state (index into the sorted card list)
    pub selected_index: usize,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App driving the given controller.
    pub fn new(monitor: MonitorController, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            monitor,
            batch: None,
            summary: None,
            last_update: None,
            api_key_missing: false,
            selected_index: 0,
            theme,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.monitor.source().description()
    }

    pub fn source_kind(&self) -> SourceKind {
        self.monitor.source().kind()
    }

    pub fn monitor(&self) -> &MonitorController {
        &self.monitor
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Start periodic monitoring.
    pub fn start_monitoring(&mut self) {
        match self.monitor.start() {
            StartOutcome::Started => self.set_status_message(format!(
                "Monitoring started (every {})",
                crate::data::duration::format_duration(self.monitor.interval())
            )),
            StartOutcome::AlreadyRunning => {
                self.set_status_message("Monitoring is already running".to_string())
            }
        }
    }

    /// Stop periodic monitoring. Polls already in flight still land.
    pub fn stop_monitoring(&mut self) {
        if self.monitor.stop() {
            self.set_status_message("Monitoring stopped".to_string());
        }
    }

    /// Poll once right now, leaving the schedule alone.
    pub fn refresh(&mut self) {
        self.monitor.refresh_now();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Drain completed polls, keeping only the newest.
    ///
    /// Returns true if a new batch was received.
    pub fn reload_data(&mut self) -> bool {
        let mut latest = None;
        while let Some(batch) = self.monitor.try_recv_batch() {
            latest = Some(batch);
        }
        match latest {
            Some(batch) => {
                self.apply_batch(batch);
                true
            }
            None => false,
        }
    }

    /// Replace the current result set with `batch`.
    pub fn apply_batch(&mut self, batch: PollBatch) {
        self.summary = Summary::compute(&batch.reports);
        self.batch = Some(batch);
        self.last_update = Some(Instant::now());

        // Clamp selection index
        let count = self.report_count();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    /// Reports in display order (worst first, failures last).
    pub fn sorted_reports(&self) -> Vec<&CityReport> {
        match &self.batch {
            Some(batch) => sorted_reports(&batch.reports),
            None => Vec::new(),
        }
    }

    fn report_count(&self) -> usize {
        self.batch.as_ref().map(|b| b.reports.len()).unwrap_or(0)
    }

    /// The report under the cursor.
    pub fn selected_report(&self) -> Option<&CityReport> {
        self.sorted_reports().get(self.selected_index).copied()
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let max = self.report_count().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.report_count().saturating_sub(1);
    }

    /// Open the detail overlay for the selected city.
    pub fn enter_detail(&mut self) {
        if self.selected_report().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the overlay if one is open.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the latest batch to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref batch) = self.batch else {
            anyhow::bail!("No data to export");
        };
        write_export(batch, path)
    }
}

/// Build the JSON export document for a batch.
///
/// Cities appear in display order; `summary` is null when every fetch failed.
pub fn export_json(batch: &PollBatch) -> serde_json::Value {
    let summary = Summary::compute(&batch.reports);
    let cities: Vec<&CityReport> = sorted_reports(&batch.reports);

    serde_json::json!({
        "started_at": batch.started_at,
        "finished_at": batch.finished_at,
        "summary": summary,
        "cities": cities,
    })
}

/// Write a batch as pretty JSON.
pub fn write_export(batch: &PollBatch, path: &Path) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(&export_json(batch))?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;

    tracing::info!(path = %path.display(), cities = batch.reports.len(), "exported batch");
    Ok(())
}
