//! Start/stop control over the repeating poll cycle.
//!
//! The controller is a two-state machine (idle / running). While running, a
//! background timer task spawns one poll per tick. Every poll, whether from
//! the timer or from [`MonitorController::refresh_now`], runs in its own task
//! and delivers its [`PollBatch`] over a channel the app drains each frame.
//!
//! ```text
//!            start()                      stop()
//!   Idle ───────────────▶ Running ───────────────▶ Idle
//!    │  ▲                  │   │
//!    │  └── refresh_now ───┘   └── tick ──▶ spawn poll ──▶ batch channel
//!    └─────── refresh_now ───────────────▶ spawn poll ──▶ batch channel
//! ```
//!
//! Stopping aborts the timer only; a poll that already started still
//! completes and is delivered.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::data::{MonitoredCity, SourceKind};
use crate::poller::{poll_all, PollBatch};
use crate::source::AirQualitySource;

/// Smallest accepted polling interval.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Default interval for a source kind: one minute for simulated data,
/// five minutes against the live API.
pub fn default_interval(kind: SourceKind) -> Duration {
    match kind {
        SourceKind::Simulated => Duration::from_secs(60),
        SourceKind::IqAir => Duration::from_secs(300),
    }
}

/// Result of [`MonitorController::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Monitoring was idle and is now running.
    Started,
    /// Monitoring was already running; nothing changed.
    AlreadyRunning,
}

#[derive(Debug)]
struct Timer {
    task: JoinHandle<()>,
    started_at: Instant,
}

/// Owns the polling timer and the channel of completed batches.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct MonitorController {
    source: Arc<dyn AirQualitySource>,
    cities: &'static [MonitoredCity],
    interval: Duration,
    batch_tx: mpsc::UnboundedSender<PollBatch>,
    batch_rx: mpsc::UnboundedReceiver<PollBatch>,
    timer: Option<Timer>,
    in_flight: Arc<AtomicUsize>,
}

impl MonitorController {
    /// Create an idle controller polling `cities` from `source` every `interval`.
    pub fn new(
        source: Arc<dyn AirQualitySource>,
        cities: &'static [MonitoredCity],
        interval: Duration,
    ) -> Self {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        Self {
            source,
            cities,
            interval: interval.max(MIN_INTERVAL),
            batch_tx,
            batch_rx,
            timer: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Poll immediately, then keep polling on every interval tick.
    pub fn start(&mut self) -> StartOutcome {
        if self.timer.is_some() {
            tracing::warn!("start requested but monitoring is already running");
            return StartOutcome::AlreadyRunning;
        }

        self.spawn_poll();

        let source = Arc::clone(&self.source);
        let cities = self.cities;
        let interval = self.interval;
        let tx = self.batch_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let started_at = Instant::now();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(started_at + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                spawn_poll(Arc::clone(&source), cities, tx.clone(), Arc::clone(&in_flight));
            }
        });

        self.timer = Some(Timer { task, started_at });
        tracing::info!(interval_secs = interval.as_secs(), "monitoring started");
        StartOutcome::Started
    }

    /// Cancel the timer. Returns false if monitoring was not running.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.task.abort();
                tracing::info!("monitoring stopped");
                true
            }
            None => false,
        }
    }

    /// Trigger one poll without touching the timer.
    pub fn refresh_now(&self) {
        tracing::debug!("manual refresh");
        self.spawn_poll();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of polls started but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Time remaining until the next scheduled poll, if running.
    pub fn time_until_next_poll(&self) -> Option<Duration> {
        let timer = self.timer.as_ref()?;
        let elapsed = timer.started_at.elapsed();
        let interval_ms = self.interval.as_millis().max(1);
        let ticks = elapsed.as_millis() / interval_ms + 1;
        let next = Duration::from_millis((ticks * interval_ms) as u64);
        Some(next.saturating_sub(elapsed))
    }

    /// Returns a completed batch if one is waiting.
    pub fn try_recv_batch(&mut self) -> Option<PollBatch> {
        self.batch_rx.try_recv().ok()
    }

    /// Waits for the next completed batch.
    pub async fn recv_batch(&mut self) -> Option<PollBatch> {
        self.batch_rx.recv().await
    }

    pub fn source(&self) -> &dyn AirQualitySource {
        self.source.as_ref()
    }

    fn spawn_poll(&self) {
        spawn_poll(
            Arc::clone(&self.source),
            self.cities,
            self.batch_tx.clone(),
            Arc::clone(&self.in_flight),
        );
    }
}

impl Drop for MonitorController {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.task.abort();
        }
    }
}

fn spawn_poll(
    source: Arc<dyn AirQualitySource>,
    cities: &'static [MonitoredCity],
    tx: mpsc::UnboundedSender<PollBatch>,
    in_flight: Arc<AtomicUsize>,
) {
    in_flight.fetch_add(1, Ordering::SeqCst);
    tokio::spawn(async move {
        let batch = poll_all(source.as_ref(), cities).await;
        in_flight.fetch_sub(1, Ordering::SeqCst);
        if tx.send(batch).is_err() {
            tracing::debug!("controller dropped; discarding batch");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Pollutants, Reading, CITY_REGISTRY};
    use crate::error::FetchError;
    use async_trait::async_trait;
    use chrono::Utc;

    const INTERVAL: Duration = Duration::from_secs(60);

    /// Counts fetches; every fetch takes `delay`.
    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl AirQualitySource for Counting {
        async fn fetch(&self, city: &MonitoredCity) -> Result<Reading, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(Reading::new(
                city.display_name,
                42,
                Pollutants::default(),
                Utc::now(),
                SourceKind::Simulated,
            ))
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Simulated
        }

        fn description(&self) -> &str {
            "counting"
        }
    }

    fn controller(delay: Duration) -> (MonitorController, Arc<Counting>) {
        let source = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            delay,
        });
        let controller = MonitorController::new(source.clone(), CITY_REGISTRY, INTERVAL);
        (controller, source)
    }

    fn drain(controller: &mut MonitorController) -> usize {
        std::iter::from_fn(|| controller.try_recv_batch()).count()
    }

    #[test]
    fn test_default_intervals_per_mode() {
        assert_eq!(default_interval(SourceKind::Simulated), Duration::from_secs(60));
        assert_eq!(default_interval(SourceKind::IqAir), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_is_clamped_to_minimum() {
        let (_, source) = controller(Duration::ZERO);
        let controller = MonitorController::new(source, CITY_REGISTRY, Duration::ZERO);
        assert_eq!(controller.interval(), MIN_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_polls_immediately() {
        let (mut controller, _) = controller(Duration::ZERO);
        assert_eq!(controller.start(), StartOutcome::Started);
        assert!(controller.is_running());

        let batch = controller.recv_batch().await.expect("first poll delivered");
        assert_eq!(batch.reports.len(), CITY_REGISTRY.len());
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_timer() {
        let (mut controller, source) = controller(Duration::ZERO);
        assert_eq!(controller.start(), StartOutcome::Started);
        assert_eq!(controller.start(), StartOutcome::AlreadyRunning);

        tokio::time::sleep(INTERVAL * 3 + Duration::from_millis(10)).await;

        // Immediate poll plus three ticks; a second timer would double this.
        assert_eq!(drain(&mut controller), 4);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4 * CITY_REGISTRY.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_noop() {
        let (mut controller, source) = controller(Duration::ZERO);
        assert!(!controller.stop());
        assert!(!controller.is_running());

        tokio::time::sleep(INTERVAL * 2).await;
        assert_eq!(drain(&mut controller), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_schedule_but_in_flight_poll_completes() {
        let (mut controller, source) = controller(Duration::from_millis(800));
        controller.start();
        tokio::task::yield_now().await;
        assert_eq!(controller.in_flight(), 1);

        assert!(controller.stop());
        assert!(!controller.is_running());
        assert_eq!(controller.time_until_next_poll(), None);

        tokio::time::sleep(INTERVAL * 3).await;

        assert_eq!(drain(&mut controller), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), CITY_REGISTRY.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_does_not_change_state() {
        let (mut controller, _) = controller(Duration::ZERO);

        controller.refresh_now();
        assert!(!controller.is_running());
        assert!(controller.recv_batch().await.is_some());

        controller.start();
        controller.refresh_now();
        assert!(controller.is_running());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(drain(&mut controller), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let (mut controller, _) = controller(Duration::ZERO);
        controller.start();
        controller.stop();
        assert_eq!(controller.start(), StartOutcome::Started);
        assert!(controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_until_next_poll_counts_down() {
        let (mut controller, _) = controller(Duration::ZERO);
        assert_eq!(controller.time_until_next_poll(), None);

        controller.start();
        assert_eq!(controller.time_until_next_poll(), Some(INTERVAL));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(controller.time_until_next_poll(), Some(Duration::from_secs(45)));
    }
}
