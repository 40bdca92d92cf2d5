use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Elapsed-time counter tied to session start/stop
///
/// Driven by a one-second tick task and purely additive; it feeds the
/// duration display and submission metadata, never correctness.
#[derive(Debug, Default)]
pub struct RecordingClock {
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    elapsed_seconds: Arc<AtomicU64>,
    tick_task: Option<JoinHandle<()>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the clock from zero
    pub fn start(&mut self) {
        self.stop_tick();

        self.started_at = Some(Utc::now());
        self.ended_at = None;
        self.elapsed_seconds.store(0, Ordering::SeqCst);

        let elapsed = Arc::clone(&self.elapsed_seconds);
        self.tick_task = Some(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(std::time::Duration::from_secs(1));
            // The first tick completes immediately; skip it
            ticks.tick().await;
            loop {
                ticks.tick().await;
                elapsed.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    /// Stop the clock. Idempotent: a second stop keeps the first end time.
    pub fn stop(&mut self) {
        if self.tick_task.is_none() {
            return;
        }
        self.stop_tick();
        self.ended_at = Some(Utc::now());
    }

    fn stop_tick(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }
}

impl Drop for RecordingClock {
    fn drop(&mut self) {
        self.stop_tick();
    }
}
