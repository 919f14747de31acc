use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::watcher::{TrackingRequest, Watcher};
use crate::{AppError, Result};

pub const COUNTDOWN_PLACEHOLDER: &str = "next check: --:--";

/// What a scheduled firing re-runs. Snapshotted when auto-check is
/// enabled; changing mode requires a disable/enable toggle.
#[derive(Debug, Clone)]
pub enum CheckMode {
    Single(TrackingRequest),
    Watchlist(PathBuf),
}

struct Shared {
    interval_seconds: AtomicU64,
    remaining_seconds: AtomicU64,
    countdown_tx: watch::Sender<String>,
}

impl Shared {
    /// One countdown tick: display the remaining time, then count down.
    /// At zero the counter free-wheels back to the current interval
    /// setting, which may differ from the cadence the firing timer was
    /// started with.
    fn tick_countdown(&self) {
        let mut remaining = self.remaining_seconds.load(Ordering::Relaxed);
        if remaining == 0 {
            remaining = self.interval_seconds.load(Ordering::Relaxed);
        }

        let (mins, secs) = (remaining / 60, remaining % 60);
        let label = format!("next check in: {:02}:{:02}", mins, secs);
        tracing::debug!("{}", label);
        let _ = self.countdown_tx.send(label);

        self.remaining_seconds.store(remaining.saturating_sub(1), Ordering::Relaxed);
    }
}

/// Repeating auto-check driver.
///
/// Two independent clocks: a firing interval that re-runs the snapshotted
/// check mode, and a one-second countdown that feeds the `mm:ss` display
/// label. Disabling aborts both timer tasks; a check already in flight is
/// left to finish and report.
pub struct AutoCheck {
    watcher: Arc<Watcher>,
    shared: Arc<Shared>,
    countdown_rx: watch::Receiver<String>,
    check_task: Option<JoinHandle<()>>,
    countdown_task: Option<JoinHandle<()>>,
}

impl AutoCheck {
    pub fn new(watcher: Arc<Watcher>) -> Self {
        let (countdown_tx, countdown_rx) = watch::channel(COUNTDOWN_PLACEHOLDER.to_string());

        Self {
            watcher,
            shared: Arc::new(Shared {
                interval_seconds: AtomicU64::new(0),
                remaining_seconds: AtomicU64::new(0),
                countdown_tx,
            }),
            countdown_rx,
            check_task: None,
            countdown_task: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.check_task.is_some()
    }

    /// Watch the `mm:ss` countdown label. Holds the placeholder while
    /// auto-check is disabled.
    pub fn countdown(&self) -> watch::Receiver<String> {
        self.countdown_rx.clone()
    }

    /// Start auto-checking every `interval_minutes` for the given mode.
    /// A zero interval is rejected and the scheduler stays disabled.
    pub fn enable(&mut self, interval_minutes: u64, mode: CheckMode) -> Result<()> {
        let watcher = Arc::clone(&self.watcher);
        let target = match &mode {
            CheckMode::Single(request) => request.url.clone(),
            CheckMode::Watchlist(path) => format!("watchlist {}", path.display()),
        };

        self.enable_cycle(interval_minutes, move || {
            let watcher = Arc::clone(&watcher);
            let mode = mode.clone();
            async move { run_cycle(watcher, mode).await }
        })?;

        tracing::info!("Auto-check every {} min for {}", interval_minutes, target);
        Ok(())
    }

    /// Timer plumbing behind [`enable`](AutoCheck::enable), generic over
    /// the cycle body.
    pub fn enable_cycle<F, Fut>(&mut self, interval_minutes: u64, mut cycle: F) -> Result<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval_minutes == 0 {
            return Err(AppError::Validation(
                "interval must be a positive number of minutes".to_string(),
            ));
        }

        // Detach any previous timers completely before attaching new ones.
        self.disable();

        let interval_seconds = interval_minutes * 60;
        self.shared.interval_seconds.store(interval_seconds, Ordering::Relaxed);
        self.shared.remaining_seconds.store(interval_seconds, Ordering::Relaxed);

        self.check_task = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_seconds));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately on the first tick; the first
            // check fires one full interval after enabling.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                // Run the cycle on its own task: stopping the timers must
                // not cancel a check already in flight.
                let handle = tokio::spawn(cycle());
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        tracing::error!("Scheduled check panicked: {}", e);
                    }
                }
            }
        }));

        let countdown_shared = Arc::clone(&self.shared);
        self.countdown_task = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            // The label starts at the full interval the moment auto-check
            // is enabled.
            countdown_shared.tick_countdown();

            loop {
                ticker.tick().await;
                countdown_shared.tick_countdown();
            }
        }));

        Ok(())
    }

    /// Retune the countdown clock. The firing cadence is whatever it was
    /// at enable time; only a disable/enable toggle changes it.
    pub fn set_interval(&self, interval_minutes: u64) -> Result<()> {
        if interval_minutes == 0 {
            return Err(AppError::Validation(
                "interval must be a positive number of minutes".to_string(),
            ));
        }

        self.shared
            .interval_seconds
            .store(interval_minutes * 60, Ordering::Relaxed);
        Ok(())
    }

    /// Stop future firings and reset the countdown label. An in-flight
    /// check is not interrupted.
    pub fn disable(&mut self) {
        let was_enabled = self.check_task.is_some();

        if let Some(task) = self.check_task.take() {
            task.abort();
        }
        if let Some(task) = self.countdown_task.take() {
            task.abort();
        }

        let _ = self.shared.countdown_tx.send(COUNTDOWN_PLACEHOLDER.to_string());
        if was_enabled {
            tracing::info!("Auto-check disabled");
        }
    }
}

impl Drop for AutoCheck {
    fn drop(&mut self) {
        if let Some(task) = self.check_task.take() {
            task.abort();
        }
        if let Some(task) = self.countdown_task.take() {
            task.abort();
        }
    }
}

/// One scheduled pipeline pass. Failures are logged per cycle and never
/// reach the timer task.
async fn run_cycle(watcher: Arc<Watcher>, mode: CheckMode) {
    match mode {
        CheckMode::Single(request) => {
            watcher.check(&request).await;
        }
        CheckMode::Watchlist(path) => {
            if let Err(e) = watcher.check_watchlist(&path).await {
                tracing::error!("Error reading watchlist {}: {}", path.display(), e);
            }
        }
    }
}
