//! The cycle driver.
//!
//! After a startup delay, runs one task per source, waits for every task to
//! finish, then sleeps a fixed interval measured from the end of the cycle.
//! A stop request is honoured between cycles; a running cycle is never
//! interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::app::AppContext;
use crate::config::Config;
use crate::pipeline::CycleReport;

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Pause before the first cycle so dependent services can come up
    pub startup_delay: Duration,
    /// Sleep between the end of a cycle and the start of the next
    pub cycle_interval: Duration,
    /// Stop after this many cycles (None = run until stopped)
    pub max_cycles: Option<u64>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(60),
            cycle_interval: Duration::from_secs(1800),
            max_cycles: None,
        }
    }
}

impl DaemonConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            startup_delay: config.startup_delay(),
            cycle_interval: config.cycle_interval(),
            max_cycles: None,
        }
    }

    /// Parse interval string like "1h", "30m", "60s", "1d"
    pub fn parse_interval(s: &str) -> Result<u64, String> {
        let s = s.trim().to_lowercase();

        if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .map_err(|_| format!("Invalid hours: {}", hours))
                .and_then(|h| {
                    h.checked_mul(3600)
                        .ok_or_else(|| format!("Interval too large: {}h", hours))
                })
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .map_err(|_| format!("Invalid minutes: {}", minutes))
                .and_then(|m| {
                    m.checked_mul(60)
                        .ok_or_else(|| format!("Interval too large: {}m", minutes))
                })
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .map_err(|_| format!("Invalid days: {}", days))
                .and_then(|d| {
                    d.checked_mul(86400)
                        .ok_or_else(|| format!("Interval too large: {}d", days))
                })
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))
        } else {
            s.parse::<u64>()
                .map_err(|_| format!("Invalid interval: {}. Use format like '30m', '1h', '60s'", s))
        }
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs.is_multiple_of(86400) {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs.is_multiple_of(3600) {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs.is_multiple_of(60) {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

/// Daemon runner
pub struct Daemon {
    ctx: Arc<AppContext>,
    config: DaemonConfig,
    running: Arc<AtomicBool>,
    wakeup: Arc<Notify>,
}

impl Daemon {
    pub fn new(ctx: Arc<AppContext>, config: DaemonConfig) -> Self {
        Self {
            ctx,
            config,
            running: Arc::new(AtomicBool::new(true)),
            wakeup: Arc::new(Notify::new()),
        }
    }

    /// Run cycles until stopped, a signal arrives, or `max_cycles` is reached.
    /// Returns the number of cycles run.
    pub async fn run(&self) -> u64 {
        self.spawn_signal_handler();

        info!(
            sources = self.ctx.sources.len(),
            interval = %DaemonConfig::format_interval(self.config.cycle_interval.as_secs()),
            pid = std::process::id(),
            "Running"
        );

        if !self.config.startup_delay.is_zero() {
            debug!(delay = ?self.config.startup_delay, "Waiting before first cycle");
            self.sleep(self.config.startup_delay).await;
        }

        let mut cycles = 0;
        while self.running.load(Ordering::SeqCst) {
            self.run_cycle().await;
            cycles += 1;

            if self.config.max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            self.sleep(self.config.cycle_interval).await;
        }

        info!(cycles, "Daemon shutting down");
        cycles
    }

    /// Run a single cycle: dispatch every source and wait for all of them.
    pub async fn run_cycle(&self) -> CycleReport {
        let start = Instant::now();
        info!("Starting a new scrape");

        if self.ctx.sources.is_empty() {
            info!("No sources configured; nothing to do");
            return CycleReport::default();
        }

        let tasks = self.ctx.source_tasks();
        let dispatched = tasks.len();
        let outcomes = self.ctx.pool.run_all(tasks).await;

        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                error!(source = %outcome.source, error = %e, "Source task aborted");
            }
        }

        match self.ctx.dedup.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Purged expired dedup records"),
            Err(e) => warn!(error = %e, "Failed to purge expired dedup records"),
        }

        let report = CycleReport::from_outcomes(dispatched, &outcomes);
        info!(
            sources = report.sources,
            fetched = report.fetched,
            published = report.published,
            already_seen = report.already_seen,
            dropped = report.dropped,
            fetch_failures = report.fetch_failures,
            aborted = report.aborted,
            elapsed = ?start.elapsed(),
            "Finished a scrape"
        );
        report
    }

    /// Stop after the current cycle; wakes the daemon if it is sleeping.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wakeup.notify_one();
    }

    async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {},
            _ = self.wakeup.notified() => {},
        }
    }

    fn spawn_signal_handler(&self) {
        let running = self.running.clone();
        let wakeup = self.wakeup.clone();

        tokio::spawn(async move {
            wait_for_signal().await;
            info!("Stop requested; finishing current cycle");
            running.store(false, Ordering::SeqCst);
            wakeup.notify_one();
        });
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        _ => {
            warn!("Failed to set up signal handlers; stop with kill -9");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {},
        _ = sigint.recv() => {},
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Failed to set up Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
