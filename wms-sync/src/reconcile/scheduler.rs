//! Pass scheduler
//!
//! ```text
//! Idle ──(startup delay | interval tick | manual)──▶ Running ──▶ Idle
//! ```
//!
//! One slot, taken with `try_lock`: a trigger that arrives while a pass is
//! running is rejected, never queued.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::RwLock;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::engine::ReconcileEngine;
use super::stats::{PassStats, StatsAggregator, TriggerSource};
use crate::audit::AuditLog;
use crate::core::tasks::panic_message;

/// Default interval between timer passes (2h)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(7200);
/// Default delay before the start-up pass
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("A reconciliation pass is already running")]
    AlreadyRunning,

    #[error("Reconciliation pass aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_trigger: Option<TriggerSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_since: Option<DateTime<Utc>>,
    pub last_trigger: Option<TriggerSource>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub interval_secs: u64,
}

/// Result of an on-demand run, never an error
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PassStats>,
}

pub struct Scheduler {
    engine: Arc<ReconcileEngine>,
    stats: Arc<StatsAggregator>,
    audit: AuditLog,
    interval: Duration,
    startup_delay: Duration,
    slot: tokio::sync::Mutex<()>,
    status: RwLock<SchedulerStatus>,
}

fn after(delay: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(delay)
        .ok()
        .map(|d| Utc::now() + d)
}

impl Scheduler {
    pub fn new(
        engine: Arc<ReconcileEngine>,
        stats: Arc<StatsAggregator>,
        audit: AuditLog,
        interval: Duration,
        startup_delay: Duration,
    ) -> Self {
        let interval = interval.max(Duration::from_secs(1));
        Self {
            engine,
            stats,
            audit,
            interval,
            startup_delay,
            slot: tokio::sync::Mutex::new(()),
            status: RwLock::new(SchedulerStatus {
                interval_secs: interval.as_secs(),
                ..Default::default()
            }),
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.status.read().running
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    /// Run one pass now, unless one is already running
    pub async fn trigger(&self, source: TriggerSource) -> Result<PassStats, TriggerError> {
        let Ok(_slot) = self.slot.try_lock() else {
            return Err(TriggerError::AlreadyRunning);
        };

        {
            let mut status = self.status.write();
            status.running = true;
            status.current_trigger = Some(source);
            status.running_since = Some(Utc::now());
        }

        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.engine.run_pass(source))
            .catch_unwind()
            .await;

        {
            let mut status = self.status.write();
            status.running = false;
            status.current_trigger = None;
            status.running_since = None;
            status.last_trigger = Some(source);
            status.last_finished_at = Some(Utc::now());
            status.last_duration_ms = Some(started.elapsed().as_millis() as u64);
        }

        match outcome {
            Ok(stats) => {
                self.stats.record(&stats);
                Ok(stats)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                self.audit
                    .error(format!("Reconciliation pass ({source}) aborted: {message}"));
                Err(TriggerError::Aborted(message))
            }
        }
    }

    /// On-demand trigger for the control surface
    pub async fn run_now(&self) -> RunOutcome {
        let started = Instant::now();
        let result = self.trigger(TriggerSource::Manual).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(stats) => RunOutcome {
                success: true,
                message: format!(
                    "Reconciliation completed: {} processed, {} failed, {} skipped",
                    stats.processed, stats.failed, stats.skipped
                ),
                duration_ms,
                stats: Some(stats),
            },
            Err(TriggerError::AlreadyRunning) => {
                self.audit
                    .warn("Manual reconciliation rejected: a pass is already running");
                RunOutcome {
                    success: false,
                    message: TriggerError::AlreadyRunning.to_string(),
                    duration_ms,
                    stats: None,
                }
            }
            Err(e) => RunOutcome {
                success: false,
                message: e.to_string(),
                duration_ms,
                stats: None,
            },
        }
    }

    async fn fire(&self, source: TriggerSource) {
        if let Err(TriggerError::AlreadyRunning) = self.trigger(source).await {
            self.audit.warn(format!(
                "{source} trigger skipped: a reconciliation pass is already running"
            ));
        }
    }

    /// Worker loop: start-up pass after the delay, then one pass per interval
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            startup_delay_secs = self.startup_delay.as_secs(),
            "Reconciliation scheduler started"
        );

        self.status.write().next_run_at = after(self.startup_delay);
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Reconciliation scheduler stopped before start-up pass");
                return;
            }
            _ = tokio::time::sleep(self.startup_delay) => {}
        }
        self.fire(TriggerSource::Startup).await;

        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.status.write().next_run_at = after(self.interval);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.fire(TriggerSource::Timer).await,
            }
        }

        self.status.write().next_run_at = None;
        tracing::info!("Reconciliation scheduler stopped");
    }
}
