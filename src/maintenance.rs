/*!
 * Maintenance Task
 * Background cache sweeping and audit retention cleanup
 *
 * Runs on the tokio runtime; audit cleanup is blocking file I/O and is
 * moved to the blocking pool. Controlled through a command channel and
 * stopped by an explicit shutdown that waits for the loop to exit.
 */

use crate::audit::AuditLog;
use crate::core::limits::{AUDIT_CLEANUP_INTERVAL, CACHE_SWEEP_INTERVAL};
use crate::permissions::cache::DecisionCache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Control messages for the maintenance task
#[derive(Debug, Clone)]
pub enum MaintenanceCommand {
    /// Sweep the cache and clean up the audit log now
    Trigger,
    /// Stop the task
    Shutdown,
}

/// Periods for the two jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceIntervals {
    pub cache_sweep: Duration,
    pub audit_cleanup: Duration,
}

impl Default for MaintenanceIntervals {
    fn default() -> Self {
        Self {
            cache_sweep: CACHE_SWEEP_INTERVAL,
            audit_cleanup: AUDIT_CLEANUP_INTERVAL,
        }
    }
}

/// Work done so far
#[derive(Debug, Default)]
pub struct MaintenanceStats {
    sweeps: AtomicU64,
    entries_swept: AtomicU64,
    cleanups: AtomicU64,
    rows_pruned: AtomicU64,
    cleanup_failures: AtomicU64,
}

impl MaintenanceStats {
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    pub fn entries_swept(&self) -> u64 {
        self.entries_swept.load(Ordering::Relaxed)
    }

    pub fn cleanups(&self) -> u64 {
        self.cleanups.load(Ordering::Relaxed)
    }

    pub fn rows_pruned(&self) -> u64 {
        self.rows_pruned.load(Ordering::Relaxed)
    }

    pub fn cleanup_failures(&self) -> u64 {
        self.cleanup_failures.load(Ordering::Relaxed)
    }
}

/// Handle to the maintenance background task
pub struct MaintenanceTask {
    command_tx: mpsc::UnboundedSender<MaintenanceCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
    stats: Arc<MaintenanceStats>,
}

impl MaintenanceTask {
    /// Spawn on the current tokio runtime
    pub fn spawn(
        cache: Arc<DecisionCache>,
        audit: Option<Arc<AuditLog>>,
        intervals: MaintenanceIntervals,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(MaintenanceStats::default());

        let jobs = Jobs {
            cache,
            audit,
            stats: Arc::clone(&stats),
        };
        let handle = tokio::spawn(run_maintenance_loop(jobs, intervals, command_rx));

        info!(
            cache_sweep_secs = intervals.cache_sweep.as_secs(),
            audit_cleanup_secs = intervals.audit_cleanup.as_secs(),
            "Maintenance task spawned"
        );

        Self {
            command_tx,
            handle: Some(handle),
            stats,
        }
    }

    /// Run both jobs immediately
    pub fn trigger(&self) {
        let _ = self.command_tx.send(MaintenanceCommand::Trigger);
    }

    pub fn stats(&self) -> &Arc<MaintenanceStats> {
        &self.stats
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(MaintenanceCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Maintenance task shutdown error");
            } else {
                info!("Maintenance task shutdown complete");
            }
        }
    }
}

impl Drop for MaintenanceTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(MaintenanceCommand::Shutdown);
        }
    }
}

struct Jobs {
    cache: Arc<DecisionCache>,
    audit: Option<Arc<AuditLog>>,
    stats: Arc<MaintenanceStats>,
}

impl Jobs {
    fn sweep_cache(&self) {
        let removed = self.cache.sweep_expired();
        self.stats.sweeps.fetch_add(1, Ordering::Relaxed);
        self.stats
            .entries_swept
            .fetch_add(removed as u64, Ordering::Relaxed);
        trace!(removed, "Decision cache swept");
    }

    async fn cleanup_audit(&self) {
        let Some(audit) = self.audit.clone() else {
            return;
        };

        match tokio::task::spawn_blocking(move || audit.cleanup()).await {
            Ok(Ok(report)) => {
                self.stats.cleanups.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .rows_pruned
                    .fetch_add(report.total() as u64, Ordering::Relaxed);
                debug!(removed = report.total(), "Audit retention cleanup finished");
            }
            Ok(Err(e)) => {
                self.stats.cleanup_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Audit retention cleanup failed");
            }
            Err(e) => {
                self.stats.cleanup_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Audit retention cleanup task failed");
            }
        }
    }
}

async fn run_maintenance_loop(
    jobs: Jobs,
    intervals: MaintenanceIntervals,
    mut command_rx: mpsc::UnboundedReceiver<MaintenanceCommand>,
) {
    let start = Instant::now();
    let mut sweep = interval_at(start + intervals.cache_sweep, intervals.cache_sweep);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cleanup = interval_at(start + intervals.audit_cleanup, intervals.audit_cleanup);
    cleanup.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!("Maintenance loop started");

    loop {
        tokio::select! {
            _ = sweep.tick() => jobs.sweep_cache(),

            _ = cleanup.tick() => jobs.cleanup_audit().await,

            command = command_rx.recv() => match command {
                Some(MaintenanceCommand::Trigger) => {
                    jobs.sweep_cache();
                    jobs.cleanup_audit().await;
                }
                Some(MaintenanceCommand::Shutdown) | None => {
                    info!("Maintenance task shutting down");
                    break;
                }
            },
        }
    }
}
