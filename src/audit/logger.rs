/*!
 * Audit Log
 * Non-blocking front end over a single writer thread
 *
 * Callers enqueue rows on an unbounded channel and return immediately. One
 * dedicated thread owns the backend and processes commands strictly in
 * submission order: rows, flush barriers, retention cleanups and the final
 * shutdown. Because shutdown is queued behind every earlier row, closing
 * never loses a row submitted before it.
 */

use super::index::AuditIndex;
use super::records::{ActionRecord, AuditRecord, ChangeKind, CleanupReport, ModificationRecord};
use super::store::{AuditBackend, JsonlAuditStore};
use crate::core::config::GuardConfig;
use crate::core::errors::StorageError;
use crate::core::limits::AUDIT_WRITE_ATTEMPTS;
use crate::core::types::AreaId;
use crate::permissions::types::PermissionKind;
use ahash::HashMap;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

type Reply<T> = flume::Sender<Result<T, StorageError>>;

/// Command processed by the writer thread
enum AuditCommand {
    Record(AuditRecord),
    Flush(Reply<()>),
    Cleanup { cutoff: SystemTime, reply: Reply<CleanupReport> },
    Shutdown { backup_dir: Option<PathBuf>, reply: Reply<Option<PathBuf>> },
}

/// Writer thread state
struct AuditWriter {
    backend: Box<dyn AuditBackend>,
    index: Arc<AuditIndex>,
    failed_writes: Arc<AtomicU64>,
}

impl AuditWriter {
    fn run(mut self, receiver: flume::Receiver<AuditCommand>) {
        debug!("Audit writer started");
        while let Ok(command) = receiver.recv() {
            match command {
                AuditCommand::Shutdown { backup_dir, reply } => {
                    // Late rows submitted while shutting down
                    for command in receiver.drain() {
                        self.handle(command);
                    }
                    let _ = reply.send(self.shutdown(backup_dir.as_deref()));
                    break;
                }
                command => self.handle(command),
            }
        }
        debug!("Audit writer stopped");
    }

    fn handle(&mut self, command: AuditCommand) {
        match command {
            AuditCommand::Record(record) => self.write(record),
            AuditCommand::Flush(reply) => {
                let _ = reply.send(self.backend.flush());
            }
            AuditCommand::Cleanup { cutoff, reply } => {
                let _ = reply.send(self.cleanup(cutoff));
            }
            AuditCommand::Shutdown { reply, .. } => {
                let _ = reply.send(Ok(None));
            }
        }
    }

    fn write(&mut self, record: AuditRecord) {
        for attempt in 1..=AUDIT_WRITE_ATTEMPTS {
            match self.backend.append(&record) {
                Ok(()) => {
                    self.index.apply(&record);
                    return;
                }
                Err(e) => warn!(
                    attempt,
                    area = %record.area_id(),
                    error = %e,
                    "Audit write failed"
                ),
            }
        }
        self.failed_writes.fetch_add(1, Ordering::Relaxed);
        warn!(area = %record.area_id(), table = record.table().name(), "Dropping audit record");
    }

    fn cleanup(&mut self, cutoff: SystemTime) -> Result<CleanupReport, StorageError> {
        let report = self.backend.prune_before(cutoff)?;
        if !report.is_empty() {
            self.index.rebuild(self.backend.load()?);
            info!(
                interactions = report.interactions,
                violations = report.violations,
                modifications = report.modifications,
                "Audit retention cleanup removed rows"
            );
        }
        Ok(report)
    }

    fn shutdown(&mut self, backup_dir: Option<&Path>) -> Result<Option<PathBuf>, StorageError> {
        self.backend.flush()?;
        match backup_dir {
            Some(dir) => self.backend.backup(dir).map(Some),
            None => Ok(None),
        }
    }
}

/// Durable audit log
pub struct AuditLog {
    sender: flume::Sender<AuditCommand>,
    index: Arc<AuditIndex>,
    failed_writes: Arc<AtomicU64>,
    rejected: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    retention: Duration,
    backup_dir: PathBuf,
}

impl AuditLog {
    /// Open the JSON-lines tables under `audit_dir`
    pub fn open(
        audit_dir: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
        retention: Duration,
    ) -> Result<Self, StorageError> {
        let backend = JsonlAuditStore::open(audit_dir)?;
        Self::with_backend(Box::new(backend), backup_dir, retention)
    }

    /// Open with directories and retention from configuration
    pub fn from_config(config: &GuardConfig) -> Result<Self, StorageError> {
        Self::open(&config.audit_dir, &config.backup_dir, config.retention())
    }

    /// Start the writer over any backend; the index is built from its contents
    pub fn with_backend(
        backend: Box<dyn AuditBackend>,
        backup_dir: impl Into<PathBuf>,
        retention: Duration,
    ) -> Result<Self, StorageError> {
        let index = Arc::new(AuditIndex::from_dataset(backend.load()?));
        let failed_writes = Arc::new(AtomicU64::new(0));
        let (sender, receiver) = flume::unbounded();

        let writer = AuditWriter {
            backend,
            index: Arc::clone(&index),
            failed_writes: Arc::clone(&failed_writes),
        };
        let handle = thread::Builder::new()
            .name("audit-writer".into())
            .spawn(move || writer.run(receiver))?;

        info!(areas = index.areas().len(), retention_secs = retention.as_secs(), "Audit log opened");

        Ok(Self {
            sender,
            index,
            failed_writes,
            rejected: AtomicU64::new(0),
            worker: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
            retention,
            backup_dir: backup_dir.into(),
        })
    }

    /// Submit a row; never blocks
    pub fn record(&self, record: AuditRecord) {
        if self.closed.load(Ordering::Acquire) || self.sender.send(AuditCommand::Record(record)).is_err() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            debug!("Audit log closed, row discarded");
        }
    }

    pub fn record_interaction(&self, area: impl Into<AreaId>, actor: &str, kind: PermissionKind) {
        self.record(AuditRecord::Interaction(ActionRecord::new(area, actor, kind)));
    }

    pub fn record_violation(&self, area: impl Into<AreaId>, actor: &str, kind: PermissionKind) {
        self.record(AuditRecord::Violation(ActionRecord::new(area, actor, kind)));
    }

    pub fn record_modification(
        &self,
        area: impl Into<AreaId>,
        actor: &str,
        change: ChangeKind,
        detail: impl Into<String>,
    ) {
        self.record(AuditRecord::Modification(ModificationRecord::new(
            area, actor, change, detail,
        )));
    }

    fn request<T>(&self, build: impl FnOnce(Reply<T>) -> AuditCommand) -> Result<T, StorageError> {
        let (reply, response) = flume::bounded(1);
        self.sender
            .send(build(reply))
            .map_err(|_| StorageError::WriterStopped)?;
        response.recv().map_err(|_| StorageError::WriterStopped)?
    }

    /// Wait until every row submitted before this call has been written
    pub fn flush(&self) -> Result<(), StorageError> {
        self.request(AuditCommand::Flush)
    }

    /// Delete rows older than the retention window
    pub fn cleanup(&self) -> Result<CleanupReport, StorageError> {
        // A window reaching before the epoch keeps everything
        match SystemTime::now().checked_sub(self.retention) {
            Some(cutoff) => self.cleanup_before(cutoff),
            None => Ok(CleanupReport::default()),
        }
    }

    /// Delete rows older than `cutoff`
    pub fn cleanup_before(&self, cutoff: SystemTime) -> Result<CleanupReport, StorageError> {
        self.request(|reply| AuditCommand::Cleanup { cutoff, reply })
    }

    /// Interaction counts by action type plus the `VIOLATION` count
    pub fn interaction_stats(&self, area: &str) -> HashMap<String, u64> {
        self.index.interaction_stats(area)
    }

    /// Up to `limit` modification rows, newest first
    pub fn recent_modifications(&self, area: &str, limit: usize) -> Vec<ModificationRecord> {
        self.index.recent_modifications(area, limit)
    }

    /// Rows dropped after exhausting write attempts
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    /// Rows submitted after close
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Drain, flush, write a backup and stop the writer
    ///
    /// Returns the backup path; `None` if already closed.
    pub fn close(&self) -> Result<Option<PathBuf>, StorageError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(None);
        }
        let result = self.request(|reply| AuditCommand::Shutdown {
            backup_dir: Some(self.backup_dir.clone()),
            reply,
        });
        self.join();
        if let Err(e) = &result {
            error!(error = %e, "Audit log close failed");
        }
        result
    }

    fn join(&self) {
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("Audit writer thread panicked");
            }
        }
    }
}

impl Drop for AuditLog {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            let (reply, _response) = flume::bounded(1);
            let _ = self.sender.send(AuditCommand::Shutdown {
                backup_dir: None,
                reply,
            });
            self.join();
        }
    }
}
