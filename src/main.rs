/*!
 * Area Guard - Main Entry Point
 *
 * Standalone service host:
 * - Restores the area snapshot
 * - Opens the audit log
 * - Runs cache and retention maintenance
 * - Saves areas and writes a final audit backup on Ctrl+C
 */

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use area_guard::{
    init_tracing, AuditLog, GuardConfig, MaintenanceIntervals, MaintenanceTask, ProtectionManager,
    StaticGroupService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing
    init_tracing();

    info!("Area guard starting...");

    let config = GuardConfig::from_env().context("loading configuration")?;
    info!(
        cache_ttl_minutes = config.cache_ttl_minutes,
        priority_ceiling = config.priority_ceiling,
        retention_days = config.retention_days,
        audit_dir = %config.audit_dir.display(),
        backup_dir = %config.backup_dir.display(),
        "Configuration loaded"
    );

    let audit = Arc::new(AuditLog::from_config(&config).context("opening audit log")?);
    let groups = Arc::new(StaticGroupService::new());
    let manager = ProtectionManager::new(&config, groups).with_audit(Arc::clone(&audit));

    if let Some(path) = &config.areas_file {
        if path.exists() {
            let count = manager
                .store()
                .load_snapshot(path)
                .with_context(|| format!("restoring areas from {}", path.display()))?;
            info!(areas = count, "Areas restored");
        } else {
            info!(path = %path.display(), "No area snapshot yet");
        }
    }

    let maintenance = MaintenanceTask::spawn(
        Arc::clone(manager.cache()),
        Some(Arc::clone(&audit)),
        MaintenanceIntervals::default(),
    );

    info!("Area guard ready, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
    info!("Shutdown requested");

    maintenance.shutdown().await;

    if let Some(path) = &config.areas_file {
        if let Err(e) = manager.store().save_snapshot(path) {
            warn!(error = %e, "Failed to save area snapshot");
        }
    }

    let stats = manager.metrics();
    info!(
        decisions = stats.decisions,
        denied = stats.denied,
        slow = stats.slow_decisions,
        "Final decision statistics"
    );

    match audit.close().context("closing audit log")? {
        Some(backup) => info!(path = %backup.display(), "Audit backup written"),
        None => warn!("Audit log was already closed"),
    }

    info!("Area guard stopped");
    Ok(())
}
