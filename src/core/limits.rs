/*!
 * Limits and Defaults
 *
 * Centralized location for tunable defaults, thresholds, and magic numbers.
 * Organized by subsystem.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Security-critical constants are marked with [SECURITY]
 */

use std::time::Duration;

// =============================================================================
// REGION STORE
// =============================================================================

/// Default highest allowed area priority
pub const DEFAULT_PRIORITY_CEILING: u32 = 1_000;

/// Default grid cell edge length in blocks (one chunk column)
/// [PERF] Areas are bucketed by (x, z) column cell for point queries
pub const DEFAULT_GRID_CELL_SIZE: i32 = 16;

/// Areas covering more grid cells than this go to the per-world oversized list
/// [PERF] Bounds memory for world-sized areas; oversized areas are scanned linearly
pub const MAX_GRID_CELLS_PER_AREA: u64 = 4_096;

// =============================================================================
// DECISION CACHE
// =============================================================================

/// Default decision time-to-live in minutes
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 5;

/// Longest accepted decision time-to-live in minutes (one year)
pub const MAX_CACHE_TTL_MINUTES: u64 = 365 * 24 * 60;

/// Default maximum cached decisions
/// [PERF] Roughly one entry per (block, group chain, action) touched recently
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// Interval between expired-entry sweeps
pub const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// =============================================================================
// DECISION PATH
// =============================================================================

/// Decisions slower than this are logged as slow
/// [PERF] The decision path runs synchronously inside world updates
pub const SLOW_DECISION_THRESHOLD: Duration = Duration::from_millis(2);

/// Default cooldown between deny notifications for one actor in one area
pub const DEFAULT_MESSAGE_COOLDOWN_SECS: u64 = 3;

/// Maximum tracked (actor, area) cooldown pairs
/// [SECURITY] Bounds memory under many distinct actors
pub const MAX_COOLDOWN_ENTRIES: usize = 10_000;

// =============================================================================
// AUDIT LOG
// =============================================================================

/// Default audit retention window in days
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// Longest accepted audit retention window in days (one century)
pub const MAX_RETENTION_DAYS: u64 = 36_500;

/// Interval between retention cleanups
pub const AUDIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Write attempts per audit record (first try plus one retry)
pub const AUDIT_WRITE_ATTEMPTS: u32 = 2;

/// Default audit table directory
pub const DEFAULT_AUDIT_DIR: &str = "area-guard/audit";

/// Default backup directory
pub const DEFAULT_BACKUP_DIR: &str = "area-guard/backups";

/// Seconds in one day
pub const SECS_PER_DAY: u64 = 24 * 60 * 60;
