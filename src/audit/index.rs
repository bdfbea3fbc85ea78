/*!
 * Audit Statistics Index
 * Per-area counters and modification history derived from persisted rows
 *
 * Only the audit writer mutates the index, after a row has been durably
 * appended, so statistics never count a row that storage does not hold.
 */

use super::records::{AuditDataset, AuditRecord, ModificationRecord, VIOLATION_STAT_KEY};
use crate::core::types::AreaId;
use crate::permissions::types::PermissionKind;
use ahash::{HashMap, RandomState};
use dashmap::DashMap;
use std::cmp::Reverse;

/// Counters for one area
#[derive(Debug, Clone, Default)]
struct AreaLedger {
    interactions: HashMap<PermissionKind, u64>,
    violations: u64,
    /// Insertion order
    modifications: Vec<ModificationRecord>,
}

/// Per-area statistics
#[derive(Debug, Default)]
pub struct AuditIndex {
    areas: DashMap<AreaId, AreaLedger, RandomState>,
}

impl AuditIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index built from a full dataset
    pub fn from_dataset(dataset: AuditDataset) -> Self {
        let index = Self::new();
        index.rebuild(dataset);
        index
    }

    /// Account for one durably written row
    pub fn apply(&self, record: &AuditRecord) {
        let mut ledger = self.areas.entry(record.area_id().clone()).or_default();
        match record {
            AuditRecord::Interaction(row) => {
                *ledger.interactions.entry(row.action_type).or_insert(0) += 1;
            }
            AuditRecord::Violation(_) => ledger.violations += 1,
            AuditRecord::Modification(row) => ledger.modifications.push(row.clone()),
        }
    }

    /// Replace the index with the contents of `dataset`
    pub fn rebuild(&self, dataset: AuditDataset) {
        self.areas.clear();
        for record in dataset.into_records() {
            self.apply(&record);
        }
    }

    /// Interaction counts by action type plus the violation count
    ///
    /// Keys are action type names (`BLOCK_BREAK`, ...) and `VIOLATION`.
    /// Unknown areas yield an empty map.
    pub fn interaction_stats(&self, area: &str) -> HashMap<String, u64> {
        let Some(ledger) = self.areas.get(area) else {
            return HashMap::default();
        };
        let mut stats: HashMap<String, u64> = ledger
            .interactions
            .iter()
            .map(|(kind, count)| (kind.as_str().to_string(), *count))
            .collect();
        stats.insert(VIOLATION_STAT_KEY.to_string(), ledger.violations);
        stats
    }

    /// Violation count for an area
    pub fn violation_count(&self, area: &str) -> u64 {
        self.areas.get(area).map(|l| l.violations).unwrap_or(0)
    }

    /// Up to `limit` modifications, newest first
    ///
    /// Equal timestamps list the later-written row first.
    pub fn recent_modifications(&self, area: &str, limit: usize) -> Vec<ModificationRecord> {
        let Some(ledger) = self.areas.get(area) else {
            return Vec::new();
        };
        let mut rows: Vec<ModificationRecord> = ledger.modifications.iter().rev().cloned().collect();
        // Stable: reversed insertion order survives among equal timestamps
        rows.sort_by_key(|row| Reverse(row.timestamp));
        rows.truncate(limit);
        rows
    }

    /// Areas with at least one row
    pub fn areas(&self) -> Vec<AreaId> {
        let mut areas: Vec<_> = self.areas.iter().map(|e| e.key().clone()).collect();
        areas.sort();
        areas
    }
}
