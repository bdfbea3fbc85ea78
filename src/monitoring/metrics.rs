/*!
 * Guard Metrics
 * Lock-free counters for the decision path
 */

use crate::permissions::types::Decision;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Decision path counters
///
/// # Performance
/// - Relaxed atomics only; counters are independent and read as a snapshot
#[derive(Debug, Default)]
pub struct GuardMetrics {
    decisions: AtomicU64,
    allowed: AtomicU64,
    denied: AtomicU64,
    outside_areas: AtomicU64,
    bypassed: AtomicU64,
    group_service_failures: AtomicU64,
    slow_decisions: AtomicU64,
    timed_decisions: AtomicU64,
    total_latency_ns: AtomicU64,
    max_latency_ns: AtomicU64,
}

impl GuardMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_decision(&self, decision: &Decision) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        if decision.is_allowed() {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.denied.fetch_add(1, Ordering::Relaxed);
        }
        if decision.area.is_none() {
            self.outside_areas.fetch_add(1, Ordering::Relaxed);
        }
        if decision.tier.is_actor_specific() {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_group_service_failure(&self) {
        self.group_service_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_slow(&self) {
        self.slow_decisions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_latency(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.timed_decisions.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        self.max_latency_ns.fetch_max(nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let timed = self.timed_decisions.load(Ordering::Relaxed);
        let total = self.total_latency_ns.load(Ordering::Relaxed);
        MetricsSnapshot {
            decisions: self.decisions.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            outside_areas: self.outside_areas.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            group_service_failures: self.group_service_failures.load(Ordering::Relaxed),
            slow_decisions: self.slow_decisions.load(Ordering::Relaxed),
            timed_decisions: timed,
            mean_latency_ns: if timed > 0 { total / timed } else { 0 },
            max_latency_ns: self.max_latency_ns.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub decisions: u64,
    pub allowed: u64,
    pub denied: u64,
    pub outside_areas: u64,
    pub bypassed: u64,
    pub group_service_failures: u64,
    pub slow_decisions: u64,
    pub timed_decisions: u64,
    pub mean_latency_ns: u64,
    pub max_latency_ns: u64,
}
