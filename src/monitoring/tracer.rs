/*!
 * Structured Tracing
 * Subscriber setup and per-decision spans using the tracing crate
 */

use super::metrics::GuardMetrics;
use crate::core::limits::SLOW_DECISION_THRESHOLD;
use crate::permissions::types::{Decision, PermissionKind};
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Set to `1` or `true` for JSON log lines
pub const ENV_TRACE_JSON: &str = "AREA_GUARD_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - AREA_GUARD_TRACE_JSON: Enable JSON output (default: false)
///
/// A second call is a no-op.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one decision; times it and flags slow ones on drop
pub struct DecisionSpan<'a> {
    span: Span,
    start: Instant,
    metrics: &'a GuardMetrics,
    kind: PermissionKind,
}

impl<'a> DecisionSpan<'a> {
    pub fn new(metrics: &'a GuardMetrics, world: &str, actor: &str, kind: PermissionKind) -> Self {
        let span = span!(
            Level::DEBUG,
            "decision",
            world = world,
            actor = actor,
            kind = %kind,
            verdict = tracing::field::Empty,
            tier = tracing::field::Empty,
            cached = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            metrics,
            kind,
        }
    }

    /// Record the outcome on the span
    pub fn record_decision(&self, decision: &Decision, cached: bool) {
        self.span.record("verdict", tracing::field::debug(decision.verdict));
        self.span.record("tier", tracing::field::debug(decision.tier));
        self.span.record("cached", cached);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for DecisionSpan<'_> {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.metrics.record_latency(duration);
        let _entered = self.span.enter();

        if duration > SLOW_DECISION_THRESHOLD {
            self.metrics.record_slow();
            warn!(
                kind = %self.kind,
                duration_us = duration.as_micros() as u64,
                slow = true,
                "slow decision detected"
            );
        } else {
            debug!(duration_us = duration.as_micros() as u64, "decision completed");
        }
    }
}
