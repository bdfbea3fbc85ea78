/*!
 * Monitoring
 * Structured tracing and decision path metrics
 */

mod metrics;
mod tracer;

pub use metrics::{GuardMetrics, MetricsSnapshot};
pub use tracer::{init_tracing, DecisionSpan, ENV_TRACE_JSON};
