/*!
 * Permissions Module
 * Tiered permission decisions, their cache and the composed entry point
 *
 * ## Usage
 * ```ignore
 * use area_guard::permissions::{DecisionChecker, DecisionRequest, ProtectionManager};
 *
 * let manager = ProtectionManager::new(&config, groups);
 *
 * let request = DecisionRequest::block_break("world", (5, 50, 5), "steve");
 * let decision = manager.check_and_audit(&request);
 * if decision.is_denied() && manager.should_notify("steve", "spawn") {
 *     host.send_message("steve", &decision.reason());
 * }
 * ```
 */

pub mod cache;
pub mod manager;
pub mod policy;
pub mod types;

// Re-export commonly used items
pub use cache::{CacheKey, CacheStats, DecisionCache};
pub use manager::ProtectionManager;
pub use policy::{EvaluationContext, PermissionDefaults, Policy, PolicyDecision, PolicyEngine};
pub use types::{
    Decision, DecisionChecker, DecisionRequest, PermissionKind, RuleTier, TriState, Verdict,
};
