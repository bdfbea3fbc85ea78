/*!
 * Policy Module
 * Tiered permission evaluation, its context and configured defaults
 */

mod context;
mod defaults;
mod engine;

pub use context::EvaluationContext;
pub use defaults::PermissionDefaults;
pub use engine::{
    AreaBypassPolicy, AreaDefaultPolicy, FallbackPolicy, GlobalDefaultPolicy, GroupOverridePolicy,
    OperatorBypassPolicy, Policy, PolicyDecision, PolicyEngine,
};
