/*!
 * Permission Types Module
 * Core types and traits for the decision path
 */

mod core;
mod traits;

pub use self::core::{Decision, DecisionRequest, PermissionKind, RuleTier, TriState, Verdict};
pub use traits::DecisionChecker;
