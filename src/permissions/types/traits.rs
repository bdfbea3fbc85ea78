/*!
 * Permission Traits
 * Interfaces for permission checking
 */

use super::core::{Decision, DecisionRequest};

/// Core decision interface used by the host's event glue
pub trait DecisionChecker: Send + Sync {
    /// Decide whether the requested action is permitted
    fn check(&self, request: &DecisionRequest) -> Decision;

    /// Decide and submit an interaction or violation record
    fn check_and_audit(&self, request: &DecisionRequest) -> Decision;

    /// Batch check multiple requests
    fn check_batch(&self, requests: &[DecisionRequest]) -> Vec<Decision> {
        requests.iter().map(|req| self.check(req)).collect()
    }
}
