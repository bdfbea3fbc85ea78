/*!
 * Permission Defaults
 * Global defaults and the last-resort fallback policy
 */

use crate::permissions::types::{PermissionKind, TriState, Verdict};
use ahash::HashMap;
use serde::{Deserialize, Serialize};

/// Configuration-supplied defaults consulted after every area tier inherits
///
/// `global` is consulted first; an entry of `Inherit` (or no entry) defers to
/// `fallback`. The built-in fallback denies destructive kinds and allows
/// informational ones. A kind missing from a user-supplied `fallback` map
/// follows the same rule, so the result is always defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionDefaults {
    pub global: HashMap<PermissionKind, TriState>,
    pub fallback: HashMap<PermissionKind, Verdict>,
}

impl PermissionDefaults {
    /// Global default for a kind
    pub fn global(&self, kind: PermissionKind) -> TriState {
        self.global.get(&kind).copied().unwrap_or_default()
    }

    /// Fallback verdict for a kind
    pub fn fallback(&self, kind: PermissionKind) -> Verdict {
        self.fallback
            .get(&kind)
            .copied()
            .unwrap_or_else(|| Self::built_in_fallback(kind))
    }

    /// Deny destructive kinds, allow informational ones
    pub const fn built_in_fallback(kind: PermissionKind) -> Verdict {
        if kind.is_destructive() {
            Verdict::Deny
        } else {
            Verdict::Allow
        }
    }

    pub fn with_global(mut self, kind: PermissionKind, state: TriState) -> Self {
        self.global.insert(kind, state);
        self
    }

    pub fn with_fallback(mut self, kind: PermissionKind, verdict: Verdict) -> Self {
        self.fallback.insert(kind, verdict);
        self
    }
}

impl Default for PermissionDefaults {
    fn default() -> Self {
        let fallback = PermissionKind::ALL
            .iter()
            .map(|&kind| (kind, Self::built_in_fallback(kind)))
            .collect();
        Self {
            global: HashMap::default(),
            fallback,
        }
    }
}
