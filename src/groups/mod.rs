/*!
 * Group Service
 * Seam to the external group/track identity service
 *
 * The service returns an actor's group chain, most specific group first
 * (the actor's own group, then the groups it inherits along its track).
 */

use crate::core::errors::GroupServiceError;
use crate::core::types::{ActorId, GroupName};
use ahash::RandomState;
use dashmap::DashMap;

/// External identity service
#[cfg_attr(test, mockall::automock)]
pub trait GroupService: Send + Sync {
    /// Group chain for an actor, most specific first; empty if groupless
    fn group_chain(&self, actor: &str) -> Result<Vec<GroupName>, GroupServiceError>;
}

/// In-memory group service for embedding hosts and tests
#[derive(Debug, Default)]
pub struct StaticGroupService {
    chains: DashMap<ActorId, Vec<GroupName>, RandomState>,
}

impl StaticGroupService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an actor's chain
    pub fn assign<I, G>(&self, actor: impl Into<ActorId>, chain: I)
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupName>,
    {
        self.chains
            .insert(actor.into(), chain.into_iter().map(Into::into).collect());
    }

    /// Forget an actor; it becomes groupless
    pub fn unassign(&self, actor: &str) {
        self.chains.remove(actor);
    }
}

impl GroupService for StaticGroupService {
    fn group_chain(&self, actor: &str) -> Result<Vec<GroupName>, GroupServiceError> {
        Ok(self
            .chains
            .get(actor)
            .map(|chain| chain.value().clone())
            .unwrap_or_default())
    }
}
