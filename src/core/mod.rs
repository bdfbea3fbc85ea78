/*!
 * Core Module
 * Shared types, errors, configuration, limits and synchronization helpers
 */

pub mod config;
pub mod errors;
pub mod inline_string;
pub mod limits;
pub mod rcu;
pub mod types;

pub use config::GuardConfig;
pub use errors::{GroupServiceError, GuardError, StorageError, ValidationError};
pub use inline_string::InlineString;
pub use rcu::RcuCell;
pub use types::{ActorId, AreaId, Axis, BlockPos, GroupName, GuardResult, WorldId};
