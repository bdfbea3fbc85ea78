/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::inline_string::InlineString;
use super::types::{AreaId, Axis};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Area rejected at upsert; the store is left unchanged
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Area name must not be empty")]
    #[diagnostic(code(area::empty_name), help("Give the area a unique, non-blank name."))]
    EmptyName,

    #[error("Area '{area}' has no world")]
    #[diagnostic(code(area::empty_world), help("Every area belongs to exactly one world."))]
    EmptyWorld { area: AreaId },

    #[error("Area '{area}' has degenerate bounds on the {axis} axis: min {min} > max {max}")]
    #[diagnostic(
        code(area::degenerate_bounds),
        help("Each axis needs min <= max. Use Bounds::spanning to normalize two corners.")
    )]
    DegenerateBounds {
        area: AreaId,
        axis: Axis,
        min: i32,
        max: i32,
    },

    #[error("Area '{area}' priority {priority} exceeds the ceiling {ceiling}")]
    #[diagnostic(
        code(area::priority_out_of_range),
        help("Lower the priority or raise priority_ceiling in the configuration.")
    )]
    PriorityAboveCeiling {
        area: AreaId,
        priority: u32,
        ceiling: u32,
    },
}

/// Durable audit store failure
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    #[diagnostic(
        code(storage::io),
        help("Check that the audit directory exists, is writable and has free space.")
    )]
    Io(InlineString),

    #[error("Record encoding failed: {0}")]
    #[diagnostic(code(storage::encoding), help("A stored row is corrupt or was written by an incompatible version."))]
    Encoding(InlineString),

    #[error("Audit writer is not running")]
    #[diagnostic(code(storage::writer_stopped), help("The audit log was closed; reopen it to record again."))]
    WriterStopped,
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string().into())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Encoding(err.to_string().into())
    }
}

/// External group/track identity service failure
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum GroupServiceError {
    #[error("Group service unavailable: {0}")]
    #[diagnostic(
        code(groups::unavailable),
        help("Actors are evaluated as groupless until the identity service recovers.")
    )]
    Unavailable(InlineString),
}

/// Unified guard error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum GuardError {
    #[error("Validation error: {0}")]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("Area '{0}' not found")]
    #[diagnostic(
        code(guard::not_found),
        help("The area may have been deleted or never existed. Check the name.")
    )]
    NotFound(AreaId),

    #[error("Storage error: {0}")]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),

    #[error("Group service error: {0}")]
    #[diagnostic(transparent)]
    GroupService(#[from] GroupServiceError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(guard::configuration_error),
        help("Invalid configuration. Review configuration parameters.")
    )]
    Configuration(InlineString),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(guard::io_error),
        help("Filesystem operation failed. Check file permissions and disk space.")
    )]
    Io(InlineString),
}

impl From<std::io::Error> for GuardError {
    fn from(err: std::io::Error) -> Self {
        GuardError::Io(err.to_string().into())
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        GuardError::Configuration(err.to_string().into())
    }
}

impl GuardError {
    /// Error is a missing-area lookup rather than a real failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, GuardError::NotFound(_))
    }
}
