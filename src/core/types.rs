/*!
 * Core Types
 * Common types used across the guard
 */

use super::inline_string::InlineString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// World identifier
pub type WorldId = InlineString;

/// Area identity (unique name)
pub type AreaId = InlineString;

/// Actor identity as supplied by the host
pub type ActorId = InlineString;

/// Permission group / track name
pub type GroupName = InlineString;

/// Common result type for guard operations
pub type GuardResult<T> = Result<T, super::errors::GuardError>;

/// Integer block position in a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a floating-point entity position
    ///
    /// Coordinates outside the `i32` range saturate.
    #[inline]
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Coordinate axis, used in validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}
