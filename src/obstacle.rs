//! Circular obstacles and the stable handles used to reference them.
//!
//! An `Obstacle` is an immutable value record, mirroring the ancestor
//! C++ `Object`/`Coord` pair: a center cell plus a radius. Because two
//! obstacles can legitimately share a center and radius (the design
//! notes call this out explicitly), identity is never structural --
//! every successful `ClearanceMap::insert` mints a fresh `ObstacleHandle`
//! that heap entries carry instead of owning the obstacle itself.

use crate::geometry::Cell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity for an obstacle inserted into a `ClearanceMap`.
///
/// Carries no structural meaning beyond "the same insertion or not" --
/// do not attempt to derive the obstacle's position from the handle.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ObstacleHandle(Uuid);

impl ObstacleHandle {
    fn new() -> Self {
        ObstacleHandle(Uuid::new_v4())
    }
}

/// An immutable circular obstacle: a center cell and a real radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Cell,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(center: Cell, radius: f64) -> Self {
        Obstacle { center, radius }
    }

    /// Distance from `cell` to this obstacle's boundary: the Euclidean
    /// distance to the center minus the radius, clamped at zero.
    #[inline]
    pub fn distance_to(&self, cell: Cell) -> f64 {
        (cell.euclid(self.center) - self.radius).max(0.0)
    }

    /// True iff this obstacle's center lies within a `rows x cols` grid.
    #[inline]
    pub fn center_in_bounds(&self, rows: usize, cols: usize) -> bool {
        self.center.in_bounds(rows, cols)
    }
}

/// Mint a new handle for a freshly-admitted obstacle. Kept as a free
/// function (rather than `pub` on the constructor) so only the map
/// module that owns the obstacle table can create live handles.
pub(crate) fn mint_handle() -> ObstacleHandle {
    ObstacleHandle::new()
}
