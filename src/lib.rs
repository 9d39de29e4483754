//! Clearance-field maintenance and clearance-biased path search over a
//! 2D grid map of circular obstacles.
//!
//! The two load-bearing pieces are [`clearance::ClearanceMap`] (an
//! incrementally-maintained per-cell clearance field) and
//! [`planner::Planner`] (a best-first search over that field). Map file
//! I/O and a trait-only raster boundary round out the public surface;
//! logging is emitted via the `log` facade throughout, and every
//! fallible operation returns [`error::NavError`].

pub mod clearance;
pub mod error;
pub mod geometry;
pub mod mapfile;
pub mod obstacle;
pub mod planner;
pub mod raster;

pub use clearance::ClearanceMap;
pub use error::{NavError, Result};
pub use geometry::{edge_clearance, Cell};
pub use obstacle::{Obstacle, ObstacleHandle};
pub use planner::{PlanOutcome, Planner, PlannerState, SearchStats};
pub use raster::{FrameSink, PixelBuffer, Rgb};
