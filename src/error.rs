//! Crate-wide error taxonomy.
//!
//! Every fallible constructor and operation in `clearance` and `planner`
//! returns one of these variants. Each carries the offending value so a
//! caller can report it verbatim without re-deriving context.

use crate::geometry::Cell;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NavError {
    #[error("invalid map dimensions: rows={rows}, cols={cols} (both must be >= 1)")]
    InvalidDimension { rows: i64, cols: i64 },

    #[error("cell ({row}, {col}) is out of bounds for a {rows}x{cols} map", row = cell.row, col = cell.col)]
    OutOfBounds {
        cell: Cell,
        rows: usize,
        cols: usize,
    },

    #[error("obstacle radius must be > 0, got {radius}")]
    NonPositiveRadius { radius: f64 },

    #[error("robot radius {robot_radius} does not fit at ({row}, {col}): clearance is {clearance}", row = cell.row, col = cell.col)]
    DoesNotFit {
        cell: Cell,
        robot_radius: f64,
        clearance: f64,
    },

    #[error("lambda must be in [0, 1], got {lambda}")]
    InvalidLambda { lambda: f64 },

    #[error("no obstacle with handle {handle:?} is present on this map")]
    AbsentObstacle { handle: crate::obstacle::ObstacleHandle },
}

pub type Result<T> = std::result::Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_the_offending_value() {
        let cell = Cell::new(3, 4);

        let errs = [
            NavError::InvalidDimension { rows: -1, cols: 5 },
            NavError::OutOfBounds {
                cell,
                rows: 10,
                cols: 10,
            },
            NavError::NonPositiveRadius { radius: -2.0 },
            NavError::DoesNotFit {
                cell,
                robot_radius: 1.5,
                clearance: 0.25,
            },
            NavError::InvalidLambda { lambda: 1.5 },
        ];

        for e in errs {
            let msg = e.to_string();
            assert!(!msg.is_empty());
        }

        assert!(NavError::InvalidDimension { rows: -1, cols: 5 }
            .to_string()
            .contains("-1"));
        assert!(NavError::NonPositiveRadius { radius: -2.0 }
            .to_string()
            .contains("-2"));
        assert!(NavError::InvalidLambda { lambda: 1.5 }
            .to_string()
            .contains("1.5"));
        assert!(NavError::OutOfBounds {
            cell,
            rows: 10,
            cols: 10
        }
        .to_string()
        .contains("3"));
    }

}
