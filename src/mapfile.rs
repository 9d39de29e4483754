//! Line-oriented text format for an obstacle list.
//!
//! Built directly on `std::io` rather than a serde-based format, since
//! the on-disk shape is a trivial hand-editable layout (one header line,
//! one obstacle per subsequent line) rather than a structured encoding:
//!
//! ```text
//! <rows> <cols>
//! <row> <col> <radius>
//! <row> <col> <radius>
//! ...
//! ```
//!
//! Malformed or rejected lines are skipped, not treated as a hard
//! failure -- the loader's job is best-effort recovery of a possibly
//! hand-edited file, mirroring the ancestor C++ `Map::load`.

use crate::clearance::ClearanceMap;
use crate::error::{NavError, Result};
use crate::geometry::Cell;
use crate::obstacle::Obstacle;
use log::warn;
use std::io::{self, BufRead, Write};

/// Write `map`'s dimensions and obstacle list to `writer`.
pub fn save<W: Write>(map: &ClearanceMap, mut writer: W) -> io::Result<()> {
    writeln!(writer, "{} {}", map.rows(), map.cols())?;
    for (_, obstacle) in map.obstacles() {
        writeln!(
            writer,
            "{} {} {}",
            obstacle.center.row, obstacle.center.col, obstacle.radius
        )?;
    }
    Ok(())
}

/// Read a map from `reader`. The header line is load-bearing: if it is
/// missing or does not parse to two integers, construction fails with
/// `InvalidDimension`. Every subsequent line is best-effort: a line
/// that does not parse, or whose obstacle `insert` is rejected, is
/// skipped and logged rather than aborting the load.
pub fn load<R: BufRead>(reader: R) -> Result<ClearanceMap> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .and_then(|l| l.ok())
        .unwrap_or_default();
    let mut header_fields = header.split_whitespace();
    let rows: i64 = header_fields
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let cols: i64 = header_fields
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let mut map = ClearanceMap::new(rows, cols).map_err(|_| NavError::InvalidDimension {
        rows,
        cols,
    })?;

    for line in lines {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("skipping unreadable map file line: {}", e);
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let parsed = fields
            .next()
            .and_then(|s| s.parse::<i32>().ok())
            .zip(fields.next().and_then(|s| s.parse::<i32>().ok()))
            .zip(fields.next().and_then(|s| s.parse::<f64>().ok()));

        let Some(((row, col), radius)) = parsed else {
            warn!("skipping malformed map file line: {:?}", trimmed);
            continue;
        };

        let obstacle = Obstacle::new(Cell::new(row, col), radius);
        if map.insert(obstacle).is_none() {
            warn!(
                "skipping rejected obstacle ({}, {}, {}) while loading map file",
                row, col, radius
            );
        }
    }

    Ok(map)
}
