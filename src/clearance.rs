//! The clearance field: a grid of per-cell clearance values maintained
//! incrementally as obstacles are inserted and removed.
//!
//! Each cell carries a min-priority queue of `(distance, obstacle handle)`
//! entries, one per obstacle whose bounded flood reached that cell. Reads
//! combine the edge clearance (a property of the grid alone) with the
//! smallest live entry at that cell; removal invalidates entries lazily
//! rather than compacting the whole grid, mirroring the ancestor crate's
//! `flood_fill_distance`/`distance_transform` pair but keyed per-obstacle
//! instead of recomputed from scratch.

use crate::error::{NavError, Result};
use crate::geometry::{edge_clearance, Cell};
use crate::obstacle::{mint_handle, Obstacle, ObstacleHandle};
use fnv::FnvHashMap;
use log::{debug, trace, warn};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// A single entry in a per-cell heap: the distance an obstacle's
/// boundary is from this cell, and the obstacle's handle.
///
/// `Ord` is reversed relative to `dist` so that `BinaryHeap` (a max-heap)
/// surfaces the smallest distance at the top.
#[derive(Clone, Copy, Debug)]
struct HeapEntry {
    dist: f64,
    handle: ObstacleHandle,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.dist.partial_cmp(&self.dist).unwrap_or(Ordering::Equal)
    }
}

/// Grid of per-cell clearance values with incremental obstacle maintenance.
pub struct ClearanceMap {
    rows: usize,
    cols: usize,
    obstacles: FnvHashMap<ObstacleHandle, Obstacle>,
    heap: Vec<BinaryHeap<HeapEntry>>,
}

impl ClearanceMap {
    /// Create a map of the given size. Fails if either dimension is < 1.
    pub fn new(rows: i64, cols: i64) -> Result<Self> {
        if rows < 1 || cols < 1 {
            return Err(NavError::InvalidDimension { rows, cols });
        }
        let rows = rows as usize;
        let cols = cols as usize;
        Ok(ClearanceMap {
            rows,
            cols,
            obstacles: FnvHashMap::default(),
            heap: (0..rows * cols).map(|_| BinaryHeap::new()).collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Insert an obstacle. Returns `None` (rejecting, without touching
    /// any state) if its center is out of bounds or its radius is not
    /// positive; otherwise returns the handle by which it can later be
    /// removed.
    pub fn insert(&mut self, obstacle: Obstacle) -> Option<ObstacleHandle> {
        if obstacle.radius <= 0.0 {
            warn!(
                "rejecting obstacle at ({}, {}): radius {} is not positive",
                obstacle.center.row, obstacle.center.col, obstacle.radius
            );
            return None;
        }
        if !obstacle.center_in_bounds(self.rows, self.cols) {
            warn!(
                "rejecting obstacle at ({}, {}): out of bounds for a {}x{} map",
                obstacle.center.row, obstacle.center.col, self.rows, self.cols
            );
            return None;
        }

        let handle = mint_handle();
        let touched = self.bounded_flood(obstacle.center, obstacle.radius);
        for &(cell, dist) in &touched {
            self.heap[cell.index(self.cols)].push(HeapEntry { dist, handle });
        }
        debug!(
            "inserted obstacle at ({}, {}) r={}: touched {} cells",
            obstacle.center.row,
            obstacle.center.col,
            obstacle.radius,
            touched.len()
        );
        self.obstacles.insert(handle, obstacle);
        Some(handle)
    }

    /// Remove a previously-inserted obstacle by handle. Returns `false`
    /// if the handle is not (or no longer) present.
    pub fn remove(&mut self, handle: ObstacleHandle) -> bool {
        let Some(obstacle) = self.obstacles.remove(&handle) else {
            return false;
        };

        let touched = self.bounded_flood(obstacle.center, obstacle.radius);
        for &(cell, _) in &touched {
            let idx = cell.index(self.cols);
            while let Some(top) = self.heap[idx].peek() {
                if self.obstacles.contains_key(&top.handle) {
                    break;
                }
                self.heap[idx].pop();
            }
        }
        debug!(
            "removed obstacle at ({}, {}) r={}: touched {} cells",
            obstacle.center.row,
            obstacle.center.col,
            obstacle.radius,
            touched.len()
        );
        true
    }

    /// As `insert`, but surfaces the rejection reason as `NavError`
    /// rather than folding both causes into `None`.
    pub fn insert_checked(&mut self, obstacle: Obstacle) -> Result<ObstacleHandle> {
        if obstacle.radius <= 0.0 {
            return Err(NavError::NonPositiveRadius {
                radius: obstacle.radius,
            });
        }
        if !obstacle.center_in_bounds(self.rows, self.cols) {
            return Err(NavError::OutOfBounds {
                cell: obstacle.center,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.insert(obstacle).expect("validated above"))
    }

    /// As `remove`, but surfaces an absent handle as `NavError` rather
    /// than `false`, for callers that want to propagate it with `?`.
    pub fn remove_checked(&mut self, handle: ObstacleHandle) -> Result<()> {
        if self.remove(handle) {
            Ok(())
        } else {
            Err(NavError::AbsentObstacle { handle })
        }
    }

    /// Empty the obstacle set and every per-cell heap.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        for h in self.heap.iter_mut() {
            h.clear();
        }
        debug!("cleared clearance map");
    }

    /// The clearance at a cell: the minimum of the edge clearance and
    /// the nearest live obstacle, or -1 for an out-of-bounds cell.
    ///
    /// Peeking without popping is sound here: `remove` performs the same
    /// bounded flood as `insert` and pops any stale top at every cell it
    /// touches before returning, so by the time any caller can observe
    /// this map, every heap's top entry (if any) is already live.
    pub fn val_at(&self, cell: Cell) -> f64 {
        if !cell.in_bounds(self.rows, self.cols) {
            return -1.0;
        }
        let ec = edge_clearance(cell, self.rows, self.cols);
        match self.heap[cell.index(self.cols)].peek() {
            Some(top) => ec.min(top.dist),
            None => ec,
        }
    }

    /// Currently-present obstacles, as (handle, obstacle) pairs.
    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleHandle, Obstacle)> + '_ {
        self.obstacles.iter().map(|(&h, &o)| (h, o))
    }

    /// Bounded BFS flood from `center` in the 8-neighborhood, admitting a
    /// cell (and continuing past it) only while its distance to the
    /// obstacle does not exceed its edge clearance. Returns every
    /// admitted cell with its distance.
    fn bounded_flood(&self, center: Cell, radius: f64) -> Vec<(Cell, f64)> {
        let mut visited = vec![false; self.rows * self.cols];
        let mut queue = VecDeque::new();
        let mut admitted = Vec::new();

        visited[center.index(self.cols)] = true;
        queue.push_back(center);

        while let Some(c) = queue.pop_front() {
            let dist = (c.euclid(center) - radius).max(0.0);
            let ec = edge_clearance(c, self.rows, self.cols);
            if dist > ec {
                continue;
            }
            trace!(
                "flood visiting ({}, {}): dist={}, edge_clearance={}",
                c.row,
                c.col,
                dist,
                ec
            );
            admitted.push((c, dist));
            for n in c.neighbors_8(self.rows, self.cols) {
                let idx = n.index(self.cols);
                if !visited[idx] {
                    visited[idx] = true;
                    queue.push_back(n);
                }
            }
        }

        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn all_vals(map: &ClearanceMap) -> Vec<f64> {
        let mut out = Vec::with_capacity(map.rows() * map.cols());
        for r in 0..map.rows() as i32 {
            for c in 0..map.cols() as i32 {
                out.push(map.val_at(Cell::new(r, c)));
            }
        }
        out
    }

    #[test]
    fn rejects_invalid_dimensions() {
        assert!(matches!(
            ClearanceMap::new(0, 5),
            Err(NavError::InvalidDimension { .. })
        ));
        assert!(matches!(
            ClearanceMap::new(5, -1),
            Err(NavError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn empty_map_matches_edge_clearance_everywhere() {
        let map = ClearanceMap::new(10, 10).unwrap();
        for r in 0..10i32 {
            for c in 0..10i32 {
                let cell = Cell::new(r, c);
                assert_eq!(map.val_at(cell), edge_clearance(cell, 10, 10));
            }
        }
    }

    #[test]
    fn out_of_bounds_query_returns_sentinel() {
        let map = ClearanceMap::new(5, 5).unwrap();
        assert_eq!(map.val_at(Cell::new(-1, 0)), -1.0);
        assert_eq!(map.val_at(Cell::new(0, 5)), -1.0);
    }

    #[test]
    fn one_by_one_obstacle_at_origin_has_zero_clearance() {
        let mut map = ClearanceMap::new(1, 1).unwrap();
        assert_eq!(map.val_at(Cell::new(0, 0)), 0.0);
        map.insert(Obstacle::new(Cell::new(0, 0), 0.5)).unwrap();
        assert_eq!(map.val_at(Cell::new(0, 0)), 0.0);
    }

    #[test]
    fn rejects_out_of_bounds_and_non_positive_radius() {
        let mut map = ClearanceMap::new(5, 5).unwrap();
        assert!(map.insert(Obstacle::new(Cell::new(10, 10), 1.0)).is_none());
        assert!(map.insert(Obstacle::new(Cell::new(2, 2), 0.0)).is_none());
        assert!(map.insert(Obstacle::new(Cell::new(2, 2), -1.0)).is_none());
        assert_eq!(map.obstacles().count(), 0);
    }

    #[test]
    fn insert_lowers_clearance_within_influence_disk() {
        // S2-style scenario: obstacle (10,10,3.0) on a 20x20 map.
        let mut map = ClearanceMap::new(20, 20).unwrap();
        map.insert(Obstacle::new(Cell::new(10, 10), 3.0)).unwrap();

        assert_eq!(map.val_at(Cell::new(10, 10)), 0.0);
        assert_eq!(map.val_at(Cell::new(10, 13)), 0.0);
        assert_relative_eq!(map.val_at(Cell::new(10, 14)), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn remove_restores_previous_values() {
        let mut map = ClearanceMap::new(15, 15).unwrap();
        let before = all_vals(&map);

        let handle = map.insert(Obstacle::new(Cell::new(5, 5), 2.0)).unwrap();
        let during = all_vals(&map);
        assert_ne!(before, during, "insert should have changed something");

        assert!(map.remove(handle));
        let after = all_vals(&map);
        assert_eq!(before, after);
    }

    #[test]
    fn remove_of_absent_handle_is_a_no_op() {
        let mut map = ClearanceMap::new(5, 5).unwrap();
        let handle = map.insert(Obstacle::new(Cell::new(2, 2), 1.0)).unwrap();
        assert!(map.remove(handle));
        assert!(!map.remove(handle));
    }

    #[test]
    fn clear_restores_edge_clearance_everywhere() {
        let mut map = ClearanceMap::new(10, 10).unwrap();
        map.insert(Obstacle::new(Cell::new(3, 3), 2.0)).unwrap();
        map.insert(Obstacle::new(Cell::new(7, 7), 1.5)).unwrap();
        map.clear();
        for r in 0..10i32 {
            for c in 0..10i32 {
                let cell = Cell::new(r, c);
                assert_eq!(map.val_at(cell), edge_clearance(cell, 10, 10));
            }
        }
        assert_eq!(map.obstacles().count(), 0);
    }

    #[test]
    fn insert_checked_surfaces_rejection_reasons() {
        let mut map = ClearanceMap::new(5, 5).unwrap();
        assert!(matches!(
            map.insert_checked(Obstacle::new(Cell::new(2, 2), 0.0)),
            Err(NavError::NonPositiveRadius { .. })
        ));
        assert!(matches!(
            map.insert_checked(Obstacle::new(Cell::new(9, 9), 1.0)),
            Err(NavError::OutOfBounds { .. })
        ));
        assert!(map.insert_checked(Obstacle::new(Cell::new(2, 2), 1.0)).is_ok());
    }

    #[test]
    fn remove_checked_surfaces_absent_obstacle() {
        let mut map = ClearanceMap::new(5, 5).unwrap();
        let handle = map.insert(Obstacle::new(Cell::new(1, 1), 1.0)).unwrap();
        assert!(map.remove_checked(handle).is_ok());
        assert!(matches!(
            map.remove_checked(handle),
            Err(NavError::AbsentObstacle { .. })
        ));
    }

    #[test]
    fn overlapping_obstacles_at_same_center_both_contribute() {
        let mut map = ClearanceMap::new(10, 10).unwrap();
        let h1 = map.insert(Obstacle::new(Cell::new(5, 5), 1.0)).unwrap();
        let h2 = map.insert(Obstacle::new(Cell::new(5, 5), 1.0)).unwrap();
        assert_ne!(h1, h2);
        assert_eq!(map.obstacles().count(), 2);
        assert_eq!(map.val_at(Cell::new(5, 5)), 0.0);
        // Removing one leaves the other's contribution in place.
        map.remove(h1);
        assert_eq!(map.val_at(Cell::new(5, 5)), 0.0);
        map.remove(h2);
        assert_eq!(
            map.val_at(Cell::new(5, 5)),
            edge_clearance(Cell::new(5, 5), 10, 10)
        );
    }

    #[test]
    fn insert_is_monotone_non_increasing() {
        let mut map = ClearanceMap::new(12, 12).unwrap();
        let before = all_vals(&map);
        map.insert(Obstacle::new(Cell::new(6, 6), 2.5)).unwrap();
        let after = all_vals(&map);
        for (b, a) in before.iter().zip(after.iter()) {
            assert!(a <= b);
        }
    }
}
