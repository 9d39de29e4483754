//! Clearance-biased best-first path search over a `ClearanceMap`.
//!
//! Mirrors the ancestor crate's `SearchEngine`/`SearchResult`/`SearchStats`
//! shape (an explicit state machine plus a small stats record the caller
//! can inspect after the fact), but drives a single-pass grid search
//! instead of an exhaustive layer-placement tree.

use crate::clearance::ClearanceMap;
use crate::error::{NavError, Result};
use crate::geometry::Cell;
use crate::raster::{FrameSink, PixelBuffer, Rgb};
use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const EPSILON: f64 = 0.01;
const TRACE_FRAME_BUDGET: usize = 100;

/// Explicit lifecycle of a `Planner`, inspectable by the caller after
/// `plan` returns for diagnostics or telemetry purposes.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum PlannerState {
    Idle,
    Validating,
    Searching,
    Done,
    Unreachable,
    Failed,
}

/// Counters exposed after a completed search, without requiring the
/// caller to parse log output.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub cells_expanded: usize,
    pub cells_pruned: usize,
    pub path_len: usize,
}

/// Outcome of a successful `plan` call. `Unreachable` is a normal
/// result here, not an error -- callers that want to branch on it
/// without matching `NavError` can do so directly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanOutcome {
    Reached(Vec<Cell>),
    Unreachable,
}

/// A single best-first search over a `ClearanceMap`, reusable across calls.
pub struct Planner {
    state: PlannerState,
    stats: SearchStats,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    pub fn new() -> Self {
        Planner {
            state: PlannerState::Idle,
            stats: SearchStats::default(),
        }
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Plan a path from `start` to `target` on `map`, requiring every
    /// path cell to have clearance >= `robot_radius`. `lambda` blends
    /// clearance maximization (1.0) against pure goal-seeking (0.0).
    ///
    /// `map` is borrowed immutably for the whole call -- the borrow
    /// checker, not a documented convention, is what prevents a caller
    /// from mutating it through another handle while a search is live.
    ///
    /// `trace_sink` is taken by owned `Box` rather than by reference: the
    /// call acquires it and guarantees `finalize` is invoked exactly once
    /// on every exit path, including a validation failure that never
    /// reaches `search` at all.
    pub fn plan(
        &mut self,
        map: &ClearanceMap,
        start: Cell,
        target: Cell,
        robot_radius: f64,
        lambda: f64,
        trace_sink: Option<Box<dyn FrameSink>>,
    ) -> Result<PlanOutcome> {
        self.state = PlannerState::Validating;
        self.stats = SearchStats::default();

        if let Err(e) = self.validate(map, start, target, robot_radius, lambda) {
            self.state = PlannerState::Failed;
            if let Some(mut sink) = trace_sink {
                sink.finalize();
            }
            return Err(e);
        }

        self.state = PlannerState::Searching;
        let outcome = self.search(map, start, target, robot_radius, lambda, trace_sink);
        self.state = match &outcome {
            PlanOutcome::Reached(_) => PlannerState::Done,
            PlanOutcome::Unreachable => PlannerState::Unreachable,
        };
        Ok(outcome)
    }

    fn validate(
        &self,
        map: &ClearanceMap,
        start: Cell,
        target: Cell,
        robot_radius: f64,
        lambda: f64,
    ) -> Result<()> {
        if !start.in_bounds(map.rows(), map.cols()) {
            return Err(NavError::OutOfBounds {
                cell: start,
                rows: map.rows(),
                cols: map.cols(),
            });
        }
        if !target.in_bounds(map.rows(), map.cols()) {
            return Err(NavError::OutOfBounds {
                cell: target,
                rows: map.rows(),
                cols: map.cols(),
            });
        }
        if !(0.0..=1.0).contains(&lambda) {
            return Err(NavError::InvalidLambda { lambda });
        }
        let clearance = map.val_at(start);
        if clearance < robot_radius {
            return Err(NavError::DoesNotFit {
                cell: start,
                robot_radius,
                clearance,
            });
        }
        Ok(())
    }

    fn search(
        &mut self,
        map: &ClearanceMap,
        start: Cell,
        target: Cell,
        robot_radius: f64,
        lambda: f64,
        trace_sink: Option<Box<dyn FrameSink>>,
    ) -> PlanOutcome {
        let rows = map.rows();
        let cols = map.cols();
        let s_max = (rows.max(cols) as f64) / 2.0;
        let d_max = (rows as f64).hypot(cols as f64);

        let mut visited = vec![false; rows * cols];
        let mut parent: Vec<Option<Cell>> = vec![None; rows * cols];
        let mut frontier = BinaryHeap::new();
        let mut trace: Vec<Cell> = Vec::new();

        visited[start.index(cols)] = true;
        frontier.push(FrontierEntry {
            score: score(map, start, target, lambda, s_max, d_max),
            cell: start,
        });

        let mut found = false;
        while let Some(FrontierEntry { cell, .. }) = frontier.pop() {
            self.stats.cells_expanded += 1;
            trace.push(cell);

            if cell == target {
                found = true;
                break;
            }

            for n in cell.neighbors_8(rows, cols) {
                let idx = n.index(cols);
                if visited[idx] {
                    self.stats.cells_pruned += 1;
                    continue;
                }
                let clearance = map.val_at(n);
                if clearance < robot_radius {
                    trace!(
                        "rejecting candidate ({}, {}): clearance {} < robot radius {}",
                        n.row,
                        n.col,
                        clearance,
                        robot_radius
                    );
                    continue;
                }
                visited[idx] = true;
                parent[idx] = Some(cell);
                frontier.push(FrontierEntry {
                    score: score(map, n, target, lambda, s_max, d_max),
                    cell: n,
                });
            }
        }

        let outcome = if found {
            let path = reconstruct(&parent, cols, start, target);
            self.stats.path_len = path.len();
            PlanOutcome::Reached(path)
        } else {
            PlanOutcome::Unreachable
        };

        debug!(
            "search complete: expanded={}, pruned={}, outcome={}",
            self.stats.cells_expanded,
            self.stats.cells_pruned,
            match &outcome {
                PlanOutcome::Reached(p) => format!("reached (len {})", p.len()),
                PlanOutcome::Unreachable => "unreachable".to_string(),
            }
        );

        if let Some(mut sink) = trace_sink {
            let path = match &outcome {
                PlanOutcome::Reached(p) => Some(p.as_slice()),
                PlanOutcome::Unreachable => None,
            };
            emit_trace(sink.as_mut(), rows, cols, &trace, path);
        }

        outcome
    }
}

/// An entry on the search frontier, ordered naturally by `score` --
/// unlike the clearance heap's entries, this one wants a true max-heap,
/// so `Ord` is not reversed.
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    score: f64,
    cell: Cell,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.partial_cmp(&other.score).unwrap_or(Ordering::Equal)
    }
}

fn score(map: &ClearanceMap, cell: Cell, target: Cell, lambda: f64, s_max: f64, d_max: f64) -> f64 {
    let s = map.val_at(cell) / s_max;
    let h = cell.euclid(target) / d_max;
    lambda * s - (1.0 - lambda) * (h + EPSILON).ln()
}

fn reconstruct(parent: &[Option<Cell>], cols: usize, start: Cell, target: Cell) -> Vec<Cell> {
    let mut path = vec![target];
    let mut cur = target;
    while cur != start {
        match parent[cur.index(cols)] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Emit the search trace to `sink`, downsampled so roughly
/// `TRACE_FRAME_BUDGET` frames are produced regardless of search
/// length, with a final frame overlaying the reconstructed path (if
/// any). `finalize` is always called exactly once.
fn emit_trace(
    sink: &mut dyn FrameSink,
    rows: usize,
    cols: usize,
    trace: &[Cell],
    path: Option<&[Cell]>,
) {
    if trace.is_empty() {
        sink.finalize();
        return;
    }

    let div = (trace.len() / TRACE_FRAME_BUDGET).max(1);
    let mut frame_count = 0;
    for i in (0..trace.len()).step_by(div) {
        let mut buf = PixelBuffer::new(rows, cols);
        for cell in &trace[..=i] {
            buf.set(cell.row as usize, cell.col as usize, Rgb(80, 80, 200));
        }
        sink.accept(&buf);
        frame_count += 1;
    }

    if let Some(path) = path {
        let mut buf = PixelBuffer::new(rows, cols);
        for cell in trace {
            buf.set(cell.row as usize, cell.col as usize, Rgb(80, 80, 200));
        }
        for cell in path {
            buf.set(cell.row as usize, cell.col as usize, Rgb(0, 220, 0));
        }
        sink.accept(&buf);
        frame_count += 1;
    }

    debug!(
        "emitted {} trace frames (downsample factor {})",
        frame_count, div
    );
    sink.finalize();
}
