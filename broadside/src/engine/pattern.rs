//! Detection of collinear hit runs and their predicted extensions.

use std::collections::HashSet;

use crate::{board::Coordinate, ships::Axis};

/// A run of collinear hits believed to belong to one ship, plus the cells a
/// continuation of that ship would occupy.
#[derive(Debug, Clone)]
pub struct Segment {
    pub axis: Axis,
    /// The hit cells of the run, in axis order.
    pub cells: Vec<Coordinate>,
    /// Unresolved in-bounds cells just beyond either end of the run.
    pub extensions: Vec<Coordinate>,
    /// Confidence assigned to the extension prediction.
    pub confidence: f64,
}

/// Find every collinear run of length >= 2 among `hits`. `blocked` reports
/// cells the prediction may not extend into (resolved cells and the board
/// edge, via `size`).
pub fn detect_runs(
    hits: &[Coordinate],
    size: usize,
    blocked: impl Fn(Coordinate) -> bool,
    confidence: f64,
) -> Vec<Segment> {
    let set: HashSet<Coordinate> = hits.iter().copied().collect();
    let mut segments = Vec::new();
    for axis in [Axis::Horizontal, Axis::Vertical].iter().copied() {
        let (dr, dc) = axis.step();
        for &start in hits {
            // Only start a run at its first cell.
            if start
                .offset(-dr, -dc)
                .map_or(false, |prev| set.contains(&prev))
            {
                continue;
            }
            let mut cells = vec![start];
            let mut cursor = start;
            while let Some(next) = cursor.offset(dr, dc) {
                if set.contains(&next) {
                    cells.push(next);
                    cursor = next;
                } else {
                    break;
                }
            }
            if cells.len() < 2 {
                continue;
            }
            let mut extensions = Vec::new();
            if let Some(before) = start.offset(-dr, -dc) {
                if in_bounds(before, size) && !blocked(before) {
                    extensions.push(before);
                }
            }
            if let Some(after) = cursor.offset(dr, dc) {
                if in_bounds(after, size) && !blocked(after) {
                    extensions.push(after);
                }
            }
            segments.push(Segment {
                axis,
                cells,
                extensions,
                confidence,
            });
        }
    }
    segments
}

fn in_bounds(coord: Coordinate, size: usize) -> bool {
    coord.row < size && coord.col < size
}
