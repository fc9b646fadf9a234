//! Tier-biased fleet layout generation for the automated opponent.
//!
//! Every bias produces a legal layout: in bounds, non-overlapping, with the
//! one-cell buffer between ships. Generation is biased random sampling with
//! restarts; if sampling keeps failing, a deterministic first-fit scan
//! finishes the job, so generation always terminates.

use rand::Rng;

use crate::{
    board::{BoardSetup, Coordinate},
    engine::difficulty::PlacementBias,
    ships::{fleet_for, Axis, FleetPlacement, ShipClass, ShipSpot},
};

/// Full-layout restarts before falling back to the deterministic scan.
const MAX_RESTARTS: usize = 32;
/// Candidate spots tried per ship within one layout attempt.
const TRIES_PER_SHIP: usize = 48;

/// Generate a legal fleet layout for a board of the given size with the
/// given bias.
pub fn generate_layout(size: usize, bias: PlacementBias, rng: &mut impl Rng) -> FleetPlacement {
    for _ in 0..MAX_RESTARTS {
        if let Some(plan) = try_layout(size, bias, rng) {
            return plan;
        }
    }
    first_fit_layout(size)
}

fn try_layout(size: usize, bias: PlacementBias, rng: &mut impl Rng) -> Option<FleetPlacement> {
    let mut setup = BoardSetup::new(size);
    let mut spots = Vec::new();
    let anchor = Coordinate::new(rng.gen_range(0, size), rng.gen_range(0, size));
    for &class in fleet_for(size) {
        let mut placed = false;
        for _ in 0..TRIES_PER_SHIP {
            let spot = sample_spot(size, class, bias, anchor, &spots, rng);
            if setup.place(spot).is_ok() {
                spots.push(spot);
                placed = true;
                break;
            }
        }
        if !placed {
            return None;
        }
    }
    Some(FleetPlacement::new(spots))
}

fn sample_spot(
    size: usize,
    class: ShipClass,
    bias: PlacementBias,
    anchor: Coordinate,
    placed: &[ShipSpot],
    rng: &mut impl Rng,
) -> ShipSpot {
    let axis = if rng.gen_bool(0.5) {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    let bow = match bias {
        PlacementBias::EdgeHugging => {
            // Pin one component into the two-cell band along an edge.
            let band = [0, 1, size - 2, size - 1];
            let pinned = band[rng.gen_range(0, band.len())];
            if rng.gen_bool(0.5) {
                Coordinate::new(pinned, rng.gen_range(0, size))
            } else {
                Coordinate::new(rng.gen_range(0, size), pinned)
            }
        }
        PlacementBias::Clustered => {
            let row = jitter(anchor.row, 3, size, rng);
            let col = jitter(anchor.col, 3, size, rng);
            Coordinate::new(row, col)
        }
        PlacementBias::Dispersed => {
            // Sample a few uniform candidates and keep the one farthest from
            // everything already placed.
            let mut best = Coordinate::new(rng.gen_range(0, size), rng.gen_range(0, size));
            let mut best_dist = min_distance(best, placed);
            for _ in 0..3 {
                let candidate =
                    Coordinate::new(rng.gen_range(0, size), rng.gen_range(0, size));
                let dist = min_distance(candidate, placed);
                if dist > best_dist {
                    best = candidate;
                    best_dist = dist;
                }
            }
            best
        }
    };
    ShipSpot { class, bow, axis }
}

fn jitter(center: usize, radius: usize, size: usize, rng: &mut impl Rng) -> usize {
    let lo = center.saturating_sub(radius);
    let hi = (center + radius + 1).min(size);
    rng.gen_range(lo, hi)
}

/// Chebyshev distance from a candidate bow to the nearest placed ship cell.
fn min_distance(candidate: Coordinate, placed: &[ShipSpot]) -> usize {
    placed
        .iter()
        .flat_map(|spot| spot.cells().collect::<Vec<_>>())
        .map(|cell| {
            let dr = (candidate.row as isize - cell.row as isize).unsigned_abs();
            let dc = (candidate.col as isize - cell.col as isize).unsigned_abs();
            dr.max(dc)
        })
        .min()
        .unwrap_or(usize::MAX)
}

/// Deterministic fallback: place each ship at the first legal position in a
/// row-major scan. Succeeds for every supported board size and fleet.
fn first_fit_layout(size: usize) -> FleetPlacement {
    let mut setup = BoardSetup::new(size);
    let mut spots = Vec::new();
    for &class in fleet_for(size) {
        let mut placed = false;
        'scan: for row in 0..size {
            for col in 0..size {
                for &axis in &[Axis::Horizontal, Axis::Vertical] {
                    let spot = ShipSpot {
                        class,
                        bow: Coordinate::new(row, col),
                        axis,
                    };
                    if setup.place(spot).is_ok() {
                        spots.push(spot);
                        placed = true;
                        break 'scan;
                    }
                }
            }
        }
        // The supported fleets always fit their board sizes.
        assert!(placed, "fleet does not fit the board");
    }
    FleetPlacement::new(spots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn every_bias_and_size_produces_a_legal_layout() {
        let biases = [
            PlacementBias::EdgeHugging,
            PlacementBias::Clustered,
            PlacementBias::Dispersed,
        ];
        for &size in &[6, 7, 8, 9, 10, 11, 12] {
            for &bias in &biases {
                for seed in 0..8 {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let plan = generate_layout(size, bias, &mut rng);
                    let setup = BoardSetup::with_plan(size, &plan)
                        .expect("generated layout must replay cleanly");
                    assert!(setup.ready(), "layout left ships unplaced");
                }
            }
        }
    }

    #[test]
    fn first_fit_layout_is_legal_for_all_sizes() {
        for &size in &[6, 8, 10, 12] {
            let plan = first_fit_layout(size);
            let setup = BoardSetup::with_plan(size, &plan).unwrap();
            assert!(setup.ready());
        }
    }

    #[test]
    fn edge_bias_tends_to_the_border() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut edge_cells = 0usize;
        let mut total = 0usize;
        for _ in 0..20 {
            let plan = generate_layout(10, PlacementBias::EdgeHugging, &mut rng);
            for spot in &plan.ships {
                for cell in spot.cells() {
                    total += 1;
                    if cell.row <= 1 || cell.row >= 8 || cell.col <= 1 || cell.col >= 8 {
                        edge_cells += 1;
                    }
                }
            }
        }
        // A clear majority of cells should sit in the edge band.
        assert!(edge_cells * 2 > total, "{}/{} edge cells", edge_cells, total);
    }
}
