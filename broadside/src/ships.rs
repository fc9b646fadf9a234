//! Ship classes, fleet composition, and placement plans.

use serde::{Deserialize, Serialize};

use crate::board::Coordinate;

/// The classes of ship a fleet may contain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// Carrier: length 5.
    Carrier,
    /// Battleship: length 4.
    Battleship,
    /// Cruiser: length 3.
    Cruiser,
    /// Submarine: length 3.
    Submarine,
    /// Destroyer: length 2.
    Destroyer,
}

impl ShipClass {
    /// Every ship class, largest first.
    pub const ALL: &'static [ShipClass] = &[
        ShipClass::Carrier,
        ShipClass::Battleship,
        ShipClass::Cruiser,
        ShipClass::Submarine,
        ShipClass::Destroyer,
    ];

    /// Get the length of this ship class.
    pub fn len(self) -> usize {
        match self {
            ShipClass::Carrier => 5,
            ShipClass::Battleship => 4,
            ShipClass::Cruiser => 3,
            ShipClass::Submarine => 3,
            ShipClass::Destroyer => 2,
        }
    }

    /// Full display name of the class.
    pub fn name(self) -> &'static str {
        match self {
            ShipClass::Carrier => "carrier",
            ShipClass::Battleship => "battleship",
            ShipClass::Cruiser => "cruiser",
            ShipClass::Submarine => "submarine",
            ShipClass::Destroyer => "destroyer",
        }
    }

    /// Two-letter type abbreviation used when rendering grids.
    pub fn abbrev(self) -> &'static str {
        match self {
            ShipClass::Carrier => "cv",
            ShipClass::Battleship => "bb",
            ShipClass::Cruiser => "cl",
            ShipClass::Submarine => "ss",
            ShipClass::Destroyer => "dd",
        }
    }
}

/// The fleet a room of the given board size uses. Small boards carry a
/// reduced fleet so placement with a one-cell buffer stays feasible.
pub fn fleet_for(size: usize) -> &'static [ShipClass] {
    match size {
        0..=7 => &[ShipClass::Cruiser, ShipClass::Submarine, ShipClass::Destroyer],
        8..=9 => &[
            ShipClass::Battleship,
            ShipClass::Cruiser,
            ShipClass::Submarine,
            ShipClass::Destroyer,
        ],
        _ => ShipClass::ALL,
    }
}

/// Axis a linear ship lies along, also used to orient pattern abilities.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The unit step along this axis as a `(row, col)` delta.
    pub fn step(self) -> (isize, isize) {
        match self {
            Axis::Horizontal => (0, 1),
            Axis::Vertical => (1, 0),
        }
    }
}

/// One ship's intended position: the bow cell and the axis it extends along.
/// Cells run from `bow` toward increasing row (vertical) or column
/// (horizontal).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShipSpot {
    pub class: ShipClass,
    pub bow: Coordinate,
    pub axis: Axis,
}

impl ShipSpot {
    /// The cells this spot covers, unchecked against any board bounds.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let (dr, dc) = self.axis.step();
        let bow = self.bow;
        (0..self.class.len()).map(move |i| {
            Coordinate::new(
                (bow.row as isize + dr * i as isize) as usize,
                (bow.col as isize + dc * i as isize) as usize,
            )
        })
    }
}

/// A complete placement plan for one side's fleet, as produced by the
/// placement generator or collected from a front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetPlacement {
    pub ships: Vec<ShipSpot>,
}

impl FleetPlacement {
    pub fn new(ships: Vec<ShipSpot>) -> Self {
        Self { ships }
    }
}
