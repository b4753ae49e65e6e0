//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offsets of the Moore neighbourhood, row-major, centre excluded.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Unique identifier for an animal, allocated in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell coordinate in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Whether `other` is one of the eight cells around this one
    pub fn is_adjacent(&self, other: &Location) -> bool {
        let d_row = (self.row - other.row).abs();
        let d_col = (self.col - other.col).abs();
        self != other && d_row <= 1 && d_col <= 1
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Species category of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Prey,
    Predator,
}

impl Kind {
    pub fn all() -> [Kind; 2] {
        [Kind::Prey, Kind::Predator]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Prey => write!(f, "Prey"),
            Kind::Predator => write!(f, "Predator"),
        }
    }
}

/// Why an animal left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Eaten,
    Overcrowding,
}

impl DeathCause {
    pub fn all() -> [DeathCause; 4] {
        [
            DeathCause::OldAge,
            DeathCause::Starvation,
            DeathCause::Eaten,
            DeathCause::Overcrowding,
        ]
    }
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeathCause::OldAge => "old_age",
            DeathCause::Starvation => "starvation",
            DeathCause::Eaten => "eaten",
            DeathCause::Overcrowding => "overcrowding",
        };
        f.write_str(name)
    }
}
