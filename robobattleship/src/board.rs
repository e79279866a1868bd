//! Types that make up a player's board.

use serde::{Deserialize, Serialize};

pub use self::{
    coordinate::Coordinate,
    errors::{CoordinateError, GridParseError},
    grid::Grid,
};

mod coordinate;
mod errors;
mod grid;

/// Width and height of every board.
pub const SIZE: usize = 10;

/// Number of characters in a ship placement string.
pub const PLACEMENT_LEN: usize = SIZE * SIZE;

/// State of a single cell in a player's grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    /// Open water that has not been shot.
    Empty,
    /// Part of a ship that has not been shot.
    Ship,
    /// Part of a ship that has been shot.
    Hit,
    /// Open water that has been shot.
    Miss,
}

impl Cell {
    /// Whether this cell holds (or held) part of a ship.
    pub fn is_ship(self) -> bool {
        match self {
            Cell::Ship | Cell::Hit => true,
            Cell::Empty | Cell::Miss => false,
        }
    }

    /// Whether this cell has been shot at.
    pub fn is_shot(self) -> bool {
        match self {
            Cell::Hit | Cell::Miss => true,
            Cell::Empty | Cell::Ship => false,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// Result of a single shot against a grid, before sink and defeat are considered.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShotOutcome {
    /// The shot landed on a ship.
    Hit,
    /// The shot landed in open water.
    Miss,
}
