//! Defines the fixed-size grid that holds one player's ships and the shots fired at them.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Coordinate, GridParseError, ShotOutcome, PLACEMENT_LEN, SIZE};

/// Axis directions walked when checking whether a ship has been sunk.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// A single player's 10x10 grid of cells.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Cell; SIZE]; SIZE],
}

impl Grid {
    /// Parse a row-major placement string of exactly 100 `'0'` (empty) and `'1'` (ship)
    /// characters.
    pub fn parse(placement: &str) -> Result<Self, GridParseError> {
        let characters = placement.chars().count();
        if characters != PLACEMENT_LEN {
            return Err(GridParseError::InvalidLength { characters });
        }
        let mut grid = Grid::default();
        for (i, ch) in placement.chars().enumerate() {
            grid.cells[i / SIZE][i % SIZE] = match ch {
                '0' => Cell::Empty,
                '1' => Cell::Ship,
                _ => return Err(GridParseError::InvalidCharset),
            };
        }
        Ok(grid)
    }

    /// Serialize back to a placement string. Cells that were hit still count as ship
    /// cells and missed cells count as empty.
    pub fn to_placement(&self) -> String {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .map(|cell| if cell.is_ship() { '1' } else { '0' })
            .collect()
    }

    /// Get the cell at the given coordinate.
    pub fn get(&self, coord: Coordinate) -> Cell {
        self[coord]
    }

    /// Fire at the given cell. Ships become hit and open water becomes a miss. A cell that
    /// was already shot is left alone and reports the same outcome as the first shot.
    pub fn apply_shot(&mut self, coord: Coordinate) -> ShotOutcome {
        let cell = &mut self[coord];
        match *cell {
            Cell::Ship => {
                *cell = Cell::Hit;
                ShotOutcome::Hit
            }
            Cell::Hit => ShotOutcome::Hit,
            Cell::Empty => {
                *cell = Cell::Miss;
                ShotOutcome::Miss
            }
            Cell::Miss => ShotOutcome::Miss,
        }
    }

    /// Returns true if the ship occupying the hit cell at `coord` has no unhit cells left.
    ///
    /// Walks outward from `coord` along each axis while the cells belong to a ship. Ships
    /// are assumed to be straight lines; nothing checks that at placement time.
    pub fn is_sunk(&self, coord: Coordinate) -> bool {
        if self[coord] != Cell::Hit {
            return false;
        }
        DIRECTIONS.iter().all(|&(dx, dy)| {
            let mut next = coord.step(dx, dy);
            while let Some(c) = next {
                match self[c] {
                    Cell::Ship => return false,
                    Cell::Hit => next = c.step(dx, dy),
                    Cell::Empty | Cell::Miss => break,
                }
            }
            true
        })
    }

    /// Returns true if no unhit ship cells remain.
    pub fn is_defeated(&self) -> bool {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .all(|&cell| cell != Cell::Ship)
    }

    /// Number of cells occupied by ships, hit or not.
    pub fn ship_cells(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_ship())
            .count()
    }

    /// Get an iterator over the rows of this grid.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; SIZE]> {
        self.cells.iter()
    }
}

impl Default for Grid {
    /// A grid of open water.
    fn default() -> Self {
        Self {
            cells: [[Cell::Empty; SIZE]; SIZE],
        }
    }
}

impl Index<Coordinate> for Grid {
    type Output = Cell;

    fn index(&self, coord: Coordinate) -> &Self::Output {
        &self.cells[coord.x()][coord.y()]
    }
}

impl IndexMut<Coordinate> for Grid {
    fn index_mut(&mut self, coord: Coordinate) -> &mut Self::Output {
        &mut self.cells[coord.x()][coord.y()]
    }
}
