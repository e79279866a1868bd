use std::{convert::TryFrom, fmt};

use serde::{Deserialize, Serialize};

use crate::board::{CoordinateError, SIZE};

/// The coordinates of a cell in a [`Grid`][crate::board::Grid]. Always in bounds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Row of the cell.
    x: usize,
    /// Column of the cell.
    y: usize,
}

impl Coordinate {
    /// Construct a [`Coordinate`] from the given `x` (row) and `y` (column). Fails with
    /// [`CoordinateError::OutOfRange`] unless both are in `[0, 9]`.
    pub fn new(x: i64, y: i64) -> Result<Self, CoordinateError> {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(ux), Ok(uy)) if ux < SIZE && uy < SIZE => Ok(Self { x: ux, y: uy }),
            _ => Err(CoordinateError::OutOfRange { x, y }),
        }
    }

    /// Parse a single axis value as sent by a client. This only checks that the value is
    /// an integer; range is checked by [`Coordinate::new`].
    pub fn parse_axis(value: &str) -> Result<i64, CoordinateError> {
        value
            .trim()
            .parse()
            .map_err(|_| CoordinateError::NotInteger {
                value: value.to_owned(),
            })
    }

    /// Row of the cell.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Column of the cell.
    pub fn y(&self) -> usize {
        self.y
    }

    /// Index of this cell in a row-major placement string.
    pub fn linearize(&self) -> usize {
        self.x * SIZE + self.y
    }

    /// Step one cell in the given direction, returning `None` past the edge of the board.
    pub(crate) fn step(&self, dx: isize, dy: isize) -> Option<Self> {
        let x = self.x as isize + dx;
        let y = self.y as isize + dy;
        if (0..SIZE as isize).contains(&x) && (0..SIZE as isize).contains(&y) {
            Some(Self {
                x: x as usize,
                y: y as usize,
            })
        } else {
            None
        }
    }

    /// Iterate every coordinate on the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..SIZE).flat_map(|x| (0..SIZE).map(move |y| Coordinate { x, y }))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

impl From<Coordinate> for (usize, usize) {
    /// Convert the [`Coordinate`] into an `(x, y)` pair.
    fn from(coord: Coordinate) -> Self {
        (coord.x, coord.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert!(Coordinate::new(0, 0).is_ok());
        assert!(Coordinate::new(9, 9).is_ok());
        assert_eq!(
            Coordinate::new(10, 0),
            Err(CoordinateError::OutOfRange { x: 10, y: 0 })
        );
        assert_eq!(
            Coordinate::new(3, -1),
            Err(CoordinateError::OutOfRange { x: 3, y: -1 })
        );
    }

    #[test]
    fn parse_axis() {
        assert_eq!(Coordinate::parse_axis(" 7"), Ok(7));
        assert_eq!(Coordinate::parse_axis("-2"), Ok(-2));
        assert_eq!(
            Coordinate::parse_axis("seven"),
            Err(CoordinateError::NotInteger {
                value: "seven".to_owned()
            })
        );
    }

    #[test]
    fn steps_stop_at_edges() {
        let corner = Coordinate::new(0, 9).unwrap();
        assert_eq!(corner.step(-1, 0), None);
        assert_eq!(corner.step(0, 1), None);
        assert_eq!(corner.step(1, 0), Some(Coordinate::new(1, 9).unwrap()));
        assert_eq!(corner.linearize(), 9);
    }
}
