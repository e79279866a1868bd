//! Errors used by the `Grid` and `Coordinate`.

use thiserror::Error;

use crate::board::PLACEMENT_LEN;

/// Reason why a ship placement string could not be turned into a grid.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum GridParseError {
    /// The placement string was not exactly 100 characters.
    #[error(
        "Length of ships string must be {} characters exactly, you supplied {characters} characters",
        PLACEMENT_LEN
    )]
    InvalidLength { characters: usize },
    /// The placement string contained something other than '0' and '1'.
    #[error("Ships string must contain only '0' and '1' characters")]
    InvalidCharset,
}

/// Reason why a coordinate supplied by a client was rejected.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CoordinateError {
    /// The coordinate value was not an integer.
    #[error("Target coordinates (x,y) must be integers, got '{value}'")]
    NotInteger { value: String },
    /// The coordinate was outside of the board.
    #[error("Coordinate value must be in range [0,9], got [{x},{y}]")]
    OutOfRange { x: i64, y: i64 },
}
