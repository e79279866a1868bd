//! Crate-level error type with the stable numeric codes reported to clients.
//!
//! Codes are grouped by their hundreds digit:
//!
//! * `1xx`: core errors. Something went wrong inside the server.
//! * `2xx`: validation errors. The request was malformed or conflicts with server state
//!   and can be corrected by the caller.
//! * `3xx`: battle errors. The request was well formed but the battle is not in a state
//!   that allows it.

use std::sync::PoisonError;

use thiserror::Error;

use crate::{
    board::{CoordinateError, GridParseError},
    game::ShotError,
    player::{AuthError, RegisterError, Uid},
};

/// Shorthand for results carrying the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Group an [`Error`] belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorGroup {
    Core,
    Validation,
    Battle,
}

/// Every failure the server can report.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    /// Internal failure. The detail is for logs, not for clients.
    #[error("Unexpected error occured: {detail}")]
    Unexpected { detail: String },

    #[error("Not enough parameters")]
    NotEnoughParameters,

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error("Battle with id '{id}' doesn't exist")]
    UnknownBattle { id: String },

    #[error(transparent)]
    Grid(#[from] GridParseError),

    #[error("Player '{uid}' can't battle against themself")]
    SelfBattle { uid: Uid },

    #[error("Dump file name '{name}' must be a plain file name")]
    InvalidDumpName { name: String },

    #[error(transparent)]
    Shot(#[from] ShotError),

    #[error("Can't create battle, because player {uid} didn't set ships arrangement yet")]
    ShipsNotSet { uid: Uid },
}

impl Error {
    /// Build an [`Error::Unexpected`] from anything printable.
    pub fn unexpected(detail: impl ToString) -> Self {
        Error::Unexpected {
            detail: detail.to_string(),
        }
    }

    /// Stable numeric code of this error.
    pub fn code(&self) -> u16 {
        match self {
            Error::Unexpected { .. } => 101,
            Error::NotEnoughParameters => 201,
            Error::Register(RegisterError::EmptyName) => 202,
            Error::Register(RegisterError::NameTaken { .. }) => 203,
            Error::Register(RegisterError::NameTooLong { .. }) => 213,
            Error::Register(RegisterError::NameTooShort { .. }) => 214,
            Error::Auth(AuthError::UnknownPlayer { .. }) => 204,
            Error::Auth(AuthError::MissingUid) => 205,
            Error::Auth(AuthError::MissingSecret) => 206,
            Error::Auth(AuthError::BadSecret { .. }) => 207,
            Error::Coordinate(CoordinateError::NotInteger { .. }) => 208,
            Error::Coordinate(CoordinateError::OutOfRange { .. }) => 210,
            Error::UnknownBattle { .. } => 209,
            Error::Grid(GridParseError::InvalidLength { .. }) => 211,
            Error::Grid(GridParseError::InvalidCharset) => 212,
            Error::SelfBattle { .. } => 215,
            Error::InvalidDumpName { .. } => 216,
            Error::Shot(ShotError::NotYourTurn) => 301,
            Error::ShipsNotSet { .. } => 303,
            Error::Shot(ShotError::BattleOver { .. }) => 304,
        }
    }

    /// Group this error belongs to, derived from its code.
    pub fn group(&self) -> ErrorGroup {
        match self.code() / 100 {
            1 => ErrorGroup::Core,
            2 => ErrorGroup::Validation,
            _ => ErrorGroup::Battle,
        }
    }

    /// Whether this error reports that the battle is already over.
    pub fn is_battle_over(&self) -> bool {
        matches!(self, Error::Shot(ShotError::BattleOver { .. }))
    }
}

impl<T> From<PoisonError<T>> for Error {
    /// A lock was poisoned by a panicking thread. Reported instead of propagating the
    /// panic.
    fn from(err: PoisonError<T>) -> Self {
        tracing::error!("lock poisoned: {}", err);
        Error::unexpected(err)
    }
}
