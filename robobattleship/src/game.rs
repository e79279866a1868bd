//! Implementation of a single battle between two players.
//!
//! [`Battle`] is the turn state machine: it owns a private copy of each participant's grid
//! and resolves one shot at a time. It knows nothing about how battles are stored or
//! found; see [`crate::registry`] for that.

pub use self::{
    battle::{Battle, Outcome, Participant, Status},
    errors::ShotError,
    first_shooter::{FirstShooter, Fixed, Side},
    view::{BattleView, BoardView, ViewCell},
};

#[cfg(feature = "rng_gen")]
pub use self::first_shooter::RandomFirstShooter;

mod battle;
mod errors;
mod first_shooter;
mod view;
