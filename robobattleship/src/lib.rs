//! Core of a server-authoritative, two player Battleship server.
//!
//! Players register with a name and receive a uid and secret ([`player`]). Each player
//! submits a 10x10 ship placement ([`board`]) and then shoots at any other player; the
//! first shot between a pair starts a [`game::Battle`] with private copies of both
//! placements. Battles are stored in the [`registry`] under an id that doesn't depend on
//! who shot first, and move to an archive once somebody wins.
//!
//! [`Server`] bundles these pieces into the operations a hosting surface exposes, and
//! [`response`] wraps their results in the JSON envelope clients expect.

pub use crate::{
    errors::{Error, ErrorGroup, Result},
    server::Server,
    settings::Settings,
    snapshot::Snapshot,
};

pub mod board;
pub mod errors;
pub mod game;
pub mod player;
pub mod registry;
pub mod response;
pub mod server;
pub mod settings;
pub mod snapshot;
