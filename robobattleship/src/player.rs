//! Player identities and the directory that issues them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use self::{
    directory::PlayerDirectory,
    errors::{AuthError, RegisterError},
};

mod directory;
mod errors;

/// Opaque, server-generated player identifier.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wrap a uid received from a client.
    pub fn new(uid: impl Into<String>) -> Self {
        Uid(uid.into())
    }

    /// The uid as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(uid: &str) -> Self {
        Uid::new(uid)
    }
}

/// A registered player. Immutable once created.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    uid: Uid,
    name: String,
    secret: String,
}

impl Player {
    /// Create a player with credentials derived from the name.
    ///
    /// The derivation is deterministic and not cryptographically secret: anyone who knows
    /// a name can compute its secret. Secrecy is not a goal here.
    pub(crate) fn new(name: &str) -> Self {
        let digest = hex::encode(Sha256::digest(name.as_bytes()));
        Self {
            uid: Uid(format!("uid-{}", &digest[..8])),
            name: name.to_owned(),
            secret: format!("usec-{}", &digest[10..18]),
        }
    }

    /// The player's identifier.
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The player's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared secret the player authenticates with.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.uid)
    }
}
