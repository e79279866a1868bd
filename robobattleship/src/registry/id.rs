use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::player::Uid;

/// Format of the completion timestamp appended to archived battle ids.
const ARCHIVE_TIME_FORMAT: &str = "%Y.%m.%d_%H.%M.%S";

/// Identifier of a battle, either canonical (active) or archived.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(String);

impl BattleId {
    /// Wrap an id received from a client.
    pub fn new(id: impl Into<String>) -> Self {
        BattleId(id.into())
    }

    /// The canonical id of the battle between two players. Symmetric: the larger uid
    /// always goes first, whichever order the players are given in.
    pub fn canonical(a: &Uid, b: &Uid) -> Self {
        let (first, second) = if a >= b { (a, b) } else { (b, a) };
        BattleId(format!("{}_vs_{}", first.as_str(), second.as_str()))
    }

    /// The id this battle gets when archived at the given time.
    pub fn archived<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        BattleId(format!("{}_{}", self.0, at.format(ARCHIVE_TIME_FORMAT)))
    }

    /// Disambiguate an archived id that is already taken.
    pub(crate) fn with_counter(&self, n: usize) -> Self {
        BattleId(format!("{}-{}", self.0, n))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}
