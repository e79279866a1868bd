//! Registry of players and their most recent ship placements.

use std::{
    collections::{BTreeMap, HashMap},
    sync::RwLock,
};

use tracing::{info, warn};

use crate::{
    board::Grid,
    errors::{Error, Result},
    game::Participant,
    player::{AuthError, Player, RegisterError, Uid},
    settings::{MAX_NAME_LEN, MIN_NAME_LEN},
};

/// Everything guarded by the directory lock.
#[derive(Debug, Default)]
struct Inner {
    players: HashMap<Uid, Player>,
    /// Name to uid index, used for the uniqueness check.
    names: HashMap<String, Uid>,
    /// Latest ship placement submitted by each player. Battles take a copy.
    ships: HashMap<Uid, Grid>,
}

impl Inner {
    fn insert(&mut self, player: Player) {
        self.names
            .insert(player.name().to_owned(), player.uid().clone());
        self.players.insert(player.uid().clone(), player);
    }
}

/// Append-only directory of registered players.
///
/// Writes (registration and ship submission) are serialized by a single lock, so the
/// check that a name is free and the insert that claims it happen as one step.
#[derive(Debug)]
pub struct PlayerDirectory {
    min_name_len: usize,
    max_name_len: usize,
    inner: RwLock<Inner>,
}

impl PlayerDirectory {
    /// Create an empty directory with the default name length bounds.
    pub fn new() -> Self {
        Self::with_name_bounds(MIN_NAME_LEN, MAX_NAME_LEN)
    }

    /// Create an empty directory accepting names of `min..=max` characters.
    pub fn with_name_bounds(min: usize, max: usize) -> Self {
        Self {
            min_name_len: min,
            max_name_len: max,
            inner: RwLock::default(),
        }
    }

    /// Register a new player. The uid and secret are derived from the name.
    pub fn register(&self, name: &str) -> Result<Player> {
        if name.trim().is_empty() {
            return Err(RegisterError::EmptyName.into());
        }
        let len = name.chars().count();
        if len > self.max_name_len {
            return Err(RegisterError::NameTooLong {
                max: self.max_name_len,
            }
            .into());
        }
        if len < self.min_name_len {
            return Err(RegisterError::NameTooShort {
                min: self.min_name_len,
            }
            .into());
        }

        let player = Player::new(name);
        let mut inner = self.inner.write()?;
        if inner.names.contains_key(name) {
            return Err(RegisterError::NameTaken {
                name: name.to_owned(),
            }
            .into());
        }
        if let Some(existing) = inner.players.get(player.uid()) {
            return Err(Error::unexpected(format!(
                "uid {} derived for '{}' already belongs to '{}'",
                player.uid(),
                name,
                existing.name()
            )));
        }
        inner.insert(player.clone());
        info!("Registered player [{}]", player);
        Ok(player)
    }

    /// Check a player's credentials, returning the player on success.
    pub fn authenticate(&self, uid: &str, secret: &str) -> Result<Player> {
        if uid.is_empty() {
            return Err(AuthError::MissingUid.into());
        }
        if secret.is_empty() {
            return Err(AuthError::MissingSecret.into());
        }
        let uid = Uid::new(uid);
        let player = self.require(&uid)?;
        if player.secret() != secret {
            warn!("Rejected bad secret for player {}", uid);
            return Err(AuthError::BadSecret { uid }.into());
        }
        Ok(player)
    }

    /// Store a ship placement for the player, replacing any earlier one. Battles already
    /// in progress keep the placement they started with.
    pub fn submit_ships(&self, uid: &Uid, placement: &str) -> Result<()> {
        let grid = Grid::parse(placement)?;
        let mut inner = self.inner.write()?;
        if !inner.players.contains_key(uid) {
            return Err(AuthError::UnknownPlayer { uid: uid.clone() }.into());
        }
        inner.ships.insert(uid.clone(), grid);
        Ok(())
    }

    /// Get the player with the given uid, if registered.
    pub fn get(&self, uid: &Uid) -> Result<Option<Player>> {
        Ok(self.inner.read()?.players.get(uid).cloned())
    }

    /// Get the player with the given uid, failing with `UnknownPlayer` if there is none.
    pub fn require(&self, uid: &Uid) -> Result<Player> {
        self.get(uid)?
            .ok_or_else(|| AuthError::UnknownPlayer { uid: uid.clone() }.into())
    }

    /// Returns true if a player with exactly this name is registered.
    pub fn is_registered(&self, name: &str) -> Result<bool> {
        Ok(self.inner.read()?.names.contains_key(name))
    }

    /// A copy of the player's latest ship placement, if any.
    pub fn placement(&self, uid: &Uid) -> Result<Option<Grid>> {
        Ok(self.inner.read()?.ships.get(uid).cloned())
    }

    /// Pair a registered player with a private copy of their current placement.
    pub(crate) fn participant(&self, uid: &Uid) -> Result<Participant> {
        let inner = self.inner.read()?;
        let player = inner
            .players
            .get(uid)
            .ok_or_else(|| AuthError::UnknownPlayer { uid: uid.clone() })?;
        let grid = inner
            .ships
            .get(uid)
            .ok_or_else(|| Error::ShipsNotSet { uid: uid.clone() })?;
        Ok(Participant::new(player.clone(), grid.clone()))
    }

    /// All registered players, sorted by name.
    pub fn players(&self) -> Result<Vec<Player>> {
        let mut players: Vec<_> = self.inner.read()?.players.values().cloned().collect();
        players.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(players)
    }

    /// Number of registered players.
    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read()?.players.len())
    }

    /// Returns true if nobody has registered yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy out all players and placements, sorted for stable output.
    pub(crate) fn export(&self) -> Result<(Vec<Player>, BTreeMap<Uid, Grid>)> {
        let inner = self.inner.read()?;
        let mut players: Vec<_> = inner.players.values().cloned().collect();
        players.sort_by(|a, b| a.uid().cmp(b.uid()));
        let ships = inner
            .ships
            .iter()
            .map(|(uid, grid)| (uid.clone(), grid.clone()))
            .collect();
        Ok((players, ships))
    }

    /// Replace the contents of the directory.
    pub(crate) fn import(
        &self,
        players: Vec<Player>,
        ships: BTreeMap<Uid, Grid>,
    ) -> Result<()> {
        let mut fresh = Inner::default();
        for player in players {
            fresh.insert(player);
        }
        fresh.ships = ships.into_iter().collect();
        *self.inner.write()? = fresh;
        Ok(())
    }
}

impl Default for PlayerDirectory {
    fn default() -> Self {
        Self::new()
    }
}
