//! Point-in-time copy of the whole server state, saved and loaded as JSON.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    board::Grid,
    errors::{Error, Result},
    game::Battle,
    player::{Player, PlayerDirectory, Uid},
    registry::{BattleId, Registry},
};

/// Everything needed to rebuild a player directory and battle registry.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    /// Latest ship placement of each player.
    pub ships: BTreeMap<Uid, Grid>,
    /// Active battles.
    pub battles: Vec<Battle>,
    pub archived_battles: Vec<Battle>,
    /// Latest archived battle for each canonical id.
    pub last_archived: BTreeMap<BattleId, BattleId>,
}

impl Snapshot {
    /// Copy the state of a directory and registry.
    ///
    /// The directory and registry are read one after the other, so a snapshot taken while
    /// requests are running may catch a battle whose newest player placement is newer
    /// than the battle itself. That is harmless, since battles keep their own grids.
    pub fn capture(directory: &PlayerDirectory, registry: &Registry) -> Result<Self> {
        let (players, ships) = directory.export()?;
        let (battles, archived_battles, last_archived) = registry.export()?;
        Ok(Self {
            players,
            ships,
            battles,
            archived_battles,
            last_archived,
        })
    }

    /// Replace the contents of `directory` and `registry` with this snapshot.
    pub fn restore(self, directory: &PlayerDirectory, registry: &Registry) -> Result<()> {
        directory.import(self.players, self.ships)?;
        registry.import(self.battles, self.archived_battles, self.last_archived)
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).map_err(Error::unexpected)
    }

    /// Read a snapshot written by [`Snapshot::write_to`].
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(Error::unexpected)
    }

    /// Write the snapshot to a new file at `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|err| Error::unexpected(format!("creating {}: {}", path.display(), err)))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer
            .flush()
            .map_err(|err| Error::unexpected(format!("writing {}: {}", path.display(), err)))
    }

    /// Load a snapshot from the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|err| Error::unexpected(format!("opening {}: {}", path.display(), err)))?;
        Self::read_from(BufReader::new(file))
    }
}
