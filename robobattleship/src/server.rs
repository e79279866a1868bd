//! The operations a hosting surface exposes to clients, tying players and battles
//! together.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use chrono::Local;
use tracing::info;

use crate::{
    errors::{Error, Result},
    game::{BattleView, FirstShooter, Outcome},
    player::{Player, PlayerDirectory, Uid},
    registry::{BattleId, Registry},
    settings::Settings,
    snapshot::Snapshot,
};

/// Format of dump file names when the caller doesn't pick one.
const DUMP_NAME_FORMAT: &str = "server_dump_%Y_%m_%d_%H_%M.json";

/// A battleship server: the player directory, the battle registry and the settings
/// they run with. Shareable between threads.
#[derive(Debug)]
pub struct Server {
    settings: Settings,
    directory: PlayerDirectory,
    registry: Registry,
}

impl Server {
    /// Create a server with no players and no battles.
    pub fn new(settings: Settings, first_shooter: impl FirstShooter + 'static) -> Self {
        let directory =
            PlayerDirectory::with_name_bounds(settings.min_name_len, settings.max_name_len);
        Self {
            settings,
            directory,
            registry: Registry::new(first_shooter),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a new player.
    pub fn register(&self, name: &str) -> Result<Player> {
        self.directory.register(name)
    }

    /// Store an authenticated player's ship placement.
    pub fn submit_ships(&self, uid: &str, secret: &str, ships: &str) -> Result<()> {
        let player = self.directory.authenticate(uid, secret)?;
        self.directory.submit_ships(player.uid(), ships)
    }

    /// An authenticated player shoots at `enemy` on `(x, y)`, starting a battle between
    /// them if there is none.
    pub fn shoot(&self, uid: &str, secret: &str, enemy: &str, x: i64, y: i64) -> Result<Outcome> {
        let player = self.directory.authenticate(uid, secret)?;
        self.registry
            .shoot(&self.directory, player.uid(), &Uid::new(enemy), x, y)
    }

    /// Archive the finished battle between two players, if there is one.
    pub fn archive(&self, uid: &str, enemy: &str) -> Result<Option<BattleId>> {
        self.registry.archive(&Uid::new(uid), &Uid::new(enemy))
    }

    /// View of a battle by active, canonical or archived id. Only `viewer` sees their own
    /// unhit ships.
    pub fn battle(&self, id: &str, viewer: Option<&str>) -> Result<BattleView> {
        let viewer = viewer.map(Uid::new);
        Ok(self.registry.lookup(id)?.view(viewer.as_ref()))
    }

    /// All registered players, sorted by name.
    pub fn players(&self) -> Result<Vec<Player>> {
        self.directory.players()
    }

    /// Write the server state under the dumps directory, returning the path written.
    /// Without a file name, one is made up from the current time.
    pub fn dump_state(&self, file_name: Option<&str>) -> Result<PathBuf> {
        let name = match file_name {
            Some(name) => {
                validate_dump_name(name)?;
                name.to_owned()
            }
            None => Local::now().format(DUMP_NAME_FORMAT).to_string(),
        };
        let root = &self.settings.dumps_root;
        fs::create_dir_all(root)
            .map_err(|err| Error::unexpected(format!("creating {}: {}", root.display(), err)))?;
        let path = root.join(name);
        Snapshot::capture(&self.directory, &self.registry)?.save(&path)?;
        info!("Dumped server state to {}", path.display());
        Ok(path)
    }

    /// Replace the server state with a dump written by [`Server::dump_state`].
    pub fn restore_state(&self, path: &Path) -> Result<()> {
        Snapshot::load(path)?.restore(&self.directory, &self.registry)?;
        info!("Restored server state from {}", path.display());
        Ok(())
    }
}

/// Dump names must name a file directly inside the dumps directory.
fn validate_dump_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if plain && !name.contains(|c: char| c == '/' || c == '\\') {
        Ok(())
    } else {
        Err(Error::InvalidDumpName {
            name: name.to_owned(),
        })
    }
}
