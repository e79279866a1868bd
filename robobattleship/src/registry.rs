//! Storage for active and archived battles.
//!
//! Every canonical battle id owns a slot with its own lock. Shots, battle creation and
//! archival for one pair of players all happen under that slot's lock, so two requests
//! for the same pair never interleave, while requests for different pairs never wait on
//! each other. The map of slots is only locked long enough to find or add a slot.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, Mutex, RwLock},
};

use chrono::Local;
use tracing::{debug, info};

use crate::{
    board::Coordinate,
    errors::{Error, Result},
    game::{Battle, FirstShooter, Outcome},
    player::{PlayerDirectory, Uid},
};

pub use self::id::BattleId;

mod id;

/// Active battle for one canonical id, if any. Empty once its battle is archived.
type Slot = Arc<Mutex<Option<Battle>>>;

/// Finished battles, plus the pointer from each canonical id to its latest archived
/// battle.
#[derive(Debug, Default)]
struct Archive {
    battles: HashMap<BattleId, Battle>,
    last: HashMap<BattleId, BattleId>,
}

/// Registry of battles between pairs of players.
pub struct Registry {
    first_shooter: Box<dyn FirstShooter>,
    active: RwLock<HashMap<BattleId, Slot>>,
    archive: RwLock<Archive>,
}

impl Registry {
    /// Create an empty registry. `first_shooter` decides who opens each new battle.
    pub fn new(first_shooter: impl FirstShooter + 'static) -> Self {
        Self {
            first_shooter: Box::new(first_shooter),
            active: RwLock::default(),
            archive: RwLock::default(),
        }
    }

    /// Get the slot for the given id, adding an empty one if needed.
    fn slot(&self, id: &BattleId) -> Result<Slot> {
        let existing = self.existing_slot(id)?;
        if let Some(slot) = existing {
            return Ok(slot);
        }
        let mut active = self.active.write()?;
        Ok(Arc::clone(active.entry(id.clone()).or_default()))
    }

    /// Get the slot for the given id without adding one.
    fn existing_slot(&self, id: &BattleId) -> Result<Option<Slot>> {
        Ok(self.active.read()?.get(id).cloned())
    }

    /// Run `f` on the active battle between `a` and `b`, creating the battle first if
    /// there is none. Creation copies both players' current placements and fails with
    /// `ShipsNotSet` if either is missing, checking `a` first.
    fn with_battle<T>(
        &self,
        directory: &PlayerDirectory,
        a: &Uid,
        b: &Uid,
        f: impl FnOnce(&mut Battle) -> Result<T>,
    ) -> Result<T> {
        if a == b {
            return Err(Error::SelfBattle { uid: a.clone() });
        }
        let id = BattleId::canonical(a, b);
        // Only pairs that can actually battle get a slot.
        let (slot, mut fresh) = match self.existing_slot(&id)? {
            Some(slot) => (slot, None),
            None => {
                let pair = (directory.participant(a)?, directory.participant(b)?);
                (self.slot(&id)?, Some(pair))
            }
        };
        let mut guard = slot.lock()?;
        let battle = match &mut *guard {
            Some(battle) => battle,
            empty => {
                let (first, second) = match fresh.take() {
                    Some(pair) => pair,
                    None => (directory.participant(a)?, directory.participant(b)?),
                };
                let battle = Battle::new(id, first, second, &*self.first_shooter);
                info!(
                    "Created battle {}, {} shoots first",
                    battle.id(),
                    battle.shooter().player()
                );
                empty.get_or_insert(battle)
            }
        };
        f(battle)
    }

    /// Get a snapshot of the active battle between `a` and `b`, creating it if needed.
    pub fn find_or_create(&self, directory: &PlayerDirectory, a: &Uid, b: &Uid) -> Result<Battle> {
        self.with_battle(directory, a, b, |battle| Ok(battle.clone()))
    }

    /// Player `shooter` fires at `target` on `(x, y)`. The coordinate is range checked
    /// before any battle is touched.
    pub fn shoot(
        &self,
        directory: &PlayerDirectory,
        shooter: &Uid,
        target: &Uid,
        x: i64,
        y: i64,
    ) -> Result<Outcome> {
        let coord = Coordinate::new(x, y)?;
        self.with_battle(directory, shooter, target, |battle| {
            let outcome = battle.shoot(shooter, coord)?;
            debug!("{} shot {} in {}: {}", shooter, coord, battle.id(), outcome);
            Ok(outcome)
        })
    }

    /// Move the finished battle between `a` and `b` into the archive, returning its new
    /// id.
    ///
    /// Does nothing and returns `None` if there is no active battle for the pair or if it
    /// is still being fought, so calling this twice, or late, is harmless.
    pub fn archive(&self, a: &Uid, b: &Uid) -> Result<Option<BattleId>> {
        let id = BattleId::canonical(a, b);
        let slot = match self.existing_slot(&id)? {
            Some(slot) => slot,
            None => return Ok(None),
        };
        let mut guard = slot.lock()?;
        match &*guard {
            Some(battle) if !battle.is_active() => {}
            _ => return Ok(None),
        }

        let mut archive = self.archive.write()?;
        let mut battle = match guard.take() {
            Some(battle) => battle,
            None => return Ok(None),
        };
        let base = id.archived(&Local::now());
        let mut archived = base.clone();
        let mut n = 1;
        while archive.battles.contains_key(&archived) {
            archived = base.with_counter(n);
            n += 1;
        }
        battle.set_id(archived.clone());
        archive.last.insert(id.clone(), archived.clone());
        archive.battles.insert(archived.clone(), battle);
        info!("Archived battle {} as {}", id, archived);
        Ok(Some(archived))
    }

    /// Find a battle by id. Active battles are checked first, then canonical ids of
    /// archived battles (resolving to the latest one), then archived ids.
    pub fn lookup(&self, id: &str) -> Result<Battle> {
        let key = BattleId::new(id);
        if let Some(slot) = self.existing_slot(&key)? {
            let guard = slot.lock()?;
            if let Some(battle) = &*guard {
                return Ok(battle.clone());
            }
        }
        let archive = self.archive.read()?;
        let found = match archive.last.get(&key) {
            Some(archived) => archive.battles.get(archived),
            None => archive.battles.get(&key),
        };
        found.cloned().ok_or_else(|| Error::UnknownBattle {
            id: id.to_owned(),
        })
    }

    /// Ids of all active battles, sorted.
    pub fn active_ids(&self) -> Result<Vec<BattleId>> {
        let slots: Vec<(BattleId, Slot)> = self
            .active
            .read()?
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();
        let mut ids = Vec::with_capacity(slots.len());
        for (id, slot) in slots {
            if slot.lock()?.is_some() {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Ids of all archived battles, sorted.
    pub fn archived_ids(&self) -> Result<Vec<BattleId>> {
        let mut ids: Vec<_> = self.archive.read()?.battles.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Number of active battles.
    pub fn active_len(&self) -> Result<usize> {
        Ok(self.active_ids()?.len())
    }

    /// Number of archived battles.
    pub fn archived_len(&self) -> Result<usize> {
        Ok(self.archive.read()?.battles.len())
    }

    /// Copy out active battles, archived battles and the canonical-to-archived pointers.
    pub(crate) fn export(
        &self,
    ) -> Result<(Vec<Battle>, Vec<Battle>, BTreeMap<BattleId, BattleId>)> {
        let mut active = Vec::new();
        for id in self.active_ids()? {
            if let Some(slot) = self.existing_slot(&id)? {
                if let Some(battle) = &*slot.lock()? {
                    active.push(battle.clone());
                }
            }
        }
        let archive = self.archive.read()?;
        let mut archived: Vec<_> = archive.battles.values().cloned().collect();
        archived.sort_by(|a, b| a.id().cmp(b.id()));
        let last = archive
            .last
            .iter()
            .map(|(canonical, archived)| (canonical.clone(), archived.clone()))
            .collect();
        Ok((active, archived, last))
    }

    /// Replace the contents of the registry. Battles are keyed by their own ids.
    pub(crate) fn import(
        &self,
        active: Vec<Battle>,
        archived: Vec<Battle>,
        last: BTreeMap<BattleId, BattleId>,
    ) -> Result<()> {
        let slots = active
            .into_iter()
            .map(|battle| (battle.id().clone(), Arc::new(Mutex::new(Some(battle)))))
            .collect();
        let fresh = Archive {
            battles: archived
                .into_iter()
                .map(|battle| (battle.id().clone(), battle))
                .collect(),
            last: last.into_iter().collect(),
        };
        *self.active.write()? = slots;
        *self.archive.write()? = fresh;
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("active", &self.active)
            .field("archive", &self.archive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{CoordinateError, PLACEMENT_LEN},
        game::{Fixed, ShotError, Side},
        player::AuthError,
    };

    /// Directory with two players who have both placed one ship at (0,0).
    fn setup() -> (PlayerDirectory, Uid, Uid) {
        let dir = PlayerDirectory::new();
        let a = dir.register("alice").unwrap().uid().clone();
        let b = dir.register("bob").unwrap().uid().clone();
        let mut ships = "0".repeat(PLACEMENT_LEN);
        ships.replace_range(0..1, "1");
        dir.submit_ships(&a, &ships).unwrap();
        dir.submit_ships(&b, &ships).unwrap();
        (dir, a, b)
    }

    fn registry() -> Registry {
        Registry::new(Fixed(Side::First))
    }

    #[test]
    fn find_or_create_reuses_active_battle() {
        let (dir, a, b) = setup();
        let reg = registry();
        let first = reg.find_or_create(&dir, &a, &b).unwrap();
        assert_eq!(reg.shoot(&dir, &a, &b, 5, 5), Ok(Outcome::Miss));
        let again = reg.find_or_create(&dir, &b, &a).unwrap();
        assert_eq!(first.id(), again.id());
        assert_eq!(again.shooter().uid(), &b);
        assert_eq!(reg.active_len(), Ok(1));
    }

    #[test]
    fn battle_keeps_its_own_copy_of_ships() {
        let (dir, a, b) = setup();
        let reg = registry();
        reg.find_or_create(&dir, &a, &b).unwrap();
        dir.submit_ships(&b, &"0".repeat(PLACEMENT_LEN)).unwrap();
        // bob's new empty placement doesn't apply to the running battle.
        assert_eq!(reg.shoot(&dir, &a, &b, 9, 9), Ok(Outcome::Miss));
        let battle = reg.lookup(BattleId::canonical(&a, &b).as_str()).unwrap();
        assert_eq!(battle.participant(&b).unwrap().grid().ship_cells(), 1);
    }

    #[test]
    fn out_of_range_is_checked_first() {
        let (dir, a, _) = setup();
        let reg = registry();
        let stranger = Uid::new("uid-stranger");
        assert_eq!(
            reg.shoot(&dir, &a, &stranger, 10, 0),
            Err(CoordinateError::OutOfRange { x: 10, y: 0 }.into())
        );
        assert_eq!(reg.active_len(), Ok(0));
    }

    #[test]
    fn missing_ships_are_reported() {
        let (dir, a, b) = setup();
        let c = dir.register("carol").unwrap().uid().clone();
        let reg = registry();
        assert_eq!(
            reg.shoot(&dir, &a, &c, 0, 0),
            Err(Error::ShipsNotSet { uid: c.clone() })
        );
        assert_eq!(
            reg.shoot(&dir, &c, &b, 0, 0),
            Err(Error::ShipsNotSet { uid: c.clone() })
        );
        assert_eq!(
            reg.shoot(&dir, &a, &Uid::new("uid-ghost"), 0, 0),
            Err(AuthError::UnknownPlayer {
                uid: Uid::new("uid-ghost")
            }
            .into())
        );
        assert_eq!(reg.active_len(), Ok(0));
    }

    #[test]
    fn failed_first_shots_leave_no_slots() {
        let (dir, a, b) = setup();
        let c = dir.register("carol").unwrap().uid().clone();
        let reg = registry();
        for i in 0..100 {
            let ghost = Uid::new(format!("uid-ghost{}", i));
            assert!(reg.shoot(&dir, &a, &ghost, 0, 0).is_err());
            assert!(reg.shoot(&dir, &ghost, &a, 0, 0).is_err());
        }
        assert!(reg.shoot(&dir, &a, &c, 0, 0).is_err());
        assert!(reg.find_or_create(&dir, &c, &b).is_err());
        assert_eq!(reg.active.read().unwrap().len(), 0);

        reg.find_or_create(&dir, &a, &b).unwrap();
        assert_eq!(reg.active.read().unwrap().len(), 1);
        assert_eq!(reg.active_len(), Ok(1));
    }

    #[test]
    fn self_battles_are_refused() {
        let (dir, a, _) = setup();
        let reg = registry();
        assert_eq!(
            reg.shoot(&dir, &a, &a, 0, 0),
            Err(Error::SelfBattle { uid: a.clone() })
        );
    }

    #[test]
    fn archive_continuity() {
        let (dir, a, b) = setup();
        let reg = registry();
        let canonical = BattleId::canonical(&a, &b);

        // Nothing to archive yet, and an unfinished battle is left alone.
        assert_eq!(reg.archive(&a, &b), Ok(None));
        reg.find_or_create(&dir, &a, &b).unwrap();
        assert_eq!(reg.archive(&a, &b), Ok(None));
        assert_eq!(reg.active_len(), Ok(1));

        assert_eq!(reg.shoot(&dir, &a, &b, 0, 0), Ok(Outcome::Win));
        // Until archived, the battle itself refuses further shots.
        assert_eq!(
            reg.shoot(&dir, &b, &a, 0, 0),
            Err(ShotError::BattleOver {
                winner: a.clone(),
                loser: b.clone()
            }
            .into())
        );

        let archived = reg.archive(&b, &a).unwrap().unwrap();
        assert!(archived.as_str().starts_with(canonical.as_str()));
        assert_eq!(reg.archive(&a, &b), Ok(None));
        assert_eq!(reg.active_len(), Ok(0));
        assert_eq!(reg.archived_len(), Ok(1));

        let redirected = reg.lookup(canonical.as_str()).unwrap();
        assert_eq!(redirected.id(), &archived);
        assert_eq!(redirected.winner(), Some(&a));
        assert_eq!(reg.lookup(archived.as_str()).unwrap(), redirected);

        // A fresh battle takes over the canonical id.
        let fresh = reg.find_or_create(&dir, &a, &b).unwrap();
        assert_eq!(fresh.id(), &canonical);
        assert!(fresh.is_active());
        assert!(reg.lookup(canonical.as_str()).unwrap().is_active());
    }

    #[test]
    fn archived_ids_stay_unique() {
        let (dir, a, b) = setup();
        let reg = registry();
        let mut ids = Vec::new();
        for _ in 0..3 {
            assert_eq!(reg.shoot(&dir, &a, &b, 0, 0), Ok(Outcome::Win));
            ids.push(reg.archive(&a, &b).unwrap().unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert_eq!(reg.archived_ids().unwrap(), ids);
        // The redirect points at the latest one.
        let latest = reg
            .lookup(BattleId::canonical(&a, &b).as_str())
            .unwrap();
        assert!(ids.contains(latest.id()));
    }

    #[test]
    fn unknown_ids() {
        let reg = registry();
        assert_eq!(
            reg.lookup("nope"),
            Err(Error::UnknownBattle {
                id: "nope".to_owned()
            })
        );
    }

    #[test]
    fn export_import_round_trip() {
        let (dir, a, b) = setup();
        let c = dir.register("carol").unwrap().uid().clone();
        dir.submit_ships(&c, &"1".repeat(PLACEMENT_LEN)).unwrap();
        let reg = registry();
        reg.shoot(&dir, &a, &b, 0, 0).unwrap();
        let archived = reg.archive(&a, &b).unwrap().unwrap();
        reg.shoot(&dir, &a, &c, 3, 3).unwrap();

        let (active, old, last) = reg.export().unwrap();
        let copy = registry();
        copy.import(active, old, last).unwrap();
        assert_eq!(copy.active_ids(), reg.active_ids());
        assert_eq!(copy.archived_ids(), reg.archived_ids());
        assert_eq!(
            copy.lookup(BattleId::canonical(&a, &b).as_str()).unwrap().id(),
            &archived
        );
        assert_eq!(
            copy.lookup(BattleId::canonical(&a, &c).as_str()),
            reg.lookup(BattleId::canonical(&a, &c).as_str())
        );
    }
}
