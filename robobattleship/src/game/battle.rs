use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    board::{Coordinate, Grid, ShotOutcome},
    game::{BattleView, FirstShooter, ShotError, Side},
    player::{Player, Uid},
    registry::BattleId,
};

/// A player taking part in a battle, together with the battle's private copy of their
/// grid.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    player: Player,
    grid: Grid,
}

impl Participant {
    /// Pair a player with the grid they will defend in this battle.
    pub fn new(player: Player, grid: Grid) -> Self {
        Self { player, grid }
    }

    /// The participating player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The participant's uid.
    pub fn uid(&self) -> &Uid {
        self.player.uid()
    }

    /// The battle's copy of the participant's grid, including shots fired at it.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// Whether a battle is still being fought.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Finished { winner: Uid, loser: Uid },
}

/// Final result of a shot that the battle accepted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Nothing was hit. The turn passes to the opponent.
    Miss,
    /// A ship was hit but still has unhit cells.
    Hit,
    /// A ship was hit and sunk, but the opponent still has ships left.
    Touchdown,
    /// The opponent's last ship cell was hit. The battle is over.
    Win,
}

impl Outcome {
    /// The outcome as reported to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Miss => "miss",
            Outcome::Hit => "hit",
            Outcome::Touchdown => "touchdown",
            Outcome::Win => "win",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// State of a battle between two players.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    /// Id the battle is stored under. Changes once, when the battle is archived.
    id: BattleId,

    /// The two participants, in the order they were given at creation.
    participants: [Participant; 2],

    /// Side whose turn it is.
    shooter: Side,

    status: Status,
}

impl Battle {
    /// Start a battle between two participants. `first_shooter` decides who opens.
    pub fn new<F: FirstShooter + ?Sized>(
        id: BattleId,
        first: Participant,
        second: Participant,
        first_shooter: &F,
    ) -> Self {
        Self {
            id,
            participants: [first, second],
            shooter: first_shooter.pick(),
            status: Status::Active,
        }
    }

    /// Get the id of this battle.
    pub fn id(&self) -> &BattleId {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: BattleId) {
        self.id = id;
    }

    /// Both participants, in creation order.
    pub fn participants(&self) -> &[Participant; 2] {
        &self.participants
    }

    /// Get the participant with the given uid, if they take part in this battle.
    pub fn participant(&self, uid: &Uid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.uid() == uid)
    }

    /// The participant whose turn it is.
    pub fn shooter(&self) -> &Participant {
        &self.participants[self.shooter.index()]
    }

    /// The participant being shot at.
    pub fn opponent(&self) -> &Participant {
        &self.participants[self.shooter.opposite().index()]
    }

    /// Current status of the battle.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns true until somebody wins.
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Get the winner's uid, if the battle is over.
    pub fn winner(&self) -> Option<&Uid> {
        match &self.status {
            Status::Active => None,
            Status::Finished { winner, .. } => Some(winner),
        }
    }

    /// Get the loser's uid, if the battle is over.
    pub fn loser(&self) -> Option<&Uid> {
        match &self.status {
            Status::Active => None,
            Status::Finished { loser, .. } => Some(loser),
        }
    }

    /// Fire a shot from `shooter` at the opponent's grid.
    ///
    /// A hit keeps the turn with the shooter; only a miss passes it on. Emptying the
    /// opponent's grid ends the battle and reports [`Outcome::Win`] even when the same
    /// shot also sank a ship.
    pub fn shoot(&mut self, shooter: &Uid, coord: Coordinate) -> Result<Outcome, ShotError> {
        if let Status::Finished { winner, loser } = &self.status {
            return Err(ShotError::BattleOver {
                winner: winner.clone(),
                loser: loser.clone(),
            });
        }
        if self.shooter().uid() != shooter {
            return Err(ShotError::NotYourTurn);
        }

        let target = &mut self.participants[self.shooter.opposite().index()].grid;
        let mut outcome = match target.apply_shot(coord) {
            ShotOutcome::Miss => Outcome::Miss,
            ShotOutcome::Hit if target.is_sunk(coord) => Outcome::Touchdown,
            ShotOutcome::Hit => Outcome::Hit,
        };
        if target.is_defeated() {
            outcome = Outcome::Win;
            self.status = Status::Finished {
                winner: self.shooter().uid().clone(),
                loser: self.opponent().uid().clone(),
            };
        }

        if outcome == Outcome::Miss {
            self.shooter = self.shooter.opposite();
        }
        Ok(outcome)
    }

    /// Render the battle as seen by `viewer`. Unhit ships are only shown on the viewer's
    /// own grid; anonymous viewers see no unhit ships at all.
    pub fn view(&self, viewer: Option<&Uid>) -> BattleView {
        BattleView::new(self, viewer)
    }
}
