//! Read-only views of a battle that are safe to hand to any viewer.

use serde::Serialize;

use crate::{
    board::{Cell, SIZE},
    game::{Battle, Participant},
    player::Uid,
};

/// A cell as shown to a viewer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewCell {
    /// Not shot, and either open water or a ship the viewer may not see.
    Water,
    /// An unhit ship on the viewer's own grid.
    Ship,
    Hit,
    Miss,
}

/// One participant's grid as shown to a viewer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct BoardView {
    pub uid: Uid,
    pub name: String,
    /// Whether unhit ships are shown on this board.
    pub revealed: bool,
    pub cells: [[ViewCell; SIZE]; SIZE],
}

impl BoardView {
    fn new(participant: &Participant, viewer: Option<&Uid>) -> Self {
        let revealed = viewer == Some(participant.uid());
        let mut cells = [[ViewCell::Water; SIZE]; SIZE];
        for (row, out) in participant.grid().rows().zip(cells.iter_mut()) {
            for (cell, view) in row.iter().zip(out.iter_mut()) {
                *view = match cell {
                    Cell::Empty => ViewCell::Water,
                    Cell::Ship if revealed => ViewCell::Ship,
                    Cell::Ship => ViewCell::Water,
                    Cell::Hit => ViewCell::Hit,
                    Cell::Miss => ViewCell::Miss,
                };
            }
        }
        Self {
            uid: participant.uid().clone(),
            name: participant.player().name().to_owned(),
            revealed,
            cells,
        }
    }
}

/// A whole battle as shown to a viewer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct BattleView {
    pub id: String,
    pub active: bool,
    /// Whose turn it is. Meaningless once the battle is over.
    pub shooter: Uid,
    pub winner: Option<Uid>,
    pub loser: Option<Uid>,
    pub boards: [BoardView; 2],
}

impl BattleView {
    pub(super) fn new(battle: &Battle, viewer: Option<&Uid>) -> Self {
        let [first, second] = battle.participants();
        Self {
            id: battle.id().as_str().to_owned(),
            active: battle.is_active(),
            shooter: battle.shooter().uid().clone(),
            winner: battle.winner().cloned(),
            loser: battle.loser().cloned(),
            boards: [BoardView::new(first, viewer), BoardView::new(second, viewer)],
        }
    }
}
