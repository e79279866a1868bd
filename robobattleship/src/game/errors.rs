use thiserror::Error;

use crate::player::Uid;

/// Reason why a shot was refused by a battle. Refused shots never change the battle.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ShotError {
    /// The shooter is not the player whose turn it is.
    #[error("It's not your turn to shoot, wait until your opponent shoots and shoot again")]
    NotYourTurn,

    /// The battle already has a winner.
    #[error("This battle is over. Winner - {winner}. Loser - {loser}.")]
    BattleOver { winner: Uid, loser: Uid },
}
