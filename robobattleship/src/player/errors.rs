use thiserror::Error;

use crate::player::Uid;

/// Reason why a player could not be registered.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RegisterError {
    #[error("Player name can't be empty")]
    EmptyName,
    #[error("Player name can't be shorter than {min} characters")]
    NameTooShort { min: usize },
    #[error("Player name can't be longer than {max} characters")]
    NameTooLong { max: usize },
    #[error("Player with name '{name}' is already registered, try choosing a different name")]
    NameTaken { name: String },
}

/// Reason why a player's identity could not be established.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AuthError {
    #[error("Player uid can't be empty")]
    MissingUid,
    #[error("Player secret can't be empty")]
    MissingSecret,
    #[error("Player with uid '{uid}' is not registered on the server")]
    UnknownPlayer { uid: Uid },
    #[error("Invalid secret for player '{uid}'")]
    BadSecret { uid: Uid },
}
