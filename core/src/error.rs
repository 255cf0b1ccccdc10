use thiserror::Error;

use crate::{CellIndex, Phase, PlayerId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell {0} is outside the board")]
    InvalidCell(CellIndex),
    #[error("Not a cell label, expected something like A1 or r30")]
    InvalidLabel,
    #[error("Not allowed during the {actual} phase")]
    WrongPhase { actual: Phase },
    #[error("At least 2 players are needed to start")]
    NotEnoughPlayers,
    #[error("Player name must not be empty")]
    EmptyName,
    #[error("Players can only join or leave in the lobby")]
    LobbyClosed,
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("The first cue must be exactly one word")]
    InvalidCue1,
    #[error("The second cue must be one or two words")]
    InvalidCue2,
    #[error("The target has not been chosen yet")]
    TargetNotChosen,
    #[error("The target was already chosen this round")]
    TargetAlreadyChosen,
    #[error("Cell {0} is not one of the offered options")]
    NotAnOption(CellIndex),
    #[error("Only the cue giver can do that")]
    NotCueGiver,
    #[error("The cue giver cannot guess")]
    CueGiverCannotGuess,
    #[error("Player {0} already guessed in this wave")]
    AlreadyGuessed(PlayerId),
    #[error("Nobody is expected to act right now")]
    NoActivePlayer,
    #[error("This command is not available in the current mode")]
    Unsupported,
    #[error("Not connected to the game server")]
    Disconnected,
}

pub type Result<T> = core::result::Result<T, GameError>;
