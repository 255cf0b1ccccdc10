use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything a player can ask of the game, whoever runs it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    AddPlayer { name: String },
    RemovePlayer { id: PlayerId },
    Start,
    ChooseTarget { index: CellIndex },
    LockCue1 { cue: String },
    LockCue2 { cue: String },
    Guess { cell: CellIndex },
    CloseWave,
    NextRound,
}

impl Command {
    pub const fn name(&self) -> &'static str {
        use Command::*;
        match self {
            AddPlayer { .. } => "add player",
            RemovePlayer { .. } => "remove player",
            Start => "start",
            ChooseTarget { .. } => "choose target",
            LockCue1 { .. } => "lock first cue",
            LockCue2 { .. } => "lock second cue",
            Guess { .. } => "guess",
            CloseWave => "close wave",
            NextRound => "next round",
        }
    }
}

/// Whoever owns the truth about the game.
///
/// A local authority applies commands on the spot and hands back the resulting snapshot. A remote one only forwards
/// them; its snapshots arrive later and are fed to [`Session::receive`].
pub trait Authority {
    fn dispatch(&mut self, command: Command) -> Result<Option<Snapshot>>;

    /// The player this authority acts for, if it knows.
    fn viewer(&self) -> Option<PlayerId> {
        None
    }

    /// Whether the session should signal the first score past [`WIN_SCORE`] as [`Effect::MatchWon`].
    fn announces_wins(&self) -> bool {
        true
    }

    fn close(&mut self) {}
}
