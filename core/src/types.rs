use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Row-major cell index on the board.
pub type CellIndex = u16;

/// Single coordinate axis used for board rows/columns and positions.
pub type Coord = u8;

/// Two-dimensional coordinates `(row, col)`.
pub type RowCol = (Coord, Coord);

/// Round counter, `0` until the first round starts.
pub type RoundNumber = u32;

/// Accumulated points of a player.
pub type Score = u32;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for RowCol {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Opaque, stable player identifier. Assigned locally offline and by the server online.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub score: Score,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
        }
    }
}

/// Phases of a round in their normal order of progression.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    #[serde(alias = "setup")]
    Lobby,
    Cue1,
    Guess1,
    Cue2,
    Guess2,
    Reveal,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        use Phase::*;
        match self {
            Lobby => "lobby",
            Cue1 => "cue1",
            Guess1 => "guess1",
            Cue2 => "cue2",
            Guess2 => "guess2",
            Reveal => "reveal",
        }
    }

    /// Parses the wire name of a phase, `setup` being an alias of `lobby`.
    pub fn from_wire(name: &str) -> Option<Self> {
        use Phase::*;
        Some(match name {
            "lobby" | "setup" => Lobby,
            "cue1" => Cue1,
            "guess1" => Guess1,
            "cue2" => Cue2,
            "guess2" => Guess2,
            "reveal" => Reveal,
            _ => return None,
        })
    }

    /// Any phase between the start of a round and its reveal, inclusive.
    pub const fn is_in_round(self) -> bool {
        !matches!(self, Self::Lobby)
    }

    pub const fn is_guess_wave(self) -> bool {
        matches!(self, Self::Guess1 | Self::Guess2)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
