use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// One recorded guess. Servers may send bare cells, in which case the guesser is unknown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    pub player: Option<PlayerId>,
    pub cell: CellIndex,
}

impl Guess {
    pub fn new(player: PlayerId, cell: CellIndex) -> Self {
        Self {
            player: Some(player),
            cell,
        }
    }

    pub fn anonymous(cell: CellIndex) -> Self {
        Self { player: None, cell }
    }

    pub fn is_by(&self, id: &PlayerId) -> bool {
        self.player.as_ref() == Some(id)
    }
}

/// Full game state as pushed by an authority. Every field is optional on the wire, so anything missing is empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub room: Option<String>,
    pub board: Board,
    pub players: Vec<Player>,
    pub round: RoundNumber,
    pub phase: Phase,
    pub cue_giver: Option<PlayerId>,
    pub cue1: Option<String>,
    pub cue2: Option<String>,
    pub target: Option<CellIndex>,
    pub select_options: Candidates,
    pub guesses1: Vec<Guess>,
    pub guesses2: Vec<Guess>,
    pub last_guesses: Vec<Guess>,
}

impl Snapshot {
    /// Captures everything the machine knows, the target included.
    pub fn from_machine(machine: &RoundMachine) -> Self {
        let guesses = |list: Vec<(PlayerId, CellIndex)>| {
            list.into_iter()
                .map(|(player, cell)| Guess::new(player, cell))
                .collect::<Vec<_>>()
        };
        let guesses2 = guesses(machine.guesses2());

        Self {
            room: None,
            board: *machine.board(),
            players: machine.players().to_vec(),
            round: machine.round(),
            phase: machine.phase(),
            cue_giver: machine.cue_giver().map(|player| player.id.clone()),
            cue1: machine.cue1().map(Into::into),
            cue2: machine.cue2().map(Into::into),
            target: machine.target(),
            select_options: machine.options().iter().copied().collect(),
            guesses1: guesses(machine.guesses1()),
            last_guesses: guesses2.clone(),
            guesses2,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    pub fn player_name<'a>(&'a self, id: &'a PlayerId) -> &'a str {
        self.player(id)
            .map_or(id.as_str(), |player| player.name.as_str())
    }

    pub fn is_cue_giver(&self, id: &PlayerId) -> bool {
        self.cue_giver.as_ref() == Some(id)
    }

    pub fn in_round(&self) -> bool {
        self.phase.is_in_round()
    }

    pub fn guess1_of(&self, id: &PlayerId) -> Option<CellIndex> {
        find_guess(&self.guesses1, id)
    }

    pub fn guess2_of(&self, id: &PlayerId) -> Option<CellIndex> {
        find_guess(&self.guesses2, id)
    }

    /// Whether `id` is still expected to guess in the running wave.
    pub fn is_pending_guesser(&self, id: &PlayerId) -> bool {
        let wave = match self.phase {
            Phase::Guess1 => &self.guesses1,
            Phase::Guess2 => &self.guesses2,
            _ => return false,
        };
        self.player(id).is_some() && !self.is_cue_giver(id) && find_guess(wave, id).is_none()
    }

    /// The first player, in player order, whose score reached `threshold`.
    pub fn winner(&self, threshold: Score) -> Option<&Player> {
        self.players.iter().find(|player| player.score >= threshold)
    }

    /// True right after a match (re)started: nobody scored yet and the first round has not gone anywhere.
    pub fn is_fresh_match(&self) -> bool {
        self.players.iter().all(|player| player.score == 0)
            && self.round <= 1
            && matches!(self.phase, Phase::Lobby | Phase::Cue1)
    }

    /// Scores the second wave against the target, once it is known.
    pub fn reveal_summary(&self) -> Option<RevealSummary> {
        let target = self.target.filter(|&target| self.board.contains(target))?;
        let guesses = self.guesses2.iter().filter_map(|guess| {
            let player = guess.player.as_ref()?;
            (!self.is_cue_giver(player)).then_some((player, guess.cell))
        });
        Some(score_guesses(&self.board, target, guesses))
    }
}

fn find_guess(guesses: &[Guess], id: &PlayerId) -> Option<CellIndex> {
    guesses
        .iter()
        .find(|guess| guess.is_by(id))
        .map(|guess| guess.cell)
}
