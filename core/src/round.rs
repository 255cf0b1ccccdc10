use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fewest players a match can start with.
pub const MIN_PLAYERS: usize = 2;

/// Trims a first cue and checks that it is exactly one word.
pub fn validate_cue1(cue: &str) -> Result<&str> {
    let cue = cue.trim();
    if cue.split_whitespace().count() == 1 {
        Ok(cue)
    } else {
        Err(GameError::InvalidCue1)
    }
}

/// Trims a second cue and checks that it has one or two words.
pub fn validate_cue2(cue: &str) -> Result<&str> {
    let cue = cue.trim();
    if matches!(cue.split_whitespace().count(), 1 | 2) {
        Ok(cue)
    } else {
        Err(GameError::InvalidCue2)
    }
}

/// The round/phase state machine: `lobby → cue1 → guess1 → cue2 → guess2 → reveal → cue1 …`.
///
/// Every operation validates before it mutates, so a rejected action leaves the state untouched. The machine does
/// not know who is sitting in front of the screen; callers decide who may trigger which transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundMachine {
    board: Board,
    players: Vec<Player>,
    round: RoundNumber,
    cue_giver: usize,
    phase: Phase,
    options: Candidates,
    target: Option<CellIndex>,
    cue1: Option<String>,
    cue2: Option<String>,
    guesses1: HashMap<PlayerId, CellIndex>,
    guesses2: HashMap<PlayerId, CellIndex>,
    last_reveal: Option<RevealSummary>,
    next_player_seq: u32,
}

impl RoundMachine {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            players: Vec::new(),
            round: 0,
            cue_giver: 0,
            phase: Phase::Lobby,
            options: Candidates::new(),
            target: None,
            cue1: None,
            cue2: None,
            guesses1: HashMap::new(),
            guesses2: HashMap::new(),
            last_reveal: None,
            next_player_seq: 1,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    pub fn round(&self) -> RoundNumber {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cue_giver_index(&self) -> usize {
        self.cue_giver
    }

    pub fn cue_giver(&self) -> Option<&Player> {
        self.phase
            .is_in_round()
            .then(|| self.players.get(self.cue_giver))
            .flatten()
    }

    /// By convention the player after the cue giver picks the target.
    pub fn chooser_index(&self) -> usize {
        (self.cue_giver + 1) % self.players.len().max(1)
    }

    pub fn options(&self) -> &[CellIndex] {
        &self.options
    }

    pub fn target(&self) -> Option<CellIndex> {
        self.target
    }

    pub fn cue1(&self) -> Option<&str> {
        self.cue1.as_deref()
    }

    pub fn cue2(&self) -> Option<&str> {
        self.cue2.as_deref()
    }

    pub fn last_reveal(&self) -> Option<&RevealSummary> {
        self.last_reveal.as_ref()
    }

    /// First wave guesses in player order.
    pub fn guesses1(&self) -> Vec<(PlayerId, CellIndex)> {
        self.ordered(&self.guesses1)
    }

    /// Second wave guesses in player order.
    pub fn guesses2(&self) -> Vec<(PlayerId, CellIndex)> {
        self.ordered(&self.guesses2)
    }

    pub fn is_cue_giver(&self, id: &PlayerId) -> bool {
        self.cue_giver().is_some_and(|giver| &giver.id == id)
    }

    pub fn has_guessed(&self, id: &PlayerId) -> bool {
        self.current_wave().is_some_and(|guesses| guesses.contains_key(id))
    }

    /// Players other than the cue giver, in player order, with their positions.
    pub fn guessers(&self) -> impl Iterator<Item = (usize, &Player)> {
        let giver = self.cue_giver;
        self.players
            .iter()
            .enumerate()
            .filter(move |&(i, _)| i != giver)
    }

    /// Guessers still expected to act in the current wave.
    pub fn pending_guessers(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.guessers()
            .filter(|(_, player)| !self.has_guessed(&player.id))
    }

    /// Highest scoring player, the earliest in player order on ties.
    pub fn leader(&self) -> Option<&Player> {
        self.players
            .iter()
            .reduce(|best, player| if player.score > best.score { player } else { best })
    }

    /// The leader, once they have reached [`WIN_SCORE`].
    pub fn winner(&self) -> Option<&Player> {
        self.leader().filter(|player| player.score >= WIN_SCORE)
    }

    pub fn add_player(&mut self, name: &str) -> Result<PlayerId> {
        self.check_phase(Phase::Lobby)
            .map_err(|_| GameError::LobbyClosed)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }

        let id = PlayerId::new(format!("p{}", self.next_player_seq));
        self.next_player_seq += 1;
        self.players.push(Player::new(id.clone(), name));
        log::debug!("Player {} joined as {}", name, id);
        Ok(id)
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Result<Player> {
        self.check_phase(Phase::Lobby)
            .map_err(|_| GameError::LobbyClosed)?;
        let position = self.position_of(id)?;
        let player = self.players.remove(position);
        log::debug!("Player {} left", player.name);
        Ok(player)
    }

    /// Starts a new match, also when one is already running: scores reset and the first player gives cues.
    pub fn start(&mut self, options: Candidates) -> Result<Phase> {
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        for player in &mut self.players {
            player.score = 0;
        }
        self.round = 1;
        self.cue_giver = 0;
        self.last_reveal = None;
        self.begin_round(options);
        Ok(self.phase)
    }

    pub fn choose_target(&mut self, index: CellIndex) -> Result<Phase> {
        self.check_phase(Phase::Cue1)?;
        if self.target.is_some() {
            return Err(GameError::TargetAlreadyChosen);
        }
        if !self.options.contains(&index) {
            return Err(GameError::NotAnOption(index));
        }

        self.target = Some(index);
        log::debug!("Round {} target chosen", self.round);
        Ok(self.phase)
    }

    pub fn lock_cue1(&mut self, cue: &str) -> Result<Phase> {
        self.check_phase(Phase::Cue1)?;
        let cue = validate_cue1(cue)?;
        if self.target.is_none() {
            return Err(GameError::TargetNotChosen);
        }

        self.cue1 = Some(cue.to_string());
        self.guesses1.clear();
        self.enter(Phase::Guess1);
        Ok(self.phase)
    }

    pub fn lock_cue2(&mut self, cue: &str) -> Result<Phase> {
        self.check_phase(Phase::Cue2)?;
        let cue = validate_cue2(cue)?;

        self.cue2 = Some(cue.to_string());
        self.guesses2.clear();
        self.enter(Phase::Guess2);
        Ok(self.phase)
    }

    /// Records one guess; the wave closes on its own once every guesser has acted.
    pub fn guess(&mut self, player: &PlayerId, cell: CellIndex) -> Result<Phase> {
        if !self.phase.is_guess_wave() {
            return Err(GameError::WrongPhase { actual: self.phase });
        }
        let cell = self.board.checked_index(cell)?;
        let position = self.position_of(player)?;
        if position == self.cue_giver {
            return Err(GameError::CueGiverCannotGuess);
        }
        if self.has_guessed(player) {
            return Err(GameError::AlreadyGuessed(player.clone()));
        }

        let wave = match self.phase {
            Phase::Guess1 => &mut self.guesses1,
            _ => &mut self.guesses2,
        };
        wave.insert(player.clone(), cell);
        log::debug!("{} guessed {} in {}", player, self.board.cell_label(cell), self.phase);

        if self.pending_guessers().next().is_none() {
            self.close_wave()?;
        }
        Ok(self.phase)
    }

    /// Ends the current guess wave early. Guessers who did not act carry no guess for it.
    pub fn close_wave(&mut self) -> Result<Phase> {
        match self.phase {
            Phase::Guess1 => self.enter(Phase::Cue2),
            Phase::Guess2 => self.reveal()?,
            actual => return Err(GameError::WrongPhase { actual }),
        }
        Ok(self.phase)
    }

    pub fn next_round(&mut self, options: Candidates) -> Result<Phase> {
        self.check_phase(Phase::Reveal)?;

        self.round += 1;
        self.cue_giver = (self.cue_giver + 1) % self.players.len().max(1);
        self.begin_round(options);
        Ok(self.phase)
    }

    fn begin_round(&mut self, options: Candidates) {
        debug_assert!(options.iter().all(|&index| self.board.contains(index)));
        self.options = options;
        self.target = None;
        self.cue1 = None;
        self.cue2 = None;
        self.guesses1.clear();
        self.guesses2.clear();
        self.enter(Phase::Cue1);
    }

    /// Scores every guesser's second guess against the target. First wave guesses never score.
    fn reveal(&mut self) -> Result<()> {
        let target = self.target.ok_or(GameError::TargetNotChosen)?;

        let guesses: Vec<_> = self
            .guessers()
            .filter_map(|(_, player)| {
                self.guesses2
                    .get(&player.id)
                    .map(|&cell| (&player.id, cell))
            })
            .collect();
        let summary = score_guesses(&self.board, target, guesses);

        for award in &summary.awards {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == award.player) {
                player.score += award.points;
                log::info!(
                    "{}: distance {}, +{} points ({})",
                    player.name,
                    award.distance,
                    award.points,
                    self.board.cell_label(award.guess)
                );
            }
        }

        self.last_reveal = Some(summary);
        self.enter(Phase::Reveal);
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("Round {}: {} -> {}", self.round, self.phase, phase);
        self.phase = phase;
    }

    fn current_wave(&self) -> Option<&HashMap<PlayerId, CellIndex>> {
        match self.phase {
            Phase::Guess1 => Some(&self.guesses1),
            Phase::Guess2 => Some(&self.guesses2),
            _ => None,
        }
    }

    fn ordered(&self, guesses: &HashMap<PlayerId, CellIndex>) -> Vec<(PlayerId, CellIndex)> {
        self.players
            .iter()
            .filter_map(|player| guesses.get(&player.id).map(|&cell| (player.id.clone(), cell)))
            .collect()
    }

    fn position_of(&self, id: &PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|player| &player.id == id)
            .ok_or_else(|| GameError::UnknownPlayer(id.clone()))
    }

    fn check_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase { actual: self.phase })
        }
    }
}

impl Default for RoundMachine {
    fn default() -> Self {
        Self::new(Board::STANDARD)
    }
}
