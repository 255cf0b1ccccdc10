use alloc::vec::Vec;

use crate::*;

/// Pass-and-play game on one shared device: owns the round machine and the target picker.
///
/// The engine tracks whose turn it is. Only guesses are attributed to that player; every other transition is
/// trusted to whoever holds the device.
#[derive(Clone, Debug)]
pub struct OfflineEngine<P = RandomTargetPicker> {
    machine: RoundMachine,
    picker: P,
}

impl OfflineEngine {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Board::STANDARD, RandomTargetPicker::new(seed))
    }
}

impl<P: TargetPicker> OfflineEngine<P> {
    pub fn new(board: Board, picker: P) -> Self {
        Self {
            machine: RoundMachine::new(board),
            picker,
        }
    }

    pub fn machine(&self) -> &RoundMachine {
        &self.machine
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn players(&self) -> &[Player] {
        self.machine.players()
    }

    pub fn leader(&self) -> Option<&Player> {
        self.machine.leader()
    }

    /// Offline play never stops on its own; callers decide what to do with a winner.
    pub fn winner(&self) -> Option<&Player> {
        self.machine.winner()
    }

    /// The player expected to act next, `None` in the lobby and at reveal.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_index()
            .and_then(|index| self.machine.players().get(index))
    }

    fn current_index(&self) -> Option<usize> {
        let machine = &self.machine;
        match machine.phase() {
            Phase::Lobby | Phase::Reveal => None,
            Phase::Cue1 if machine.target().is_none() => Some(machine.chooser_index()),
            Phase::Cue1 | Phase::Cue2 => Some(machine.cue_giver_index()),
            Phase::Guess1 | Phase::Guess2 => self.next_guesser(),
        }
    }

    /// Round-robin from the seat after the cue giver, skipping anyone who already guessed this wave.
    fn next_guesser(&self) -> Option<usize> {
        let giver = self.machine.cue_giver_index();
        let count = self.machine.players().len();
        let pending: Vec<usize> = self
            .machine
            .pending_guessers()
            .map(|(index, _)| index)
            .collect();

        (1..count)
            .map(|offset| (giver + offset) % count)
            .find(|index| pending.contains(index))
    }

    pub fn add_player(&mut self, name: &str) -> Result<PlayerId> {
        self.machine.add_player(name)
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Result<Player> {
        self.machine.remove_player(id)
    }

    pub fn start(&mut self) -> Result<Phase> {
        let options = self.picker.candidates(self.machine.board());
        let phase = self.machine.start(options)?;
        log::info!("Match started with {} players", self.machine.players().len());
        Ok(phase)
    }

    pub fn choose_target(&mut self, index: CellIndex) -> Result<Phase> {
        self.machine.choose_target(index)
    }

    pub fn lock_cue1(&mut self, cue: &str) -> Result<Phase> {
        self.machine.lock_cue1(cue)
    }

    pub fn lock_cue2(&mut self, cue: &str) -> Result<Phase> {
        self.machine.lock_cue2(cue)
    }

    /// Records a guess for the current player.
    pub fn guess(&mut self, cell: CellIndex) -> Result<Phase> {
        if !self.machine.phase().is_guess_wave() {
            return Err(GameError::WrongPhase {
                actual: self.machine.phase(),
            });
        }
        let player = self
            .current_player()
            .map(|player| player.id.clone())
            .ok_or(GameError::NoActivePlayer)?;
        self.machine.guess(&player, cell)
    }

    pub fn close_wave(&mut self) -> Result<Phase> {
        self.machine.close_wave()
    }

    pub fn next_round(&mut self) -> Result<Phase> {
        let options = self.picker.candidates(self.machine.board());
        self.machine.next_round(options)
    }

    pub fn apply(&mut self, command: Command) -> Result<Phase> {
        use Command::*;
        match command {
            AddPlayer { name } => self.add_player(&name).map(|_| self.phase()),
            RemovePlayer { id } => self.remove_player(&id).map(|_| self.phase()),
            Start => self.start(),
            ChooseTarget { index } => self.choose_target(index),
            LockCue1 { cue } => self.lock_cue1(&cue),
            LockCue2 { cue } => self.lock_cue2(&cue),
            Guess { cell } => self.guess(cell),
            CloseWave => self.close_wave(),
            NextRound => self.next_round(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_machine(&self.machine)
    }
}

impl<P: TargetPicker> Authority for OfflineEngine<P> {
    fn dispatch(&mut self, command: Command) -> Result<Option<Snapshot>> {
        self.apply(command)?;
        Ok(Some(self.snapshot()))
    }

    /// Whoever holds the shared device right now.
    fn viewer(&self) -> Option<PlayerId> {
        self.current_player().map(|player| player.id.clone())
    }

    /// Offline play shows `leader()`/`winner()` instead.
    fn announces_wins(&self) -> bool {
        false
    }
}
