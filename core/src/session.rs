use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::*;

/// Messages an authority pushes to the session outside of [`Session::dispatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    Welcome { id: PlayerId },
    Snapshot(Snapshot),
    ServerError(String),
    Disconnected,
}

/// One game: the authority, the reconciler mirroring it and the identity of the local player.
#[derive(Debug)]
pub struct Session<A> {
    authority: A,
    reconciler: Reconciler,
    self_id: Option<PlayerId>,
    connected: bool,
}

impl<A: Authority> Session<A> {
    pub fn new(authority: A) -> Self {
        let reconciler =
            Reconciler::new(authority.viewer()).announcing_wins(authority.announces_wins());
        Self {
            authority,
            reconciler,
            self_id: None,
            connected: true,
        }
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.reconciler.snapshot()
    }

    pub fn annotations(&self) -> &Annotations {
        self.reconciler.annotations()
    }

    /// The player this session shows the game to.
    pub fn viewer(&self) -> Option<&PlayerId> {
        self.reconciler.viewer()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Validates `command` locally, hands it to the authority and reconciles any snapshot it returns at once.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Effect>> {
        if !self.connected {
            return Err(GameError::Disconnected);
        }
        let command = self.validate(command)?;
        let choice = match command {
            Command::ChooseTarget { index } => Some(index),
            _ => None,
        };

        log::debug!("Dispatching {}", command.name());
        let snapshot = self.authority.dispatch(command)?;
        if let Some(index) = choice {
            self.reconciler.choose_target_optimistic(index);
        }

        self.sync_viewer();
        Ok(match snapshot {
            Some(snapshot) => self.reconciler.apply(snapshot),
            None => Vec::new(),
        })
    }

    pub fn receive(&mut self, inbound: Inbound) -> Vec<Effect> {
        match inbound {
            Inbound::Welcome { id } => {
                log::info!("Joined as {}", id);
                self.self_id = Some(id.clone());
                self.sync_viewer();
                vec![Effect::Welcomed { id }]
            }
            Inbound::Snapshot(snapshot) => {
                if !self.connected {
                    log::debug!("Ignoring snapshot after disconnect");
                    return Vec::new();
                }
                self.sync_viewer();
                self.reconciler.apply(snapshot)
            }
            Inbound::ServerError(message) => {
                log::warn!("Server error: {}", message);
                vec![Effect::ServerError { message }]
            }
            Inbound::Disconnected => {
                if !self.connected {
                    return Vec::new();
                }
                log::info!("Connection lost");
                self.connected = false;
                vec![Effect::ConnectionLost]
            }
        }
    }

    /// Restarts the match, keeping the previous winner notice quiet until the reset shows up.
    pub fn request_new_match(&mut self) -> Result<Vec<Effect>> {
        let notice = self.reconciler.win_notice();
        self.reconciler.request_new_match();
        self.dispatch(Command::Start)
            .inspect_err(|_| self.reconciler.restore_win_notice(notice))
    }

    pub fn close(&mut self) {
        if self.connected {
            self.authority.close();
            self.connected = false;
        }
    }

    /// Rejects what the authority would reject anyway, before anything leaves the process.
    fn validate(&self, command: Command) -> Result<Command> {
        let snapshot = self.reconciler.snapshot();
        let command = match command {
            Command::LockCue1 { cue } => Command::LockCue1 {
                cue: validate_cue1(&cue)?.to_string(),
            },
            Command::LockCue2 { cue } => Command::LockCue2 {
                cue: validate_cue2(&cue)?.to_string(),
            },
            Command::Guess { cell } => {
                let board = snapshot.map_or(Board::STANDARD, |snapshot| snapshot.board);
                board.checked_index(cell)?;
                Command::Guess { cell }
            }
            Command::AddPlayer { name } if name.trim().is_empty() => {
                return Err(GameError::EmptyName);
            }
            command => command,
        };
        if let (Some(id), Some(snapshot)) = (self.self_id.as_ref(), snapshot) {
            check_turn(snapshot, id, &command)?;
        }
        Ok(command)
    }

    fn sync_viewer(&mut self) {
        let viewer = self.self_id.clone().or_else(|| self.authority.viewer());
        self.reconciler.set_viewer(viewer);
    }
}

/// Whether the player `id` may send `command` in the state `snapshot` shows.
///
/// The server applies whatever it is sent, so roles and once-per-wave guessing are enforced on this side.
fn check_turn(snapshot: &Snapshot, id: &PlayerId, command: &Command) -> Result<()> {
    let phase = snapshot.phase;
    let in_phase = |expected: Phase| {
        if phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase { actual: phase })
        }
    };
    let giver = || {
        if snapshot.is_cue_giver(id) {
            Ok(())
        } else {
            Err(GameError::NotCueGiver)
        }
    };

    match command {
        Command::ChooseTarget { index } => {
            in_phase(Phase::Cue1)?;
            giver()?;
            let options = &snapshot.select_options;
            if !options.is_empty() && !options.contains(index) {
                return Err(GameError::NotAnOption(*index));
            }
        }
        Command::LockCue1 { .. } => {
            in_phase(Phase::Cue1)?;
            giver()?;
        }
        Command::LockCue2 { .. } => {
            in_phase(Phase::Cue2)?;
            giver()?;
        }
        Command::Guess { .. } => {
            if !phase.is_guess_wave() {
                return Err(GameError::WrongPhase { actual: phase });
            }
            if snapshot.is_cue_giver(id) {
                return Err(GameError::CueGiverCannotGuess);
            }
            if snapshot.player(id).is_none() {
                return Err(GameError::UnknownPlayer(id.clone()));
            }
            if !snapshot.is_pending_guesser(id) {
                return Err(GameError::AlreadyGuessed(id.clone()));
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    /// Forwards nothing, just remembers what it was asked.
    #[derive(Debug, Default)]
    struct Recorder {
        sent: Vec<Command>,
        closed: bool,
        refuse: Option<GameError>,
    }

    impl Authority for Recorder {
        fn dispatch(&mut self, command: Command) -> Result<Option<Snapshot>> {
            if let Some(err) = &self.refuse {
                return Err(err.clone());
            }
            self.sent.push(command);
            Ok(None)
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn remote() -> Session<Recorder> {
        Session::new(Recorder::default())
    }

    fn round_one(giver: &str) -> Snapshot {
        Snapshot {
            players: vec![
                Player::new("p1".into(), "Ann"),
                Player::new("p2".into(), "Ben"),
            ],
            round: 1,
            phase: Phase::Cue1,
            cue_giver: Some(giver.into()),
            select_options: smallvec![5, 6, 7, 8],
            ..Default::default()
        }
    }

    #[test]
    fn invalid_cues_never_reach_the_authority() {
        let mut session = remote();
        assert_eq!(
            session.dispatch(Command::LockCue1 {
                cue: "two words".into()
            }),
            Err(GameError::InvalidCue1)
        );
        assert_eq!(
            session.dispatch(Command::LockCue2 { cue: "".into() }),
            Err(GameError::InvalidCue2)
        );
        assert!(session.authority().sent.is_empty());

        session
            .dispatch(Command::LockCue1 {
                cue: "  teal ".into(),
            })
            .unwrap();
        assert_eq!(
            session.authority().sent,
            vec![Command::LockCue1 { cue: "teal".into() }]
        );
    }

    #[test]
    fn welcome_sets_the_viewer() {
        let mut session = remote();
        let effects = session.receive(Inbound::Welcome { id: "p1".into() });
        assert_eq!(effects, vec![Effect::Welcomed { id: "p1".into() }]);
        assert_eq!(session.viewer(), Some(&PlayerId::from("p1")));

        let effects = session.receive(Inbound::Snapshot(round_one("p1")));
        assert!(effects.contains(&Effect::PickTarget {
            options: smallvec![5, 6, 7, 8]
        }));
    }

    #[test]
    fn giver_cannot_guess() {
        let mut session = remote();
        session.receive(Inbound::Welcome { id: "p1".into() });
        let mut snapshot = round_one("p1");
        snapshot.phase = Phase::Guess1;
        session.receive(Inbound::Snapshot(snapshot));

        assert_eq!(
            session.dispatch(Command::Guess { cell: 3 }),
            Err(GameError::CueGiverCannotGuess)
        );
        assert_eq!(
            session.dispatch(Command::Guess { cell: 600 }),
            Err(GameError::InvalidCell(600))
        );
        assert!(session.authority().sent.is_empty());
    }

    fn joined_as(id: &str, snapshot: Snapshot) -> Session<Recorder> {
        let mut session = remote();
        session.receive(Inbound::Welcome { id: id.into() });
        session.receive(Inbound::Snapshot(snapshot));
        session
    }

    #[test]
    fn one_guess_per_wave() {
        let mut snapshot = round_one("p1");
        snapshot.phase = Phase::Guess1;
        snapshot.guesses1 = vec![Guess::new("p2".into(), 10)];
        let mut session = joined_as("p2", snapshot.clone());

        assert_eq!(
            session.dispatch(Command::Guess { cell: 11 }),
            Err(GameError::AlreadyGuessed("p2".into()))
        );
        assert!(session.authority().sent.is_empty());

        snapshot.phase = Phase::Guess2;
        session.receive(Inbound::Snapshot(snapshot));
        session.dispatch(Command::Guess { cell: 11 }).unwrap();
        assert_eq!(session.authority().sent, vec![Command::Guess { cell: 11 }]);
    }

    #[test]
    fn guesses_wait_for_a_wave() {
        let mut snapshot = round_one("p1");
        snapshot.phase = Phase::Cue2;
        let mut session = joined_as("p2", snapshot);

        assert_eq!(
            session.dispatch(Command::Guess { cell: 11 }),
            Err(GameError::WrongPhase {
                actual: Phase::Cue2
            })
        );
        assert!(session.authority().sent.is_empty());
    }

    #[test]
    fn spectators_cannot_guess() {
        let mut snapshot = round_one("p1");
        snapshot.phase = Phase::Guess1;
        let mut session = joined_as("p9", snapshot);

        assert_eq!(
            session.dispatch(Command::Guess { cell: 11 }),
            Err(GameError::UnknownPlayer("p9".into()))
        );
    }

    #[test]
    fn only_the_giver_picks_and_cues() {
        let mut session = joined_as("p2", round_one("p1"));

        assert_eq!(
            session.dispatch(Command::ChooseTarget { index: 5 }),
            Err(GameError::NotCueGiver)
        );
        assert_eq!(
            session.dispatch(Command::LockCue1 { cue: "sky".into() }),
            Err(GameError::NotCueGiver)
        );
        assert!(session.authority().sent.is_empty());
        assert_eq!(session.reconciler().pending_choice(), None);
    }

    #[test]
    fn giver_commands_follow_the_phase() {
        let mut session = joined_as("p1", round_one("p1"));

        assert_eq!(
            session.dispatch(Command::LockCue2 {
                cue: "deep sea".into()
            }),
            Err(GameError::WrongPhase {
                actual: Phase::Cue1
            })
        );
        assert_eq!(
            session.dispatch(Command::ChooseTarget { index: 9 }),
            Err(GameError::NotAnOption(9))
        );
        assert!(session.authority().sent.is_empty());

        session.dispatch(Command::ChooseTarget { index: 8 }).unwrap();
        session.dispatch(Command::LockCue1 { cue: "sky".into() }).unwrap();
        assert_eq!(session.authority().sent.len(), 2);
    }

    #[test]
    fn failed_new_match_request_keeps_the_win_notice() {
        let mut snapshot = round_one("p1");
        snapshot.round = 4;
        snapshot.players[1].score = 9;
        let mut session = joined_as("p1", snapshot.clone());

        session.authority.refuse = Some(GameError::Disconnected);
        assert_eq!(session.request_new_match(), Err(GameError::Disconnected));

        snapshot.phase = Phase::Reveal;
        snapshot.players[1].score = 15;
        let effects = session.receive(Inbound::Snapshot(snapshot));
        assert!(effects.iter().any(|e| matches!(e, Effect::MatchWon { .. })));
    }

    #[test]
    fn remote_target_choice_is_shown_optimistically() {
        let mut session = remote();
        session.receive(Inbound::Welcome { id: "p1".into() });
        session.receive(Inbound::Snapshot(round_one("p1")));

        let effects = session.dispatch(Command::ChooseTarget { index: 6 }).unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.reconciler().pending_choice(), Some(6));
        assert_eq!(session.annotations().marker(6), Marker::SELECTED);
    }

    #[test]
    fn server_errors_are_surfaced_verbatim() {
        let mut session = remote();
        let effects = session.receive(Inbound::ServerError("room is full".into()));
        assert_eq!(
            effects,
            vec![Effect::ServerError {
                message: "room is full".into()
            }]
        );
    }

    #[test]
    fn disconnect_freezes_the_state() {
        let mut session = remote();
        session.receive(Inbound::Snapshot(round_one("p1")));
        assert_eq!(
            session.receive(Inbound::Disconnected),
            vec![Effect::ConnectionLost]
        );
        assert!(session.receive(Inbound::Disconnected).is_empty());

        assert!(session.receive(Inbound::Snapshot(Snapshot::default())).is_empty());
        assert_eq!(session.snapshot().map(|s| s.round), Some(1));
        assert_eq!(session.dispatch(Command::Start), Err(GameError::Disconnected));
    }

    #[test]
    fn close_tears_down_the_authority() {
        let mut session = remote();
        session.close();
        assert!(session.authority().closed);
        assert!(!session.is_connected());
    }

    #[test]
    fn local_authority_reconciles_synchronously() {
        let engine = OfflineEngine::new(Board::STANDARD, FixedTargetPicker::new([1, 2, 3, 4]));
        let mut session = Session::new(engine);
        for name in ["Ann", "Ben"] {
            session
                .dispatch(Command::AddPlayer { name: name.into() })
                .unwrap();
        }

        let effects = session.dispatch(Command::Start).unwrap();
        assert!(effects.contains(&Effect::RoundStarted { round: 1 }));
        assert_eq!(session.snapshot().map(|s| s.phase), Some(Phase::Cue1));
        // Ben holds the device to pick the target
        assert_eq!(session.viewer(), Some(&PlayerId::from("p2")));

        session.dispatch(Command::ChooseTarget { index: 2 }).unwrap();
        assert_eq!(session.viewer(), Some(&PlayerId::from("p1")));
        assert_eq!(session.annotations().marker(2), Marker::SELECTED);
    }

    #[test]
    fn offline_play_never_announces_a_winner() {
        let engine = OfflineEngine::new(Board::STANDARD, FixedTargetPicker::new([1, 2, 3, 4]));
        let mut session = Session::new(engine);
        for name in ["Ann", "Ben"] {
            session
                .dispatch(Command::AddPlayer { name: name.into() })
                .unwrap();
        }
        session.dispatch(Command::Start).unwrap();

        let mut effects = Vec::new();
        for _ in 0..10 {
            for command in [
                Command::ChooseTarget { index: 1 },
                Command::LockCue1 { cue: "sky".into() },
                Command::Guess { cell: 1 },
                Command::LockCue2 { cue: "sky".into() },
                Command::Guess { cell: 1 },
                Command::NextRound,
            ] {
                effects.extend(session.dispatch(command).unwrap());
            }
        }

        assert!(session.authority().winner().is_some());
        assert!(
            !effects
                .iter()
                .any(|e| matches!(e, Effect::MatchWon { .. } | Effect::MatchReset))
        );
    }
}
