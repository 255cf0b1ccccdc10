use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Something the presentation layer should react to, produced by comparing two snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Welcomed { id: PlayerId },
    RoundStarted { round: RoundNumber },
    PhaseChanged { from: Option<Phase>, to: Phase },
    Cue1Given { cue: String },
    Cue2Given { cue: String },
    /// The viewer, as cue giver, sees their confirmed target.
    TargetChosen { index: CellIndex },
    /// The viewer, as cue giver, must pick one of these.
    PickTarget { options: Candidates },
    Revealed { summary: RevealSummary },
    MatchWon { player: PlayerId, name: String, score: Score },
    MatchReset,
    ServerError { message: String },
    ConnectionLost,
}

/// Effects of moving from `prev` to `next` as seen by `viewer`.
pub fn diff(prev: Option<&Snapshot>, next: &Snapshot, viewer: Option<&PlayerId>) -> Vec<Effect> {
    let mut effects = Vec::new();
    // earlier state of the same round, if any
    let earlier = prev.filter(|prev| prev.round == next.round);
    let is_giver = viewer.is_some_and(|id| next.is_cue_giver(id));

    if next.in_round() && earlier.is_none_or(|prev| !prev.in_round()) {
        effects.push(Effect::RoundStarted { round: next.round });
    }

    let from = prev.map(|prev| prev.phase);
    if from != Some(next.phase) {
        effects.push(Effect::PhaseChanged {
            from,
            to: next.phase,
        });
    }

    if let Some(cue) = next.cue1.as_ref()
        && earlier.and_then(|prev| prev.cue1.as_ref()) != Some(cue)
    {
        effects.push(Effect::Cue1Given { cue: cue.clone() });
    }
    if let Some(cue) = next.cue2.as_ref()
        && earlier.and_then(|prev| prev.cue2.as_ref()) != Some(cue)
    {
        effects.push(Effect::Cue2Given { cue: cue.clone() });
    }

    if is_giver
        && next.phase != Phase::Reveal
        && let Some(index) = next.target
        && earlier.is_none_or(|prev| prev.target.is_none())
    {
        effects.push(Effect::TargetChosen { index });
    }

    if should_pick(next, viewer) && !earlier.is_some_and(|prev| should_pick(prev, viewer)) {
        effects.push(Effect::PickTarget {
            options: next.select_options.clone(),
        });
    }

    if next.phase == Phase::Reveal
        && earlier.is_none_or(|prev| prev.phase != Phase::Reveal)
        && let Some(summary) = next.reveal_summary()
    {
        effects.push(Effect::Revealed { summary });
    }

    effects
}

/// The cue giver still has to pick among offered options.
fn should_pick(snapshot: &Snapshot, viewer: Option<&PlayerId>) -> bool {
    snapshot.phase == Phase::Cue1
        && snapshot.target.is_none()
        && !snapshot.select_options.is_empty()
        && viewer.is_some_and(|id| snapshot.is_cue_giver(id))
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum WinNotice {
    /// Fires on the next winning snapshot.
    #[default]
    Armed,
    Shown,
    /// A new match was requested; wait for the server to confirm it.
    Suppressed,
}

/// Target picked locally before the authority confirmed it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct PendingChoice {
    round: RoundNumber,
    index: CellIndex,
}

/// Mirrors authoritative snapshots into annotations and effects. Snapshots are last-write-wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reconciler {
    viewer: Option<PlayerId>,
    snapshot: Option<Snapshot>,
    annotations: Annotations,
    pending_choice: Option<PendingChoice>,
    win_notice: WinNotice,
    announce_wins: bool,
}

impl Reconciler {
    pub fn new(viewer: Option<PlayerId>) -> Self {
        Self {
            viewer,
            snapshot: None,
            annotations: Annotations::empty(Board::STANDARD),
            pending_choice: None,
            win_notice: WinNotice::Armed,
            announce_wins: true,
        }
    }

    /// Turns `MatchWon`/`MatchReset` on or off. Off for authorities that report winners some other way.
    pub fn announcing_wins(mut self, announce: bool) -> Self {
        self.announce_wins = announce;
        self
    }

    pub fn viewer(&self) -> Option<&PlayerId> {
        self.viewer.as_ref()
    }

    pub fn set_viewer(&mut self, viewer: Option<PlayerId>) {
        if self.viewer != viewer {
            self.viewer = viewer;
            self.refresh();
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn pending_choice(&self) -> Option<CellIndex> {
        self.pending_choice.map(|choice| choice.index)
    }

    /// Replaces the current snapshot and returns what changed.
    pub fn apply(&mut self, next: Snapshot) -> Vec<Effect> {
        if let Some(choice) = self.pending_choice
            && (choice.round != next.round || next.target.is_some())
        {
            log::debug!("Dropping unconfirmed target choice {}", choice.index);
            self.pending_choice = None;
        }

        let mut effects = diff(self.snapshot.as_ref(), &next, self.viewer.as_ref());
        if self.pending_choice.is_some() {
            effects.retain(|effect| !matches!(effect, Effect::PickTarget { .. }));
        }
        effects.extend(self.check_winner(&next));

        self.snapshot = Some(next);
        self.refresh();
        effects
    }

    /// Remembers a target choice for the current round so the cue giver sees it before the server echoes it.
    pub fn choose_target_optimistic(&mut self, index: CellIndex) {
        let round = self.snapshot.as_ref().map_or(0, |snapshot| snapshot.round);
        self.pending_choice = Some(PendingChoice { round, index });
        self.refresh();
    }

    /// Keeps the win notice quiet until a fresh match shows up.
    pub fn request_new_match(&mut self) {
        self.win_notice = WinNotice::Suppressed;
    }

    pub(crate) fn win_notice(&self) -> WinNotice {
        self.win_notice
    }

    pub(crate) fn restore_win_notice(&mut self, notice: WinNotice) {
        self.win_notice = notice;
    }

    fn check_winner(&mut self, next: &Snapshot) -> Option<Effect> {
        if !self.announce_wins {
            return None;
        }
        let winner = next.winner(WIN_SCORE);

        if winner.is_none() && !next.players.is_empty() && next.is_fresh_match() {
            let previous = core::mem::replace(&mut self.win_notice, WinNotice::Armed);
            return (previous != WinNotice::Armed).then_some(Effect::MatchReset);
        }

        let winner = winner.filter(|_| self.win_notice == WinNotice::Armed)?;
        self.win_notice = WinNotice::Shown;
        log::info!("{} won with {} points", winner.name, winner.score);
        Some(Effect::MatchWon {
            player: winner.id.clone(),
            name: winner.name.clone(),
            score: winner.score,
        })
    }

    fn refresh(&mut self) {
        self.annotations = match &self.snapshot {
            Some(snapshot) => {
                Annotations::derive(snapshot, self.viewer.as_ref(), self.pending_choice())
            }
            None => Annotations::empty(Board::STANDARD),
        };
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use smallvec::smallvec;

    fn me() -> PlayerId {
        "me".into()
    }

    fn lobby() -> Snapshot {
        Snapshot {
            players: vec![
                Player::new("me".into(), "Me"),
                Player::new("you".into(), "You"),
            ],
            ..Default::default()
        }
    }

    fn cue1(round: RoundNumber, giver: &str) -> Snapshot {
        Snapshot {
            round,
            phase: Phase::Cue1,
            cue_giver: Some(giver.into()),
            select_options: smallvec![1, 2, 3, 4],
            ..lobby()
        }
    }

    #[test]
    fn new_round_prompts_the_giver_once() {
        let mut reconciler = Reconciler::new(Some(me()));
        reconciler.apply(lobby());

        let effects = reconciler.apply(cue1(1, "me"));
        assert_eq!(
            effects,
            vec![
                Effect::RoundStarted { round: 1 },
                Effect::PhaseChanged {
                    from: Some(Phase::Lobby),
                    to: Phase::Cue1
                },
                Effect::PickTarget {
                    options: smallvec![1, 2, 3, 4]
                },
            ]
        );
        assert!(reconciler.apply(cue1(1, "me")).is_empty());
    }

    #[test]
    fn guessers_are_not_prompted() {
        let effects = diff(Some(&lobby()), &cue1(1, "you"), Some(&me()));
        assert!(!effects.iter().any(|e| matches!(e, Effect::PickTarget { .. })));
    }

    #[test]
    fn optimistic_choice_until_round_changes() {
        let mut reconciler = Reconciler::new(Some(me()));
        reconciler.apply(cue1(1, "me"));
        reconciler.choose_target_optimistic(3);
        assert_eq!(reconciler.annotations().marker(3), Marker::SELECTED);

        // server hides the target and drops the options once chosen
        let chosen = Snapshot {
            select_options: Candidates::new(),
            ..cue1(1, "me")
        };
        reconciler.apply(chosen);
        assert_eq!(reconciler.pending_choice(), Some(3));
        assert_eq!(reconciler.annotations().marker(3), Marker::SELECTED);

        let effects = reconciler.apply(cue1(2, "me"));
        assert_eq!(reconciler.pending_choice(), None);
        assert!(reconciler.annotations().is_empty());
        assert!(effects.contains(&Effect::PickTarget {
            options: smallvec![1, 2, 3, 4]
        }));
    }

    #[test]
    fn confirmed_target_replaces_optimistic_choice() {
        let mut reconciler = Reconciler::new(Some(me()));
        reconciler.apply(cue1(1, "me"));
        reconciler.choose_target_optimistic(3);

        let effects = reconciler.apply(Snapshot {
            target: Some(4),
            ..cue1(1, "me")
        });
        assert_eq!(reconciler.pending_choice(), None);
        assert_eq!(reconciler.annotations().marker(4), Marker::SELECTED);
        assert_eq!(reconciler.annotations().marker(3), Marker::empty());
        assert!(effects.contains(&Effect::TargetChosen { index: 4 }));
    }

    #[test]
    fn pending_choice_suppresses_the_prompt() {
        let mut reconciler = Reconciler::new(Some(me()));
        reconciler.choose_target_optimistic(2);
        let effects = reconciler.apply(cue1(0, "me"));
        assert!(!effects.iter().any(|e| matches!(e, Effect::PickTarget { .. })));
    }

    #[test]
    fn cues_are_announced_once() {
        let mut guess1 = cue1(1, "you");
        guess1.phase = Phase::Guess1;
        guess1.cue1 = Some("lime".into());

        let effects = diff(Some(&cue1(1, "you")), &guess1, Some(&me()));
        assert!(effects.contains(&Effect::Cue1Given { cue: "lime".into() }));
        assert!(!diff(Some(&guess1), &guess1, Some(&me()))
            .iter()
            .any(|e| matches!(e, Effect::Cue1Given { .. })));
    }

    #[test]
    fn reveal_reports_the_summary_once() {
        let reveal = Snapshot {
            phase: Phase::Reveal,
            target: Some(100),
            guesses2: vec![Guess::new(me(), 101)],
            ..cue1(1, "you")
        };
        let mut guess2 = reveal.clone();
        guess2.phase = Phase::Guess2;
        guess2.target = None;

        let effects = diff(Some(&guess2), &reveal, Some(&me()));
        let summary = effects.iter().find_map(|effect| match effect {
            Effect::Revealed { summary } => Some(summary),
            _ => None,
        });
        assert_eq!(summary.and_then(|s| s.award_for(&me())).map(|a| a.points), Some(2));
        assert!(diff(Some(&reveal), &reveal, Some(&me())).is_empty());
    }

    #[test]
    fn win_notice_fires_once_and_rearms_after_reset() {
        let mut reconciler = Reconciler::new(Some(me()));
        let mut won = cue1(9, "you");
        won.phase = Phase::Reveal;
        won.players[1].score = 15;

        let effects = reconciler.apply(won.clone());
        assert!(effects.contains(&Effect::MatchWon {
            player: "you".into(),
            name: "You".into(),
            score: 15
        }));
        assert!(!reconciler
            .apply(won.clone())
            .iter()
            .any(|e| matches!(e, Effect::MatchWon { .. })));

        let effects = reconciler.apply(cue1(1, "me"));
        assert!(effects.contains(&Effect::MatchReset));
        assert!(reconciler
            .apply(won)
            .iter()
            .any(|e| matches!(e, Effect::MatchWon { .. })));
    }

    #[test]
    fn requested_new_match_silences_the_old_winner() {
        let mut reconciler = Reconciler::new(Some(me()));
        reconciler.request_new_match();

        let mut won = cue1(9, "you");
        won.players[0].score = 20;
        assert!(!reconciler
            .apply(won)
            .iter()
            .any(|e| matches!(e, Effect::MatchWon { .. })));

        assert!(reconciler.apply(cue1(1, "you")).contains(&Effect::MatchReset));
    }
}
