use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// A match ends once any player reaches this many points.
pub const WIN_SCORE: Score = 15;

/// Guesses farther than this from the target earn nothing.
pub const MAX_SCORING_DISTANCE: u16 = 2;

/// The whole scoring policy: exact hit 3, one step away 2, two steps 1, anything else 0.
pub const fn score_for_distance(distance: u16) -> Score {
    match distance {
        0 => 3,
        1 => 2,
        2 => 1,
        _ => 0,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub player: PlayerId,
    pub guess: CellIndex,
    pub distance: u16,
    pub points: Score,
}

/// Outcome of scoring the final guess wave against the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSummary {
    pub target: CellIndex,
    pub awards: Vec<Award>,
    /// Player with the closest guess, the earliest in player order on ties.
    pub best: Option<PlayerId>,
}

impl RevealSummary {
    pub fn award_for(&self, player: &PlayerId) -> Option<&Award> {
        self.awards.iter().find(|award| &award.player == player)
    }

    pub fn best_award(&self) -> Option<&Award> {
        self.best.as_ref().and_then(|best| self.award_for(best))
    }
}

/// Scores `guesses`, which must already be in player order with the cue giver left out.
pub fn score_guesses<'a>(
    board: &Board,
    target: CellIndex,
    guesses: impl IntoIterator<Item = (&'a PlayerId, CellIndex)>,
) -> RevealSummary {
    let mut awards = Vec::new();
    let mut best: Option<(u16, &PlayerId)> = None;

    for (player, guess) in guesses {
        if !board.contains(guess) {
            log::warn!("Ignoring off-board guess {} by {}", guess, player);
            continue;
        }
        let distance = board.manhattan_distance(guess, target);
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, player));
        }
        awards.push(Award {
            player: player.clone(),
            guess,
            distance,
            points: score_for_distance(distance),
        });
    }

    RevealSummary {
        target,
        awards,
        best: best.map(|(_, player)| player.clone()),
    }
}

/// Cells that would earn points for `target`, with their value.
pub fn points_zone(
    board: &Board,
    target: CellIndex,
) -> impl Iterator<Item = (CellIndex, Score)> + use<> {
    let board = *board;
    board
        .cells_within(target, MAX_SCORING_DISTANCE)
        .map(move |index| (index, score_for_distance(board.manhattan_distance(index, target))))
}
