use alloc::vec::Vec;
use bitflags::bitflags;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Marker: u8 {
        const SELECTED = 1;
        const TARGET   = 1 << 1;
        const GUESS    = 1 << 2;
        const BEST     = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMark {
    pub marker: Marker,
    /// Points the cell is worth at reveal, `0` outside the scoring zone.
    pub points: Score,
}

/// Per-cell markers derived from a snapshot. Always rebuilt from scratch, never patched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    board: Board,
    marks: Array2<CellMark>,
}

impl Annotations {
    pub fn empty(board: Board) -> Self {
        Self {
            board,
            marks: Array2::default(board.shape()),
        }
    }

    /// Builds the layer for `viewer`. `pending_choice` is a target the viewer picked that the server has not
    /// confirmed; it only shows while the viewer is the cue giver.
    pub fn derive(
        snapshot: &Snapshot,
        viewer: Option<&PlayerId>,
        pending_choice: Option<CellIndex>,
    ) -> Self {
        let mut annotations = Self::empty(snapshot.board);
        let phase = snapshot.phase;

        if phase.is_in_round() && viewer.is_some_and(|id| snapshot.is_cue_giver(id)) {
            if let Some(index) = snapshot.target.or(pending_choice) {
                annotations.add(index, Marker::SELECTED);
            }
        }

        for cell in visible_guesses(snapshot) {
            annotations.add(cell, Marker::GUESS);
        }

        if phase == Phase::Reveal {
            if let Some(target) = snapshot.target.filter(|&t| snapshot.board.contains(t)) {
                annotations.add(target, Marker::TARGET);
                for (index, points) in points_zone(&snapshot.board, target) {
                    annotations.set_points(index, points);
                }
                if let Some(best) = snapshot
                    .reveal_summary()
                    .as_ref()
                    .and_then(RevealSummary::best_award)
                {
                    annotations.add(best.guess, Marker::BEST);
                }
            }
        }

        annotations
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Off-board cells read as unmarked.
    pub fn mark(&self, index: CellIndex) -> CellMark {
        if self.board.contains(index) {
            self.marks[self.board.index_to_row_col(index).to_nd_index()]
        } else {
            CellMark::default()
        }
    }

    pub fn marker(&self, index: CellIndex) -> Marker {
        self.mark(index).marker
    }

    pub fn points(&self, index: CellIndex) -> Option<Score> {
        Some(self.mark(index).points).filter(|&points| points > 0)
    }

    /// Cells carrying every flag in `marker`, in index order.
    pub fn cells_with(&self, marker: Marker) -> impl Iterator<Item = CellIndex> + '_ {
        self.board
            .iter_cells()
            .filter(move |&index| self.marker(index).contains(marker))
    }

    pub fn is_empty(&self) -> bool {
        self.marks.iter().all(|mark| *mark == CellMark::default())
    }

    fn add(&mut self, index: CellIndex, marker: Marker) {
        if let Some(mark) = self.mark_mut(index) {
            mark.marker |= marker;
        }
    }

    fn set_points(&mut self, index: CellIndex, points: Score) {
        if let Some(mark) = self.mark_mut(index) {
            mark.points = points;
        }
    }

    fn mark_mut(&mut self, index: CellIndex) -> Option<&mut CellMark> {
        match self.board.checked_row_col(index) {
            Ok(coords) => Some(&mut self.marks[coords.to_nd_index()]),
            Err(_) => {
                log::warn!("Ignoring marker on off-board cell {}", index);
                None
            }
        }
    }
}

/// Guess cells shown during a round. The second wave shows each player's latest guess.
fn visible_guesses(snapshot: &Snapshot) -> Vec<CellIndex> {
    let cells = |guesses: &[Guess]| guesses.iter().map(|guess| guess.cell).collect::<Vec<_>>();

    match snapshot.phase {
        Phase::Guess1 | Phase::Cue2 if !snapshot.guesses1.is_empty() => cells(&snapshot.guesses1),
        Phase::Guess2 | Phase::Reveal
            if !snapshot.guesses1.is_empty() || !snapshot.guesses2.is_empty() =>
        {
            let mut shown = cells(&snapshot.guesses2);
            let first_only = snapshot.guesses1.iter().filter(|guess| {
                guess
                    .player
                    .as_ref()
                    .is_some_and(|id| snapshot.guess2_of(id).is_none())
            });
            for guess in first_only {
                if !shown.contains(&guess.cell) {
                    shown.push(guess.cell);
                }
            }
            shown
        }
        Phase::Guess1 | Phase::Cue2 | Phase::Guess2 | Phase::Reveal => cells(&snapshot.last_guesses),
        Phase::Lobby | Phase::Cue1 => Vec::new(),
    }
}
