use smallvec::SmallVec;

use crate::*;
pub use random::*;

mod random;

/// Number of candidate cells offered to the chooser each round.
pub const TARGET_OPTIONS: usize = 4;

/// Candidate target cells offered for one round.
pub type Candidates = SmallVec<[CellIndex; TARGET_OPTIONS]>;

pub trait TargetPicker {
    fn candidates(&mut self, board: &Board) -> Candidates;
}

/// Offers the same candidates every round, useful for replays and scripted games.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedTargetPicker {
    options: Candidates,
}

impl FixedTargetPicker {
    pub fn new(options: impl IntoIterator<Item = CellIndex>) -> Self {
        Self {
            options: options.into_iter().collect(),
        }
    }
}

impl TargetPicker for FixedTargetPicker {
    fn candidates(&mut self, board: &Board) -> Candidates {
        self.options
            .iter()
            .copied()
            .filter(|&index| board.contains(index))
            .collect()
    }
}
