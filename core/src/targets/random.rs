use rand::prelude::*;

use super::*;

/// Draws distinct candidates uniformly from the whole board.
#[derive(Clone, Debug)]
pub struct RandomTargetPicker {
    rng: SmallRng,
}

impl RandomTargetPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TargetPicker for RandomTargetPicker {
    fn candidates(&mut self, board: &Board) -> Candidates {
        let total_cells = board.cell_count();
        let wanted = TARGET_OPTIONS.min(usize::from(total_cells));
        if wanted < TARGET_OPTIONS {
            log::warn!(
                "Board only has {} cells, offering fewer than {} options",
                total_cells,
                TARGET_OPTIONS
            );
        }

        // rejection sampling against the cells already drawn
        let mut options = Candidates::new();
        while options.len() < wanted {
            let index: CellIndex = self.rng.random_range(0..total_cells);
            if !options.contains(&index) {
                options.push(index);
            }
        }
        log::trace!("Drew target options {:?}", options);
        options
    }
}
