use alloc::format;
use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rows of the standard board, labelled `A` to `R`.
pub const ROWS: Coord = 18;

/// Columns of the standard board, labelled `1` to `30`.
pub const COLS: Coord = 30;

pub const CELL_COUNT: CellIndex = ROWS as CellIndex * COLS as CellIndex;

const SATURATION: u8 = 100;
const TOP_LIGHTNESS: u8 = 72;
const BOTTOM_LIGHTNESS: u8 = 22;

/// Row labels are single letters, so a board never has more rows than this.
const MAX_ROWS: Coord = 26;

/// Color of a board cell in HSL components.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}deg {}% {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Immutable geometry of the color board. Every mapping here is a pure function of the index and the board size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: Coord,
    cols: Coord,
}

impl Board {
    pub const STANDARD: Board = Board {
        rows: ROWS,
        cols: COLS,
    };

    pub fn new(rows: Coord, cols: Coord) -> Self {
        Self {
            rows: rows.clamp(1, MAX_ROWS),
            cols: cols.max(1),
        }
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cols(&self) -> Coord {
        self.cols
    }

    pub const fn cell_count(&self) -> CellIndex {
        self.rows as CellIndex * self.cols as CellIndex
    }

    pub const fn shape(&self) -> [usize; 2] {
        [self.rows as usize, self.cols as usize]
    }

    pub const fn contains(&self, index: CellIndex) -> bool {
        index < self.cell_count()
    }

    pub fn checked_index(&self, index: CellIndex) -> Result<CellIndex> {
        if self.contains(index) {
            Ok(index)
        } else {
            Err(GameError::InvalidCell(index))
        }
    }

    pub fn checked_row_col(&self, index: CellIndex) -> Result<RowCol> {
        self.checked_index(index).map(|index| self.index_to_row_col(index))
    }

    /// Callers must pass an index on the board.
    pub fn index_to_row_col(&self, index: CellIndex) -> RowCol {
        debug_assert!(self.contains(index), "cell {index} is off the board");
        let cols = CellIndex::from(self.cols);
        ((index / cols) as Coord, (index % cols) as Coord)
    }

    pub fn row_col_to_index(&self, (row, col): RowCol) -> CellIndex {
        debug_assert!(row < self.rows && col < self.cols);
        CellIndex::from(row) * CellIndex::from(self.cols) + CellIndex::from(col)
    }

    pub fn manhattan_distance(&self, a: CellIndex, b: CellIndex) -> u16 {
        let (a_row, a_col) = self.index_to_row_col(a);
        let (b_row, b_col) = self.index_to_row_col(b);
        u16::from(a_row.abs_diff(b_row)) + u16::from(a_col.abs_diff(b_col))
    }

    /// Hue sweeps the columns, lightness fades from the top row to the bottom one.
    pub fn cell_color(&self, index: CellIndex) -> Hsl {
        let (row, col) = self.index_to_row_col(index);
        let hue = round_div(u32::from(col) * 360, u32::from(self.cols)) as u16;

        let span = u32::from(self.rows) - 1;
        let lightness = if span == 0 {
            TOP_LIGHTNESS
        } else {
            let fade = u32::from(TOP_LIGHTNESS - BOTTOM_LIGHTNESS) * u32::from(row);
            round_div(u32::from(TOP_LIGHTNESS) * span - fade, span) as u8
        };

        Hsl {
            hue,
            saturation: SATURATION,
            lightness,
        }
    }

    /// Human label of a cell, row letter then 1-based column: `A1`, `R30`.
    pub fn cell_label(&self, index: CellIndex) -> String {
        let (row, col) = self.index_to_row_col(index);
        format!("{}{}", char::from(b'A' + row), u16::from(col) + 1)
    }

    pub fn parse_cell_label(&self, label: &str) -> Result<CellIndex> {
        let label = label.trim();
        let mut chars = label.chars();
        let letter = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or(GameError::InvalidLabel)?;
        let row = letter.to_ascii_uppercase() as u8 - b'A';
        let col: u16 = chars
            .as_str()
            .parse()
            .map_err(|_| GameError::InvalidLabel)?;

        if row >= self.rows || col == 0 || col > u16::from(self.cols) {
            return Err(GameError::InvalidLabel);
        }
        Ok(self.row_col_to_index((row, (col - 1) as Coord)))
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = CellIndex> + use<> {
        0..self.cell_count()
    }

    /// Every cell whose Manhattan distance to `center` is at most `radius`, in index order.
    pub fn cells_within(
        &self,
        center: CellIndex,
        radius: u16,
    ) -> impl Iterator<Item = CellIndex> + use<> {
        let board = *self;
        self.iter_cells()
            .filter(move |&index| board.manhattan_distance(center, index) <= radius)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Integer division rounding halves up, matching how the board colors were always computed.
const fn round_div(num: u32, den: u32) -> u32 {
    (2 * num + den) / (2 * den)
}
