//! The 3x3 board value type.

use crate::rules;
use crate::types::{Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Why a move could not be placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidMove {
    /// Index is not in `0..9`.
    #[display("Cell index {} is out of range (must be 0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),
    /// Target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(#[error(not(source))] usize),
}

/// 3x3 tic-tac-toe board.
///
/// Cells are stored in row-major order; index `row * 3 + col`. A cell goes
/// from [`Cell::Empty`] to [`Cell::Marked`] at most once between resets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Gets the cell at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Places `mark` at `index`.
    ///
    /// Fails without touching the board if the index is out of range or the
    /// cell is already taken.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, index: usize, mark: Mark) -> Result<(), InvalidMove> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(InvalidMove::OutOfRange(index))?;
        if !cell.is_empty() {
            return Err(InvalidMove::Occupied(index));
        }
        *cell = Cell::Marked(mark);
        Ok(())
    }

    /// True iff `mark` fills one of the eight winning lines.
    pub fn check_win(&self, mark: Mark) -> bool {
        rules::has_line(self, mark)
    }

    /// True iff the board is full and neither mark has a line.
    ///
    /// Callers resolving a move check the mover's win first; a draw is the
    /// fallback terminal state.
    pub fn check_draw(&self) -> bool {
        rules::is_draw(self)
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Clears every cell.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; CELL_COUNT];
    }

    /// Formats the board as a human-readable grid.
    ///
    /// Empty cells show their index so the grid doubles as a move legend.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                match self.cells[index] {
                    Cell::Empty => result.push_str(&index.to_string()),
                    Cell::Marked(mark) => result.push(mark.symbol()),
                }
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}
