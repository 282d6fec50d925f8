//! Draw detection.

use super::win::has_line;
use crate::{Board, Mark};
use tracing::instrument;

/// Checks if every cell is occupied.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|cell| !cell.is_empty())
}

/// A full board on which neither mark holds a line.
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && !has_line(board, Mark::A) && !has_line(board, Mark::B)
}
