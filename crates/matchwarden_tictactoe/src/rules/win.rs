//! Win detection.

use crate::{Board, Cell, Mark};
use tracing::instrument;

/// The eight winning triples: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// True iff all three cells of some line hold `mark`.
#[instrument(skip(board))]
pub fn has_line(board: &Board, mark: Mark) -> bool {
    let target = Some(Cell::Marked(mark));
    LINES
        .iter()
        .any(|line| line.iter().all(|&index| board.get(index) == target))
}

/// Returns the mark holding a completed line, if any.
///
/// A legally played board has at most one winner; if both marks somehow
/// hold a line, `A` is reported.
pub fn winner(board: &Board) -> Option<Mark> {
    [Mark::A, Mark::B]
        .into_iter()
        .find(|&mark| has_line(board, mark))
}
