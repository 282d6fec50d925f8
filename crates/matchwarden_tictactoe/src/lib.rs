//! Pure tic-tac-toe board and rules.
//!
//! The board is a value type: nine cells in row-major order, mutated only
//! through [`Board::apply_move`] and [`Board::reset`]. Rules are pure
//! predicates over a board and live in [`rules`], separate from storage.
//!
//! # Example
//!
//! ```
//! use matchwarden_tictactoe::{Board, Mark};
//!
//! let mut board = Board::new();
//! for cell in [0, 1, 2] {
//!     board.apply_move(cell, Mark::A).unwrap();
//! }
//! assert!(board.check_win(Mark::A));
//! assert!(!board.check_draw());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
pub mod rules;
mod types;

pub use board::{Board, InvalidMove, CELL_COUNT};
pub use types::{Cell, Mark};
