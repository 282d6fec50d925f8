//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board), kept apart from board
//! storage so the coordinator can evaluate terminal states without owning
//! rule tables.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{has_line, winner, LINES};
