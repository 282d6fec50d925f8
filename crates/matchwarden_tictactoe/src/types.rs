//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// The symbol a player places on the board.
///
/// `A` is conventionally rendered as X and always moves first; `B` as O.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Mark {
    /// First player's mark (X).
    A,
    /// Second player's mark (O).
    B,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::A => Mark::B,
            Mark::B => Mark::A,
        }
    }

    /// Conventional glyph for this mark.
    pub fn symbol(self) -> char {
        match self {
            Mark::A => 'X',
            Mark::B => 'O',
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Occupied by a mark.
    Marked(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Marked(mark) => Some(mark),
        }
    }

    /// Whether the cell is unoccupied.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_marks_oppose_each_other() {
        for mark in Mark::iter() {
            assert_ne!(mark.opponent(), mark);
            assert_eq!(mark.opponent().opponent(), mark);
            assert_eq!(Cell::Marked(mark).mark(), Some(mark));
            assert!(!Cell::Marked(mark).is_empty());
        }
        let symbols: String = Mark::iter().map(Mark::symbol).collect();
        assert_eq!(symbols, "XO");
    }

    #[test]
    fn test_empty_cell_has_no_mark() {
        assert!(Cell::default().is_empty());
        assert_eq!(Cell::Empty.mark(), None);
    }
}
