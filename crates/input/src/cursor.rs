//! Board cursor driven by movement actions.

use crate::types::{Coord, GameAction};

/// Cursor position on a `size`×`size` board, clamped to its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    row: u8,
    col: u8,
    size: u8,
}

impl Cursor {
    /// Cursor at the centre of the board
    pub fn new(size: u8) -> Self {
        let size = size.max(1);
        Self {
            row: size / 2,
            col: size / 2,
            size,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Move to `c`, clamped to the board
    pub fn set(&mut self, c: Coord) {
        self.row = c.row.min(self.size - 1);
        self.col = c.col.min(self.size - 1);
    }

    /// Adapt to a new board size, keeping the position where possible
    pub fn resize(&mut self, size: u8) {
        self.size = size.max(1);
        let here = self.coord();
        self.set(here);
    }

    /// Apply a movement action. Returns whether the cursor moved; non-movement
    /// actions are ignored.
    pub fn apply(&mut self, action: GameAction) -> bool {
        let (d_row, d_col) = match action {
            GameAction::MoveUp => (-1, 0),
            GameAction::MoveDown => (1, 0),
            GameAction::MoveLeft => (0, -1),
            GameAction::MoveRight => (0, 1),
            _ => return false,
        };
        match self.coord().offset(d_row, d_col, self.size) {
            Some(next) => {
                self.set(next);
                true
            }
            None => false,
        }
    }
}
