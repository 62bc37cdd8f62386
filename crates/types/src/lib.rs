//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behaviour beyond small helpers, making them
//! usable in any context (engine logic, terminal rendering, external UI layers).
//!
//! # Board Dimensions
//!
//! The board is a square N×N grid addressed by `(row, col)`:
//!
//! - **row**: 0 is the top row, `N - 1` the bottom row (gravity pulls toward higher rows)
//! - **col**: 0 is the leftmost column
//! - **N**: configurable in `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`, default 8
//!
//! # Tile Types
//!
//! A tile type is a small integer. `0` ([`EMPTY_TILE`]) marks a cell whose tile was
//! matched and is waiting for gravity/refill; `1..=K` are the colours.
//!
//! # Cascade Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `MARK_PAUSE_MS` | 250 | Matched cells stay highlighted before removal |
//! | `GRAVITY_PAUSE_MS` | 120 | Pause after tiles fall, before refill |
//! | `REFILL_PAUSE_MS` | 120 | Pause after refill, before re-detection |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Coord, Effect, DEFAULT_BOARD_SIZE};
//!
//! let a = Coord::new(0, 0);
//! let b = Coord::new(0, 1);
//! assert!(a.is_adjacent(b));
//! assert!(!a.is_adjacent(Coord::new(1, 1)));
//!
//! assert_eq!(Effect::SwapNoMatch.as_str(), "swap-no-match");
//! assert_eq!(Effect::from_str("fall"), Some(Effect::Fall));
//!
//! assert_eq!(DEFAULT_BOARD_SIZE, 8);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default board edge length (8×8)
pub const DEFAULT_BOARD_SIZE: u8 = 8;

/// Smallest supported board edge length
pub const MIN_BOARD_SIZE: u8 = 3;

/// Largest supported board edge length
pub const MAX_BOARD_SIZE: u8 = 16;

/// Default number of tile colours
pub const DEFAULT_TILE_TYPES: u8 = 6;

/// Fewest colours that still make match-free generation always possible
pub const MIN_TILE_TYPES: u8 = 3;

/// Most colours supported
pub const MAX_TILE_TYPES: u8 = 12;

/// Minimum length of a straight run that counts as a match
pub const MIN_RUN_LENGTH: usize = 3;

/// Points per matched tile before the chain multiplier
pub const POINTS_PER_TILE: u32 = 10;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// How long matched cells stay marked before gravity runs
pub const MARK_PAUSE_MS: u32 = 250;

/// Pause after gravity, before refill
pub const GRAVITY_PAUSE_MS: u32 = 120;

/// Pause after refill, before the board is re-examined
pub const REFILL_PAUSE_MS: u32 = 120;

/// A tile colour. `0` is the transient "removed" marker.
pub type TileType = u8;

/// Marker type for a matched cell awaiting gravity/refill
pub const EMPTY_TILE: TileType = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions_are_within_limits() {
        assert!((MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&DEFAULT_BOARD_SIZE));
        assert!((MIN_TILE_TYPES..=MAX_TILE_TYPES).contains(&DEFAULT_TILE_TYPES));
        assert_eq!(MIN_RUN_LENGTH, 3);
        assert_eq!(POINTS_PER_TILE, 10);
    }

    #[test]
    fn coord_adjacency_is_manhattan_one() {
        let c = Coord::new(3, 3);
        assert!(c.is_adjacent(Coord::new(2, 3)));
        assert!(c.is_adjacent(Coord::new(4, 3)));
        assert!(c.is_adjacent(Coord::new(3, 2)));
        assert!(c.is_adjacent(Coord::new(3, 4)));

        // Diagonals and the cell itself are not adjacent.
        assert!(!c.is_adjacent(Coord::new(4, 4)));
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Coord::new(3, 5)));
    }

    #[test]
    fn coord_neighbors_respect_board_edges() {
        let corner: Vec<Coord> = Coord::new(0, 0).neighbors(4).collect();
        assert_eq!(corner, vec![Coord::new(0, 1), Coord::new(1, 0)]);

        let inner: Vec<Coord> = Coord::new(1, 1).neighbors(4).collect();
        assert_eq!(inner.len(), 4);

        let far: Vec<Coord> = Coord::new(3, 3).neighbors(4).collect();
        assert_eq!(far, vec![Coord::new(2, 3), Coord::new(3, 2)]);
    }

    #[test]
    fn effect_names_roundtrip() {
        for effect in Effect::ALL {
            assert_eq!(Effect::from_str(effect.as_str()), Some(effect));
        }
        assert_eq!(Effect::from_str("explode"), None);
    }
}

/// A cell address on the board
///
/// Ordering is row-major (row first, then column), which is also the order the
/// engine reports matched cells in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two cells
    pub fn manhattan(self, other: Coord) -> u16 {
        let dr = (self.row as i16 - other.row as i16).unsigned_abs();
        let dc = (self.col as i16 - other.col as i16).unsigned_abs();
        dr + dc
    }

    /// True when `other` shares an edge with this cell
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::Coord;
    ///
    /// assert!(Coord::new(2, 2).is_adjacent(Coord::new(2, 3)));
    /// assert!(!Coord::new(2, 2).is_adjacent(Coord::new(3, 3)));
    /// ```
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Offset this coordinate, returning `None` when it leaves a `size`×`size` board
    pub fn offset(self, d_row: i8, d_col: i8, size: u8) -> Option<Coord> {
        let row = self.row as i16 + d_row as i16;
        let col = self.col as i16 + d_col as i16;
        if row < 0 || col < 0 || row >= size as i16 || col >= size as i16 {
            return None;
        }
        Some(Coord::new(row as u8, col as u8))
    }

    /// The up to four edge-sharing neighbours inside a `size`×`size` board
    ///
    /// Order: up, left, right, down.
    pub fn neighbors(self, size: u8) -> impl Iterator<Item = Coord> {
        const DIRS: [(i8, i8); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        DIRS.into_iter()
            .filter_map(move |(dr, dc)| self.offset(dr, dc, size))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Named side effects emitted by the engine
///
/// The engine does not know how these are played or drawn; audio and
/// animation layers bind the names to their own assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    /// A cell became the current selection
    Select,
    /// The current selection was dropped
    Deselect,
    /// An adjacent swap produced a match
    SwapOk,
    /// The second click was not adjacent to the selection
    SwapInvalid,
    /// An adjacent swap produced no match and was reverted
    SwapNoMatch,
    /// Matched cells were marked for removal
    Match,
    /// Tiles fell into vacated cells
    Fall,
    /// The board has no legal move left
    NoMoves,
}

impl Effect {
    pub const ALL: [Effect; 8] = [
        Effect::Select,
        Effect::Deselect,
        Effect::SwapOk,
        Effect::SwapInvalid,
        Effect::SwapNoMatch,
        Effect::Match,
        Effect::Fall,
        Effect::NoMoves,
    ];

    /// Parse an effect from its wire name
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "select" => Some(Effect::Select),
            "deselect" => Some(Effect::Deselect),
            "swap-ok" => Some(Effect::SwapOk),
            "swap-invalid" => Some(Effect::SwapInvalid),
            "swap-no-match" => Some(Effect::SwapNoMatch),
            "match" => Some(Effect::Match),
            "fall" => Some(Effect::Fall),
            "no-moves" => Some(Effect::NoMoves),
            _ => None,
        }
    }

    /// The name audio/animation layers bind to
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Select => "select",
            Effect::Deselect => "deselect",
            Effect::SwapOk => "swap-ok",
            Effect::SwapInvalid => "swap-invalid",
            Effect::SwapNoMatch => "swap-no-match",
            Effect::Match => "match",
            Effect::Fall => "fall",
            Effect::NoMoves => "no-moves",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Front-end actions produced by an input layer
///
/// These never reach the engine directly; the front-end translates cursor
/// movement into a coordinate and then issues a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the cursor one row up
    MoveUp,
    /// Move the cursor one row down
    MoveDown,
    /// Move the cursor one column left
    MoveLeft,
    /// Move the cursor one column right
    MoveRight,
    /// Click the cell under the cursor (select / swap)
    Click,
    /// Ask the engine for a legal move
    Hint,
    /// Abort the round and start over on a fresh board
    Restart,
}
