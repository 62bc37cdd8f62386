//! Board module - owns the tile grid
//!
//! The board is an N×N arena of tile slots allocated once and mutated in place.
//! Coordinates: (row, col) where row 0 is the top; gravity pulls tiles toward
//! row N-1. Each slot keeps its own `row`/`col`, so moving a tile means moving
//! its `kind` and `id` between slots.

use std::collections::HashSet;
use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::matcher::{self, MatchSet};
use crate::moves;
use crate::rng::SimpleRng;
use crate::types::{
    Coord, TileType, EMPTY_TILE, MAX_BOARD_SIZE, MAX_TILE_TYPES, MIN_BOARD_SIZE, MIN_TILE_TYPES,
};

/// How many boards `generate_playable` draws before giving up on finding a move
pub const MAX_GENERATION_ATTEMPTS: usize = 64;

/// Opaque tile identity, unique among the live tiles of one board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    /// Identity carried by a removed (kind 0) slot
    pub const VACANT: TileId = TileId(0);
}

/// One slot of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub kind: TileType,
    pub id: TileId,
    pub row: u8,
    pub col: u8,
}

impl Tile {
    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    pub fn is_empty(&self) -> bool {
        self.kind == EMPTY_TILE
    }
}

/// The N×N game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    size: u8,
    /// Row-major slots (row * size + col)
    cells: Vec<Tile>,
    /// Last identity handed out
    last_id: u32,
}

/// Reject dimensions the engine cannot honour.
pub fn validate_dimensions(size: u8, tile_types: u8) -> Result<(), EngineError> {
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        return Err(EngineError::InvalidConfig(format!(
            "board size {} outside {}..={}",
            size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
        )));
    }
    if !(MIN_TILE_TYPES..=MAX_TILE_TYPES).contains(&tile_types) {
        return Err(EngineError::InvalidConfig(format!(
            "tile type count {} outside {}..={}",
            tile_types, MIN_TILE_TYPES, MAX_TILE_TYPES
        )));
    }
    Ok(())
}

impl Board {
    /// All slots vacant, positions filled in
    fn vacant(size: u8) -> Self {
        let n = size as usize;
        let mut cells = Vec::with_capacity(n * n);
        for row in 0..size {
            for col in 0..size {
                cells.push(Tile {
                    kind: EMPTY_TILE,
                    id: TileId::VACANT,
                    row,
                    col,
                });
            }
        }
        Self {
            size,
            cells,
            last_id: 0,
        }
    }

    /// Generate a board with no horizontal or vertical run of three.
    ///
    /// Cells are placed row by row; each draw excludes the colour that would
    /// complete a run with the two cells to its left or the two cells above it.
    /// Drawing from the remaining colours has the same distribution as
    /// re-rolling until the constraint holds, without an open-ended loop. With
    /// at least three colours at most two are ever excluded.
    pub fn initialize(size: u8, tile_types: u8, rng: &mut SimpleRng) -> Result<Self, EngineError> {
        validate_dimensions(size, tile_types)?;
        let mut board = Self::vacant(size);
        let n = size as usize;

        for row in 0..n {
            for col in 0..n {
                let left = if col >= 2 {
                    let a = board.kind_at(row, col - 1);
                    (a == board.kind_at(row, col - 2)).then_some(a)
                } else {
                    None
                };
                let up = if row >= 2 {
                    let a = board.kind_at(row - 1, col);
                    (a == board.kind_at(row - 2, col)).then_some(a)
                } else {
                    None
                };

                let allowed: ArrayVec<TileType, { MAX_TILE_TYPES as usize }> = (1..=tile_types)
                    .filter(|&t| Some(t) != left && Some(t) != up)
                    .collect();
                let kind = rng
                    .pick(&allowed)
                    .ok_or_else(|| EngineError::InvalidConfig("no colour left to place".into()))?;

                let id = board.fresh_id();
                let tile = &mut board.cells[row * n + col];
                tile.kind = kind;
                tile.id = id;
            }
        }

        Ok(board)
    }

    /// Generate a match-free board that also has at least one legal move.
    ///
    /// Falls back to the last generated board after
    /// [`MAX_GENERATION_ATTEMPTS`]; the controller's deadlock check reports it.
    pub fn generate_playable(
        size: u8,
        tile_types: u8,
        rng: &mut SimpleRng,
    ) -> Result<Self, EngineError> {
        let mut board = Self::initialize(size, tile_types, rng)?;
        for attempt in 1..MAX_GENERATION_ATTEMPTS {
            if moves::has_legal_move(&board) {
                return Ok(board);
            }
            debug!(attempt, "generated board has no legal move, regenerating");
            board = Self::initialize(size, tile_types, rng)?;
        }
        if !moves::has_legal_move(&board) {
            warn!(size, tile_types, "could not generate a board with a legal move");
        }
        Ok(board)
    }

    /// Build a board from explicit tile kinds, one slice per row.
    ///
    /// Kind 0 is allowed (it produces a vacant slot). Ragged or non-square
    /// input is an invariant violation.
    pub fn from_rows<R: AsRef<[TileType]>>(rows: &[R]) -> Result<Self, EngineError> {
        let n = rows.len();
        if n < MIN_BOARD_SIZE as usize || n > MAX_BOARD_SIZE as usize {
            return Err(EngineError::BoardInvariantViolation(format!(
                "board has {} rows, expected {}..={}",
                n, MIN_BOARD_SIZE, MAX_BOARD_SIZE
            )));
        }
        for (row, cells) in rows.iter().enumerate() {
            let len = cells.as_ref().len();
            if len != n {
                return Err(EngineError::BoardInvariantViolation(format!(
                    "row {} has {} cells, expected {}",
                    row, len, n
                )));
            }
        }

        let mut board = Self::vacant(n as u8);
        for (row, cells) in rows.iter().enumerate() {
            for (col, &kind) in cells.as_ref().iter().enumerate() {
                if kind == EMPTY_TILE {
                    continue;
                }
                let id = board.fresh_id();
                let tile = &mut board.cells[row * n + col];
                tile.kind = kind;
                tile.id = id;
            }
        }
        Ok(board)
    }

    fn fresh_id(&mut self) -> TileId {
        self.last_id = self.last_id.wrapping_add(1).max(1);
        TileId(self.last_id)
    }

    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if c.row >= self.size || c.col >= self.size {
            return None;
        }
        Some(c.row as usize * self.size as usize + c.col as usize)
    }

    /// Kind at a known-valid position (hot path for the matcher)
    #[inline(always)]
    pub(crate) fn kind_at(&self, row: usize, col: usize) -> TileType {
        self.cells[row * self.size as usize + col].kind
    }

    /// Board edge length
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.index(c).is_some()
    }

    pub fn tile(&self, c: Coord) -> Option<&Tile> {
        self.index(c).map(|i| &self.cells[i])
    }

    /// Tile kind at `c`, `None` if out of bounds
    pub fn kind(&self, c: Coord) -> Option<TileType> {
        self.tile(c).map(|t| t.kind)
    }

    /// All slots in row-major order
    pub fn tiles(&self) -> &[Tile] {
        &self.cells
    }

    #[cfg(test)]
    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.cells
    }

    /// Tile kinds in row-major order
    pub fn kinds(&self) -> impl Iterator<Item = TileType> + '_ {
        self.cells.iter().map(|t| t.kind)
    }

    /// Copy of the kinds as nested rows
    pub fn to_rows(&self) -> Vec<Vec<TileType>> {
        self.cells
            .chunks(self.size as usize)
            .map(|row| row.iter().map(|t| t.kind).collect())
            .collect()
    }

    /// Number of slots currently holding kind 0
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|t| t.is_empty()).count()
    }

    /// Exchange the tiles at `a` and `b`.
    ///
    /// Purely structural: no adjacency check and no match check. Returns false
    /// without touching the board if either coordinate is out of bounds.
    pub fn swap_cells(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        if ia == ib {
            return true;
        }
        let (kind_a, id_a) = (self.cells[ia].kind, self.cells[ia].id);
        self.cells[ia].kind = self.cells[ib].kind;
        self.cells[ia].id = self.cells[ib].id;
        self.cells[ib].kind = kind_a;
        self.cells[ib].id = id_a;
        true
    }

    /// Logically remove every matched cell (kind 0). Returns how many were cleared.
    pub fn clear_cells(&mut self, matches: &MatchSet) -> usize {
        let mut cleared = 0;
        for c in matches.iter() {
            if let Some(i) = self.index(c) {
                if !self.cells[i].is_empty() {
                    cleared += 1;
                }
                self.cells[i].kind = EMPTY_TILE;
                self.cells[i].id = TileId::VACANT;
            }
        }
        cleared
    }

    /// Compact every column toward the bottom.
    ///
    /// Non-empty tiles keep their relative order; freed slots at the top become
    /// kind 0. Two-pointer pass per column, no allocation. Returns whether any
    /// tile moved.
    pub fn apply_gravity(&mut self) -> bool {
        let n = self.size as usize;
        let mut moved = false;

        for col in 0..n {
            // Next slot (from the bottom) a surviving tile should land in.
            let mut write = n;
            for read in (0..n).rev() {
                let src = read * n + col;
                if self.cells[src].is_empty() {
                    continue;
                }
                write -= 1;
                if write != read {
                    let dst = write * n + col;
                    self.cells[dst].kind = self.cells[src].kind;
                    self.cells[dst].id = self.cells[src].id;
                    self.cells[src].kind = EMPTY_TILE;
                    self.cells[src].id = TileId::VACANT;
                    moved = true;
                }
            }
        }

        moved
    }

    /// Give every kind-0 slot a random colour and a fresh identity.
    ///
    /// No run avoidance: refills may create new matches, which is what keeps a
    /// cascade going. Returns the number of slots filled.
    pub fn refill_empty(&mut self, tile_types: u8, rng: &mut SimpleRng) -> usize {
        let mut filled = 0;
        for i in 0..self.cells.len() {
            if !self.cells[i].is_empty() {
                continue;
            }
            let id = self.fresh_id();
            self.cells[i].kind = rng.next_tile(tile_types);
            self.cells[i].id = id;
            filled += 1;
        }
        filled
    }

    /// Check the invariants of a stable board.
    ///
    /// Dimensions and slot positions, no kind-0 slot, no duplicated identity,
    /// and no run of three.
    pub fn audit(&self) -> Result<(), EngineError> {
        let n = self.size as usize;
        if self.cells.len() != n * n {
            return Err(EngineError::BoardInvariantViolation(format!(
                "board holds {} slots, expected {}",
                self.cells.len(),
                n * n
            )));
        }

        let mut ids = HashSet::with_capacity(self.cells.len());
        for (i, tile) in self.cells.iter().enumerate() {
            if tile.row as usize != i / n || tile.col as usize != i % n {
                return Err(EngineError::BoardInvariantViolation(format!(
                    "slot {} claims position {}",
                    i,
                    tile.coord()
                )));
            }
            if tile.is_empty() {
                return Err(EngineError::BoardInvariantViolation(format!(
                    "empty tile persists at {} after the board settled",
                    tile.coord()
                )));
            }
            if !ids.insert(tile.id) {
                return Err(EngineError::BoardInvariantViolation(format!(
                    "tile id {} appears twice",
                    tile.id.0
                )));
            }
        }

        if matcher::has_run(self) {
            return Err(EngineError::BoardInvariantViolation(
                "stable board still contains a run of three".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size as usize) {
            for tile in row {
                if tile.is_empty() {
                    f.write_str(".")?;
                } else {
                    write!(f, "{:x}", tile.kind)?;
                }
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_calculation() {
        let board = Board::vacant(8);
        assert_eq!(board.index(Coord::new(0, 0)), Some(0));
        assert_eq!(board.index(Coord::new(0, 7)), Some(7));
        assert_eq!(board.index(Coord::new(1, 0)), Some(8));
        assert_eq!(board.index(Coord::new(7, 7)), Some(63));
        assert_eq!(board.index(Coord::new(8, 0)), None);
        assert_eq!(board.index(Coord::new(0, 8)), None);
    }

    #[test]
    fn test_vacant_slots_know_their_position() {
        let board = Board::vacant(4);
        for (i, tile) in board.tiles().iter().enumerate() {
            assert_eq!(tile.coord(), Coord::new((i / 4) as u8, (i % 4) as u8));
            assert!(tile.is_empty());
        }
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = Board::from_rows(&[vec![1u8, 2, 3], vec![1, 2], vec![3, 2, 1]]).unwrap_err();
        assert_eq!(
            err,
            EngineError::BoardInvariantViolation("row 1 has 2 cells, expected 3".into())
        );

        let err = Board::from_rows(&[[1u8, 2], [2, 1]]).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_swap_cells_moves_identity_with_kind() {
        let mut board = Board::from_rows(&[[1u8, 2, 3], [2, 3, 1], [3, 1, 2]]).unwrap();
        let a = Coord::new(0, 0);
        let b = Coord::new(0, 1);
        let id_a = board.tile(a).unwrap().id;
        let id_b = board.tile(b).unwrap().id;

        assert!(board.swap_cells(a, b));
        assert_eq!(board.kind(a), Some(2));
        assert_eq!(board.kind(b), Some(1));
        assert_eq!(board.tile(a).unwrap().id, id_b);
        assert_eq!(board.tile(b).unwrap().id, id_a);
        // Positions always describe the slot.
        assert_eq!(board.tile(a).unwrap().coord(), a);
        assert_eq!(board.tile(b).unwrap().coord(), b);
    }

    #[test]
    fn test_swap_cells_out_of_bounds_is_noop() {
        let mut board = Board::from_rows(&[[1u8, 2, 3], [2, 3, 1], [3, 1, 2]]).unwrap();
        let before = board.clone();
        assert!(!board.swap_cells(Coord::new(0, 0), Coord::new(0, 3)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_gravity_preserves_column_order() {
        let mut board = Board::from_rows(&[[1u8, 0, 0], [0, 2, 0], [3, 0, 0]]).unwrap();
        let id_top = board.tile(Coord::new(0, 0)).unwrap().id;

        assert!(board.apply_gravity());
        assert_eq!(board.to_rows(), vec![vec![0, 0, 0], vec![1, 0, 0], vec![3, 2, 0]]);
        assert_eq!(board.tile(Coord::new(1, 0)).unwrap().id, id_top);
        assert_eq!(board.tile(Coord::new(0, 0)).unwrap().id, TileId::VACANT);
    }

    #[test]
    fn test_gravity_reports_no_motion_on_compact_columns() {
        let mut board = Board::from_rows(&[[0u8, 0, 0], [1, 0, 0], [2, 3, 0]]).unwrap();
        assert!(!board.apply_gravity());
    }

    #[test]
    fn test_refill_fills_every_hole_with_fresh_ids() {
        let mut board = Board::from_rows(&[[0u8, 0, 1], [0, 2, 1], [3, 2, 0]]).unwrap();
        let mut rng = SimpleRng::new(9);
        assert_eq!(board.refill_empty(4, &mut rng), 4);
        assert_eq!(board.count_empty(), 0);

        let ids: HashSet<TileId> = board.tiles().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 9);
        assert!(board.kinds().all(|k| (1..=4).contains(&k)));
    }

    #[test]
    fn test_initialize_rejects_bad_dimensions() {
        let mut rng = SimpleRng::new(1);
        assert!(matches!(
            Board::initialize(2, 6, &mut rng),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            Board::initialize(8, 2, &mut rng),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_initialize_passes_audit() {
        let mut rng = SimpleRng::new(42);
        let board = Board::initialize(8, 6, &mut rng).unwrap();
        assert_eq!(board.size(), 8);
        assert!(board.audit().is_ok());
    }

    #[test]
    fn test_audit_flags_empty_cells_and_runs() {
        let board = Board::from_rows(&[[1u8, 2, 3], [2, 0, 1], [3, 1, 2]]).unwrap();
        assert!(board.audit().unwrap_err().is_internal());

        let board = Board::from_rows(&[[1u8, 1, 1], [2, 3, 2], [3, 2, 3]]).unwrap();
        assert!(board.audit().is_err());
    }

    #[test]
    fn test_display_uses_dots_for_holes() {
        let board = Board::from_rows(&[[1u8, 0, 3], [2, 3, 1], [3, 1, 2]]).unwrap();
        assert_eq!(board.to_string(), "1.3\n231\n312\n");
    }
}
