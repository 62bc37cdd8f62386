//! Plain-data view of a controller, for renderers and external UI layers

use serde::{Deserialize, Serialize};

use crate::controller::ControllerState;
use crate::types::{Coord, TileType, EMPTY_TILE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Board edge length
    pub size: u8,
    /// Tile kinds, row-major (`row * size + col`)
    pub tiles: Vec<TileType>,
    pub score: u32,
    pub moves_used: u32,
    pub chain_count: u32,
    pub state: ControllerState,
    /// Cells shown as removed; empty outside the marked window
    pub marked: Vec<Coord>,
    pub round_id: u32,
    /// Time left before the next cascade stage runs
    pub stage_timer_ms: u32,
}

impl EngineSnapshot {
    pub fn clear(&mut self) {
        self.size = 0;
        self.tiles.clear();
        self.score = 0;
        self.moves_used = 0;
        self.chain_count = 0;
        self.state = ControllerState::Idle;
        self.marked.clear();
        self.round_id = 0;
        self.stage_timer_ms = 0;
    }

    /// Tile kind at `c`; out-of-range coordinates read as empty
    pub fn kind(&self, c: Coord) -> TileType {
        if c.row >= self.size || c.col >= self.size {
            return EMPTY_TILE;
        }
        self.tiles
            .get(c.row as usize * self.size as usize + c.col as usize)
            .copied()
            .unwrap_or(EMPTY_TILE)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileType]> {
        self.tiles.chunks(self.size.max(1) as usize)
    }

    pub fn is_marked(&self, c: Coord) -> bool {
        self.marked.contains(&c)
    }

    pub fn selected(&self) -> Option<Coord> {
        match self.state {
            ControllerState::Selected(c) => Some(c),
            _ => None,
        }
    }

    /// Whether a click would be accepted
    pub fn accepts_input(&self) -> bool {
        matches!(
            self.state,
            ControllerState::Idle | ControllerState::Selected(_)
        )
    }

    pub fn deadlocked(&self) -> bool {
        self.state == ControllerState::Deadlocked
    }
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        let mut s = Self {
            size: 0,
            tiles: Vec::new(),
            score: 0,
            moves_used: 0,
            chain_count: 0,
            state: ControllerState::Idle,
            marked: Vec::new(),
            round_id: 0,
            stage_timer_ms: 0,
        };
        s.clear();
        s
    }
}
