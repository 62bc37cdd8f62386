//! Engine configuration
//!
//! Board size and colour count are supplied once, when a controller is built.
//! Values come from [`EngineConfig::default`], from `MATCH3_*` environment
//! variables via [`EngineConfig::from_env`], or from any serde source.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::board::validate_dimensions;
use crate::error::EngineError;
use crate::types::{
    DEFAULT_BOARD_SIZE, DEFAULT_TILE_TYPES, GRAVITY_PAUSE_MS, MARK_PAUSE_MS, POINTS_PER_TILE,
    REFILL_PAUSE_MS,
};

/// Delays between cascade stages, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagePauses {
    /// Matched cells stay marked this long before gravity
    pub mark_ms: u32,
    /// Pause after gravity, before refill
    pub gravity_ms: u32,
    /// Pause after refill, before re-detection
    pub refill_ms: u32,
}

impl Default for StagePauses {
    fn default() -> Self {
        Self {
            mark_ms: MARK_PAUSE_MS,
            gravity_ms: GRAVITY_PAUSE_MS,
            refill_ms: REFILL_PAUSE_MS,
        }
    }
}

impl StagePauses {
    /// No pauses at all: a cascade completes on the next tick
    pub const fn instant() -> Self {
        Self {
            mark_ms: 0,
            gravity_ms: 0,
            refill_ms: 0,
        }
    }

    pub fn is_instant(&self) -> bool {
        *self == Self::instant()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_size: u8,
    pub tile_types: u8,
    pub points_per_tile: u32,
    /// RNG seed; `None` seeds from the clock
    pub seed: Option<u32>,
    pub pauses: StagePauses,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            tile_types: DEFAULT_TILE_TYPES,
            points_per_tile: POINTS_PER_TILE,
            seed: None,
            pauses: StagePauses::default(),
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    ///
    /// `MATCH3_BOARD_SIZE`, `MATCH3_TILE_TYPES`, `MATCH3_POINTS_PER_TILE`,
    /// `MATCH3_SEED`, `MATCH3_INSTANT`. Unset or unparsable values keep their
    /// defaults; call [`validate`](Self::validate) before use.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        let instant = lookup("MATCH3_INSTANT")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            board_size: parsed(&lookup, "MATCH3_BOARD_SIZE").unwrap_or(defaults.board_size),
            tile_types: parsed(&lookup, "MATCH3_TILE_TYPES").unwrap_or(defaults.tile_types),
            points_per_tile: parsed(&lookup, "MATCH3_POINTS_PER_TILE")
                .unwrap_or(defaults.points_per_tile),
            seed: parsed(&lookup, "MATCH3_SEED"),
            pauses: if instant {
                StagePauses::instant()
            } else {
                defaults.pauses
            },
        }
    }

    /// Reject sizes and colour counts the engine cannot honour
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_dimensions(self.board_size, self.tile_types)?;
        if self.points_per_tile == 0 {
            return Err(EngineError::InvalidConfig(
                "points per tile must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The configured seed, or one derived from the clock
    pub fn effective_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, board_size: u8, tile_types: u8) -> Self {
        self.board_size = board_size;
        self.tile_types = tile_types;
        self
    }

    pub fn instant(mut self) -> Self {
        self.pauses = StagePauses::instant();
        self
    }
}
