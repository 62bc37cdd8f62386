//! Core engine module - pure, deterministic, and testable
//!
//! This crate owns every rule of the match-3 board: generation, swaps, match
//! detection, cascades, scoring and deadlock detection. It has **no
//! dependencies** on terminals, audio or I/O:
//!
//! - **Deterministic**: the same seed produces the same boards and cascades
//! - **Testable**: every stage can be driven one step at a time
//! - **Portable**: terminal, GUI or headless front-ends drive it the same way
//!
//! # Module Structure
//!
//! - [`board`]: N×N tile arena with swaps, gravity, refill and auditing
//! - [`matcher`]: base-run detection plus same-kind region expansion
//! - [`moves`]: legal-move search for hints and deadlock detection
//! - [`cascade`]: the mark / gravity / refill / detect stage machine
//! - [`controller`]: the click-driven state machine front-ends talk to
//! - [`scoring`]: chain-multiplied points
//! - [`config`]: board size, colours, points and stage pauses
//! - [`observer`]: outbound effect, message and board-change notifications
//! - [`snapshot`]: plain-data view for renderers
//! - [`rng`]: seeded LCG
//!
//! # Rules
//!
//! - A swap is only legal between edge-adjacent cells and only sticks if it
//!   creates a run of three or more; otherwise it is reverted.
//! - A run sweeps up every same-kind tile connected to it (4-directionally).
//! - Chain step `i` scores `matched * points_per_tile * i`.
//! - When no swap on the settled board would create a run, the round is
//!   deadlocked until it is reset.
//!
//! # Example
//!
//! ```
//! use match3_core::{ClickOutcome, ControllerState, EngineConfig, EventLog, SwapController};
//!
//! let config = EngineConfig::default().with_seed(12345).instant();
//! let mut game = SwapController::new(config, EventLog::new()).unwrap();
//!
//! let (a, b) = game.hint().expect("a fresh board always has a move");
//! assert_eq!(game.attempt_swap(a, b).unwrap(), ClickOutcome::Resolving);
//!
//! game.settle().unwrap();
//! assert!(game.score() >= 30);
//! assert_ne!(game.state(), ControllerState::Resolving);
//! ```
//!
//! # Timing
//!
//! Cascades advance in [`SwapController::tick`], which front-ends call every
//! frame with the elapsed time. Matched cells stay marked for 250ms, gravity
//! and refill are each followed by a 120ms pause. [`SwapController::settle`]
//! skips the pauses.

pub mod board;
pub mod cascade;
pub mod config;
pub mod controller;
pub mod error;
pub mod matcher;
pub mod moves;
pub mod observer;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Tile, TileId};
pub use cascade::{CascadeOutcome, CascadeResolver, CascadeStage, ChainStep, StageReport};
pub use config::{EngineConfig, StagePauses};
pub use controller::{ClickOutcome, ControllerState, SwapController, SwapRejection};
pub use error::EngineError;
pub use matcher::{MatchRegion, MatchSet};
pub use observer::{EventLog, Observer};
pub use rng::SimpleRng;
pub use scoring::chain_score;
pub use snapshot::EngineSnapshot;
