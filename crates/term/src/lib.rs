//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids widget
//! toolkits and renders into a plain framebuffer that is flushed to the
//! terminal backend.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Keep the view pure: an [`EngineSnapshot`](crate::core::EngineSnapshot) in, a framebuffer out
//! - Control the aspect ratio (3 columns per board cell)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use match3_core as core;
pub use match3_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_glyph, GameView, Overlay, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
