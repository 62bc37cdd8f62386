//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`crate::types::GameAction`] and keeps the board cursor that
//! turns movement actions into the coordinate a click lands on.

pub mod cursor;
pub mod map;

pub use match3_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, should_quit};
