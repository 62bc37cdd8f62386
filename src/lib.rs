//! Match-3 (workspace facade crate).
//!
//! Re-exports the member crates under short names so front-ends and tests can
//! depend on a single package:
//!
//! - [`core`]: the board engine
//! - [`input`]: key mapping and cursor
//! - [`term`]: framebuffer renderer and game view
//! - [`types`]: shared plain data

pub mod cli;

pub use match3_core as core;
pub use match3_input as input;
pub use match3_term as term;
pub use match3_types as types;
