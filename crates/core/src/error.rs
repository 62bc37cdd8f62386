//! Engine error types.
//!
//! Rejected swaps (non-adjacent target, adjacent swap without a match) are not
//! errors: the controller recovers from them locally and reports them through
//! [`ClickOutcome`](crate::controller::ClickOutcome). Only faults the caller has
//! to know about travel as [`EngineError`].

use derive_more::{Display, Error};

use crate::types::Coord;

/// Error surfaced by the engine to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// A coordinate outside the board was supplied.
    #[display("Coordinate {} is outside the board", _0)]
    OutOfBounds(#[error(not(source))] Coord),

    /// Configuration rejected before a board was built.
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(#[error(not(source))] String),

    /// The board broke one of its structural invariants (internal bug).
    #[display("Board invariant violation: {}", _0)]
    BoardInvariantViolation(#[error(not(source))] String),
}

impl EngineError {
    /// Whether this error indicates an engine bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, EngineError::BoardInvariantViolation(_))
    }
}
