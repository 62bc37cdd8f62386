//! Outbound notifications
//!
//! The controller calls its [`Observer`] after every mutation instead of
//! exposing reactive state. Audio, animation and rendering layers implement
//! the trait; the engine never knows what they do with the calls.

use crate::board::Board;
use crate::types::Effect;

/// Receiver for engine notifications
pub trait Observer {
    /// A named effect happened
    fn on_effect(&mut self, effect: Effect);

    /// A human-readable message ("Chain x3!", "No more moves")
    fn on_message(&mut self, _message: &str) {}

    /// The board was mutated
    fn on_board_changed(&mut self, _board: &Board) {}
}

/// No-op observer
impl Observer for () {
    fn on_effect(&mut self, _effect: Effect) {}
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_effect(&mut self, effect: Effect) {
        (**self).on_effect(effect);
    }

    fn on_message(&mut self, message: &str) {
        (**self).on_message(message);
    }

    fn on_board_changed(&mut self, board: &Board) {
        (**self).on_board_changed(board);
    }
}

/// Recording observer
///
/// Keeps every effect and message until drained. Used by the terminal front
/// end (which drains it once per frame) and by tests.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    effects: Vec<Effect>,
    messages: Vec<String>,
    board_changes: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// How many board mutations were reported since the last drain
    pub fn board_changes(&self) -> u32 {
        self.board_changes
    }

    pub fn last_effect(&self) -> Option<Effect> {
        self.effects.last().copied()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn clear(&mut self) {
        self.effects.clear();
        self.messages.clear();
        self.board_changes = 0;
    }
}

impl Observer for EventLog {
    fn on_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn on_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn on_board_changed(&mut self, _board: &Board) {
        self.board_changes = self.board_changes.saturating_add(1);
    }
}
