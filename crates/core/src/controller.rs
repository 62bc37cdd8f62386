//! Swap controller - the player-facing state machine
//!
//! ```text
//!            click c               click d (adjacent, match)
//!   Idle ------------> Selected(c) --------------------------> Resolving
//!    ^  <-- click c --     |  ^                                    |
//!    |                     |  | click d (not adjacent)             |
//!    |                     |  +-- reselects d                      |
//!    +--- click d (adjacent, no match: swap reverted) ---+         |
//!    ^                                                             |
//!    +------------------ cascade resolved, moves left -------------+
//!                        cascade resolved, no move ----------> Deadlocked
//! ```
//!
//! `force_reset` returns to `Idle` with a fresh board from any state. Clicks are
//! ignored while `Resolving` and while `Deadlocked`.
//!
//! The cascade itself advances in [`SwapController::tick`], one stage at a
//! time, honouring the configured [`StagePauses`](crate::config::StagePauses).

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::board::Board;
use crate::cascade::{CascadeOutcome, CascadeResolver, CascadeStage};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::matcher::{self, MatchSet};
use crate::moves;
use crate::observer::{EventLog, Observer};
use crate::rng::SimpleRng;
use crate::scoring::chain_banner;
use crate::snapshot::EngineSnapshot;
use crate::types::{Coord, Effect};

/// Message sent to the observer when the board deadlocks
pub const NO_MOVES_MESSAGE: &str = "No more moves";

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cell", rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Selected(Coord),
    /// A cascade is running; input is ignored
    Resolving,
    /// No legal move remains; only `force_reset` leaves this state
    Deadlocked,
}

/// Why a click did not lead to a cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapRejection {
    /// The target was not edge-adjacent; it became the new selection
    InvalidAdjacency,
    /// The swap produced no match and was reverted
    NoMatch,
}

/// Result of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickOutcome {
    Selected,
    Deselected,
    Rejected(SwapRejection),
    /// The swap matched; a cascade is now running
    Resolving,
    /// Input is not accepted in the current state
    Ignored,
}

/// The match-3 state machine
///
/// Owns the board, the RNG, the configuration and the observer. Nothing is
/// global: two controllers never share state.
pub struct SwapController<O: Observer = EventLog> {
    config: EngineConfig,
    rng: SimpleRng,
    board: Board,
    state: ControllerState,
    observer: O,
    cascade: Option<CascadeResolver>,
    /// Time left before the next cascade stage
    stage_timer_ms: u32,
    last_cascade: Option<CascadeOutcome>,
    score: u32,
    moves_used: u32,
    chain_count: u32,
    /// Monotonic round id (increments on reset)
    round_id: u32,
}

impl<O: Observer> SwapController<O> {
    /// Validate `config` and start the first round on a generated board
    pub fn new(config: EngineConfig, observer: O) -> Result<Self, EngineError> {
        config.validate()?;
        let seed = config.effective_seed();
        let mut rng = SimpleRng::new(seed);
        let board = Board::generate_playable(config.board_size, config.tile_types, &mut rng)?;
        info!(
            seed,
            size = config.board_size,
            tile_types = config.tile_types,
            "controller created"
        );
        Ok(Self::assemble(config, rng, board, observer))
    }

    /// Start the first round on a caller-supplied board
    ///
    /// The board must be stable (no empty cell, no run) and use only kinds
    /// `1..=config.tile_types`. `config.board_size` is taken from the board.
    pub fn with_board(
        mut config: EngineConfig,
        board: Board,
        observer: O,
    ) -> Result<Self, EngineError> {
        config.board_size = board.size();
        config.validate()?;
        board.audit()?;
        if let Some(tile) = board.tiles().iter().find(|t| t.kind > config.tile_types) {
            return Err(EngineError::BoardInvariantViolation(format!(
                "tile kind {} at {} exceeds the {} configured tile types",
                tile.kind,
                tile.coord(),
                config.tile_types
            )));
        }
        let rng = SimpleRng::new(config.effective_seed());
        Ok(Self::assemble(config, rng, board, observer))
    }

    fn assemble(config: EngineConfig, rng: SimpleRng, board: Board, observer: O) -> Self {
        let mut controller = Self {
            config,
            rng,
            board,
            state: ControllerState::Idle,
            observer,
            cascade: None,
            stage_timer_ms: 0,
            last_cascade: None,
            score: 0,
            moves_used: 0,
            chain_count: 0,
            round_id: 0,
        };
        controller.observer.on_board_changed(&controller.board);
        controller.settle_state();
        controller
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    /// Chain iterations of the running cascade; 0 when none is running
    pub fn chain_count(&self) -> u32 {
        self.chain_count
    }

    pub fn round_id(&self) -> u32 {
        self.round_id
    }

    pub fn is_resolving(&self) -> bool {
        self.state == ControllerState::Resolving
    }

    pub fn is_deadlocked(&self) -> bool {
        self.state == ControllerState::Deadlocked
    }

    /// Cells currently shown as removed (only between marking and gravity)
    pub fn marked(&self) -> Option<&MatchSet> {
        self.cascade.as_ref().and_then(|c| c.marked())
    }

    /// Stage the running cascade will execute next
    pub fn pending_stage(&self) -> Option<CascadeStage> {
        self.cascade.as_ref().and_then(|c| c.next_stage())
    }

    /// Outcome of the most recently completed cascade in this round
    pub fn last_cascade(&self) -> Option<&CascadeOutcome> {
        self.last_cascade.as_ref()
    }

    /// First legal move in row-major order, when input is accepted
    pub fn hint(&self) -> Option<(Coord, Coord)> {
        match self.state {
            ControllerState::Idle | ControllerState::Selected(_) => {
                moves::find_legal_move(&self.board)
            }
            ControllerState::Resolving | ControllerState::Deadlocked => None,
        }
    }

    /// Handle a click on `c`
    #[instrument(level = "debug", skip(self), fields(round = self.round_id))]
    pub fn click(&mut self, c: Coord) -> Result<ClickOutcome, EngineError> {
        if !self.board.contains(c) {
            return Err(EngineError::OutOfBounds(c));
        }

        match self.state {
            ControllerState::Resolving | ControllerState::Deadlocked => {
                debug!(state = ?self.state, "click ignored");
                Ok(ClickOutcome::Ignored)
            }
            ControllerState::Idle => {
                self.state = ControllerState::Selected(c);
                self.observer.on_effect(Effect::Select);
                Ok(ClickOutcome::Selected)
            }
            ControllerState::Selected(selected) if selected == c => {
                self.state = ControllerState::Idle;
                self.observer.on_effect(Effect::Deselect);
                Ok(ClickOutcome::Deselected)
            }
            ControllerState::Selected(selected) if !selected.is_adjacent(c) => {
                self.state = ControllerState::Selected(c);
                self.observer.on_effect(Effect::SwapInvalid);
                Ok(ClickOutcome::Rejected(SwapRejection::InvalidAdjacency))
            }
            ControllerState::Selected(selected) => Ok(self.swap(selected, c)),
        }
    }

    /// Select `a`, then click `b`
    ///
    /// Any previous selection is replaced without an effect.
    #[instrument(level = "debug", skip(self), fields(round = self.round_id))]
    pub fn attempt_swap(&mut self, a: Coord, b: Coord) -> Result<ClickOutcome, EngineError> {
        for c in [a, b] {
            if !self.board.contains(c) {
                return Err(EngineError::OutOfBounds(c));
            }
        }
        if !matches!(
            self.state,
            ControllerState::Idle | ControllerState::Selected(_)
        ) {
            return Ok(ClickOutcome::Ignored);
        }
        self.state = ControllerState::Selected(a);
        self.click(b)
    }

    /// Swap two adjacent cells and either revert or start a cascade
    fn swap(&mut self, a: Coord, b: Coord) -> ClickOutcome {
        self.moves_used = self.moves_used.saturating_add(1);
        self.chain_count = 0;
        self.board.swap_cells(a, b);

        let matches = matcher::detect(&self.board);
        if matches.is_empty() {
            self.board.swap_cells(a, b);
            self.state = ControllerState::Idle;
            self.observer.on_effect(Effect::SwapNoMatch);
            debug!(%a, %b, "swap produced no match, reverted");
            return ClickOutcome::Rejected(SwapRejection::NoMatch);
        }

        debug!(%a, %b, matched = matches.len(), "swap accepted");
        self.state = ControllerState::Resolving;
        self.observer.on_effect(Effect::SwapOk);
        self.observer.on_board_changed(&self.board);
        self.cascade = Some(CascadeResolver::new(
            matches,
            self.config.points_per_tile,
            self.config.tile_types,
            self.config.pauses,
        ));
        self.stage_timer_ms = 0;
        ClickOutcome::Resolving
    }

    /// Advance the running cascade by `elapsed_ms`
    ///
    /// Runs every stage whose pause has elapsed. Returns whether anything
    /// changed. A board that fails its audit once the cascade settles is
    /// reported as [`EngineError::BoardInvariantViolation`] after the
    /// controller has reset itself.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<bool, EngineError> {
        if self.cascade.is_none() {
            return Ok(false);
        }

        if self.stage_timer_ms > 0 {
            self.stage_timer_ms = self.stage_timer_ms.saturating_sub(elapsed_ms);
            if self.stage_timer_ms > 0 {
                return Ok(false);
            }
        }

        while self.cascade.is_some() {
            let pause_ms = self.advance()?;
            if pause_ms > 0 {
                self.stage_timer_ms = pause_ms;
                break;
            }
        }
        Ok(true)
    }

    /// Run the remaining cascade stages back to back, ignoring pauses
    pub fn settle(&mut self) -> Result<(), EngineError> {
        while self.cascade.is_some() {
            self.advance()?;
        }
        self.stage_timer_ms = 0;
        Ok(())
    }

    /// Execute one cascade stage, returning its pause
    fn advance(&mut self) -> Result<u32, EngineError> {
        let Some(cascade) = self.cascade.as_mut() else {
            return Ok(0);
        };

        let Some(report) = cascade.step(&mut self.board, &mut self.rng) else {
            self.finish_cascade()?;
            return Ok(0);
        };

        debug!(
            stage = report.stage.as_str(),
            pause_ms = report.pause_ms,
            "cascade stage"
        );
        if let Some(effect) = report.effect {
            self.observer.on_effect(effect);
        }
        match report.stage {
            CascadeStage::MarkMatches => {
                self.chain_count = cascade.chain_count();
                if let Some(banner) = chain_banner(self.chain_count) {
                    self.observer.on_message(&banner);
                }
                self.observer.on_board_changed(&self.board);
            }
            CascadeStage::ApplyGravity | CascadeStage::Refill => {
                self.observer.on_board_changed(&self.board);
            }
            CascadeStage::Detect => {}
        }

        if cascade.is_finished() {
            self.finish_cascade()?;
            return Ok(0);
        }
        Ok(report.pause_ms)
    }

    fn finish_cascade(&mut self) -> Result<(), EngineError> {
        let Some(cascade) = self.cascade.take() else {
            return Ok(());
        };
        let outcome = cascade.into_outcome();
        self.score = self.score.saturating_add(outcome.total_score);
        self.chain_count = 0;
        self.stage_timer_ms = 0;
        info!(
            round = self.round_id,
            chains = outcome.chain_count,
            gained = outcome.total_score,
            score = self.score,
            "cascade finished"
        );
        self.last_cascade = Some(outcome);

        if let Err(err) = self.board.audit() {
            error!(%err, board = %self.board, "board failed its audit after a cascade");
            self.force_reset()?;
            return Err(err);
        }

        self.settle_state();
        Ok(())
    }

    /// Enter `Idle`, or `Deadlocked` when no legal move exists
    fn settle_state(&mut self) {
        if moves::has_legal_move(&self.board) {
            self.state = ControllerState::Idle;
        } else {
            info!(round = self.round_id, score = self.score, "no legal move left");
            self.state = ControllerState::Deadlocked;
            self.observer.on_effect(Effect::NoMoves);
            self.observer.on_message(NO_MOVES_MESSAGE);
        }
    }

    /// Abort whatever is happening and start a new round
    ///
    /// Any running cascade is discarded. Score, moves and chain count reset,
    /// and `round_id` increments.
    #[instrument(level = "debug", skip(self), fields(round = self.round_id))]
    pub fn force_reset(&mut self) -> Result<(), EngineError> {
        if let ControllerState::Selected(_) = self.state {
            self.observer.on_effect(Effect::Deselect);
        }
        if self.cascade.take().is_some() {
            debug!("in-flight cascade discarded");
        }

        self.board = Board::generate_playable(
            self.config.board_size,
            self.config.tile_types,
            &mut self.rng,
        )?;
        self.stage_timer_ms = 0;
        self.last_cascade = None;
        self.score = 0;
        self.moves_used = 0;
        self.chain_count = 0;
        self.round_id = self.round_id.wrapping_add(1);
        info!(round = self.round_id, "round started");

        self.observer.on_board_changed(&self.board);
        self.settle_state();
        Ok(())
    }

    pub fn snapshot_into(&self, out: &mut EngineSnapshot) {
        out.size = self.board.size();
        out.tiles.clear();
        out.tiles.extend(self.board.kinds());
        out.score = self.score;
        out.moves_used = self.moves_used;
        out.chain_count = self.chain_count;
        out.state = self.state;
        out.marked.clear();
        if let Some(marked) = self.marked() {
            out.marked.extend(marked.iter());
        }
        out.round_id = self.round_id;
        out.stage_timer_ms = self.stage_timer_ms;
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let mut s = EngineSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
