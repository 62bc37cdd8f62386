//! Cascade resolution
//!
//! After a swap produces a match the board runs through a fixed cycle of
//! stages until nothing matches any more:
//!
//! ```text
//! MarkMatches -> (mark pause) -> ApplyGravity -> (gravity pause)
//!     -> Refill -> (refill pause) -> Detect -> MarkMatches | done
//! ```
//!
//! [`CascadeResolver::step`] executes exactly one stage and reports how long
//! the caller should wait before the next one. The controller drives it from
//! its fixed-timestep `tick`; [`CascadeResolver::resolve`] runs every stage
//! back to back for callers that do not animate.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::config::StagePauses;
use crate::matcher::{self, MatchSet};
use crate::rng::SimpleRng;
use crate::scoring::chain_score;
use crate::types::Effect;

/// One stage of the cascade loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStage {
    /// Score the pending matches and set their cells to kind 0
    MarkMatches,
    /// Compact every column toward the bottom
    ApplyGravity,
    /// Give every empty cell a new random tile
    Refill,
    /// Look for matches created by the fall and the refill
    Detect,
}

impl CascadeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeStage::MarkMatches => "mark_matches",
            CascadeStage::ApplyGravity => "apply_gravity",
            CascadeStage::Refill => "refill",
            CascadeStage::Detect => "detect",
        }
    }
}

/// What a single [`CascadeResolver::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: CascadeStage,
    /// Delay before the next stage may run
    pub pause_ms: u32,
    /// Effect to announce, if any
    pub effect: Option<Effect>,
}

/// One iteration of the cascade loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    /// 1-based chain index
    pub chain: u32,
    /// Cells removed in this step
    pub matched: usize,
    pub score: u32,
}

/// Result of a fully resolved cascade
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub total_score: u32,
    pub chain_count: u32,
    pub chains: Vec<ChainStep>,
}

/// Iterative cascade state machine
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    /// Stage the next `step` will run; `None` once resolved
    next: Option<CascadeStage>,
    /// Matches waiting to be marked
    pending: MatchSet,
    /// Cells marked by the last `MarkMatches`, cleared by gravity
    marked: MatchSet,
    points_per_tile: u32,
    tile_types: u8,
    pauses: StagePauses,
    outcome: CascadeOutcome,
}

impl CascadeResolver {
    /// Start a cascade from the matches a swap produced.
    ///
    /// An empty `initial` set yields a resolver that is already finished.
    pub fn new(
        initial: MatchSet,
        points_per_tile: u32,
        tile_types: u8,
        pauses: StagePauses,
    ) -> Self {
        let next = (!initial.is_empty()).then_some(CascadeStage::MarkMatches);
        let size = initial.size();
        Self {
            next,
            pending: initial,
            marked: MatchSet::new(size),
            points_per_tile,
            tile_types,
            pauses,
            outcome: CascadeOutcome::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next.is_none()
    }

    /// Stage the next call to [`step`](Self::step) will execute
    pub fn next_stage(&self) -> Option<CascadeStage> {
        self.next
    }

    /// Chain iterations so far
    pub fn chain_count(&self) -> u32 {
        self.outcome.chain_count
    }

    pub fn total_score(&self) -> u32 {
        self.outcome.total_score
    }

    /// Cells removed by the current chain step, while they are still shown as
    /// removed (between marking and gravity)
    pub fn marked(&self) -> Option<&MatchSet> {
        (!self.marked.is_empty()).then_some(&self.marked)
    }

    pub fn outcome(&self) -> &CascadeOutcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> CascadeOutcome {
        self.outcome
    }

    /// Execute exactly one stage. Returns `None` once the cascade is resolved.
    pub fn step(&mut self, board: &mut Board, rng: &mut SimpleRng) -> Option<StageReport> {
        let stage = self.next?;

        let report = match stage {
            CascadeStage::MarkMatches => {
                let chain = self.outcome.chain_count + 1;
                let matched = self.pending.len();
                let score = chain_score(matched, chain, self.points_per_tile);

                board.clear_cells(&self.pending);
                self.marked = mem::replace(&mut self.pending, MatchSet::new(board.size()));

                self.outcome.chain_count = chain;
                self.outcome.total_score = self.outcome.total_score.saturating_add(score);
                self.outcome.chains.push(ChainStep {
                    chain,
                    matched,
                    score,
                });
                debug!(chain, matched, score, "matches marked");

                self.next = Some(CascadeStage::ApplyGravity);
                StageReport {
                    stage,
                    pause_ms: self.pauses.mark_ms,
                    effect: Some(Effect::Match),
                }
            }
            CascadeStage::ApplyGravity => {
                let moved = board.apply_gravity();
                self.marked = MatchSet::new(board.size());
                debug!(moved, "gravity applied");

                self.next = Some(CascadeStage::Refill);
                StageReport {
                    stage,
                    pause_ms: self.pauses.gravity_ms,
                    effect: moved.then_some(Effect::Fall),
                }
            }
            CascadeStage::Refill => {
                let filled = board.refill_empty(self.tile_types, rng);
                debug!(filled, "board refilled");

                self.next = Some(CascadeStage::Detect);
                StageReport {
                    stage,
                    pause_ms: self.pauses.refill_ms,
                    effect: None,
                }
            }
            CascadeStage::Detect => {
                let found = matcher::detect(board);
                if found.is_empty() {
                    debug!(
                        chains = self.outcome.chain_count,
                        total = self.outcome.total_score,
                        "cascade resolved"
                    );
                    self.next = None;
                } else {
                    debug!(matched = found.len(), "cascade continues");
                    self.pending = found;
                    self.next = Some(CascadeStage::MarkMatches);
                }
                StageReport {
                    stage,
                    pause_ms: 0,
                    effect: None,
                }
            }
        };

        Some(report)
    }

    /// Run every remaining stage without pausing
    pub fn resolve(mut self, board: &mut Board, rng: &mut SimpleRng) -> CascadeOutcome {
        while self.step(board, rng).is_some() {}
        self.outcome
    }
}

/// Resolve a cascade in one call, starting from `initial`
pub fn resolve(
    board: &mut Board,
    initial: MatchSet,
    points_per_tile: u32,
    tile_types: u8,
    rng: &mut SimpleRng,
) -> CascadeOutcome {
    CascadeResolver::new(initial, points_per_tile, tile_types, StagePauses::instant())
        .resolve(board, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, POINTS_PER_TILE};

    fn fixture() -> Board {
        // Row 0 is a run of four 1s.
        Board::from_rows(&[[1u8, 1, 1, 1], [2, 3, 3, 2], [3, 4, 2, 4], [4, 2, 4, 3]]).unwrap()
    }

    #[test]
    fn test_empty_initial_set_is_already_finished() {
        let mut board = fixture();
        let mut rng = SimpleRng::new(1);
        let mut resolver =
            CascadeResolver::new(MatchSet::new(4), POINTS_PER_TILE, 4, StagePauses::default());
        assert!(resolver.is_finished());
        assert_eq!(resolver.step(&mut board, &mut rng), None);
        assert_eq!(resolver.into_outcome(), CascadeOutcome::default());
    }

    #[test]
    fn test_stages_run_in_order_with_their_pauses() {
        let mut board = fixture();
        let mut rng = SimpleRng::new(7);
        let initial = matcher::detect(&board);
        assert_eq!(initial.len(), 4);

        let pauses = StagePauses::default();
        let mut resolver = CascadeResolver::new(initial, POINTS_PER_TILE, 4, pauses);

        let mark = resolver.step(&mut board, &mut rng).unwrap();
        assert_eq!(mark.stage, CascadeStage::MarkMatches);
        assert_eq!(mark.pause_ms, pauses.mark_ms);
        assert_eq!(mark.effect, Some(Effect::Match));
        assert_eq!(board.count_empty(), 4);
        assert_eq!(resolver.marked().map(|m| m.len()), Some(4));
        assert_eq!(resolver.total_score(), 40);
        assert_eq!(resolver.chain_count(), 1);

        // Row 0 is the top row, so nothing sits above the holes.
        let fall = resolver.step(&mut board, &mut rng).unwrap();
        assert_eq!(fall.stage, CascadeStage::ApplyGravity);
        assert_eq!(fall.pause_ms, pauses.gravity_ms);
        assert_eq!(fall.effect, None);
        assert!(resolver.marked().is_none());

        let refill = resolver.step(&mut board, &mut rng).unwrap();
        assert_eq!(refill.stage, CascadeStage::Refill);
        assert_eq!(refill.pause_ms, pauses.refill_ms);
        assert_eq!(board.count_empty(), 0);

        let detect = resolver.step(&mut board, &mut rng).unwrap();
        assert_eq!(detect.stage, CascadeStage::Detect);
        assert_eq!(detect.pause_ms, 0);
    }

    #[test]
    fn test_gravity_reports_fall_when_tiles_move() {
        // The run sits on row 2; rows 0-1 fall into it.
        let mut board =
            Board::from_rows(&[[2u8, 3, 3, 2], [3, 4, 2, 4], [1, 1, 1, 1], [4, 2, 4, 3]]).unwrap();
        let above = board.tile(Coord::new(1, 0)).unwrap().id;
        let mut rng = SimpleRng::new(3);
        let initial = matcher::detect(&board);
        let mut resolver =
            CascadeResolver::new(initial, POINTS_PER_TILE, 4, StagePauses::instant());

        resolver.step(&mut board, &mut rng);
        let fall = resolver.step(&mut board, &mut rng).unwrap();
        assert_eq!(fall.effect, Some(Effect::Fall));
        assert_eq!(board.tile(Coord::new(2, 0)).unwrap().id, above);
        assert_eq!(board.count_empty(), 4);
    }

    #[test]
    fn test_resolve_leaves_a_stable_board() {
        for seed in 1..40 {
            let mut board = fixture();
            let mut rng = SimpleRng::new(seed);
            let initial = matcher::detect(&board);
            let outcome = resolve(&mut board, initial, POINTS_PER_TILE, 4, &mut rng);

            assert!(outcome.chain_count >= 1);
            assert_eq!(outcome.chains.len(), outcome.chain_count as usize);
            assert_eq!(outcome.chains[0].matched, 4);
            assert_eq!(outcome.chains[0].score, 40);
            assert!(matcher::detect(&board).is_empty(), "seed {}", seed);
            assert_eq!(board.count_empty(), 0);
        }
    }

    #[test]
    fn test_total_score_is_the_weighted_sum_of_chain_steps() {
        for seed in 1..40 {
            let mut board = fixture();
            let mut rng = SimpleRng::new(seed);
            let initial = matcher::detect(&board);
            let outcome = resolve(&mut board, initial, POINTS_PER_TILE, 3, &mut rng);

            let expected: u32 = outcome
                .chains
                .iter()
                .enumerate()
                .map(|(i, step)| step.matched as u32 * 10 * (i as u32 + 1))
                .sum();
            assert_eq!(outcome.total_score, expected);
        }
    }

    #[test]
    fn test_stage_names_match_their_json_form() {
        for stage in [
            CascadeStage::MarkMatches,
            CascadeStage::ApplyGravity,
            CascadeStage::Refill,
            CascadeStage::Detect,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }
}
