//! Legal-move search
//!
//! A move is legal when swapping two edge-adjacent cells leaves at least one
//! run of three on the board. Used for deadlock detection after every cascade
//! and for hints.

use crate::board::Board;
use crate::matcher::has_run;
use crate::types::Coord;

/// Every candidate swap, each unordered pair once: right and down neighbours
/// in row-major order.
fn candidate_swaps(size: u8) -> impl Iterator<Item = (Coord, Coord)> {
    (0..size).flat_map(move |row| {
        (0..size).flat_map(move |col| {
            let here = Coord::new(row, col);
            [here.offset(0, 1, size), here.offset(1, 0, size)]
                .into_iter()
                .flatten()
                .map(move |there| (here, there))
        })
    })
}

/// Tentatively swap `a` and `b`, check for a run, then swap back.
///
/// The board is left exactly as it was.
pub fn swap_creates_match(board: &mut Board, a: Coord, b: Coord) -> bool {
    if board.kind(a) == board.kind(b) {
        // Swapping equal kinds changes nothing.
        return has_run(board);
    }
    if !board.swap_cells(a, b) {
        return false;
    }
    let hit = has_run(board);
    board.swap_cells(a, b);
    hit
}

/// First legal move in row-major order, if any
pub fn find_legal_move(board: &Board) -> Option<(Coord, Coord)> {
    let mut probe = board.clone();
    candidate_swaps(board.size()).find(|&(a, b)| swap_creates_match(&mut probe, a, b))
}

/// Every legal move in row-major order
pub fn legal_moves(board: &Board) -> Vec<(Coord, Coord)> {
    let mut probe = board.clone();
    candidate_swaps(board.size())
        .filter(|&(a, b)| swap_creates_match(&mut probe, a, b))
        .collect()
}

pub fn has_legal_move(board: &Board) -> bool {
    find_legal_move(board).is_some()
}
