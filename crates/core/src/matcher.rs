//! Match detection
//!
//! Detection runs in two passes:
//!
//! 1. **Base runs** - every maximal horizontal or vertical run of at least
//!    [`MIN_RUN_LENGTH`] equal, non-empty tiles.
//! 2. **Region expansion** - a breadth-first flood fill (4-directional, scoped to
//!    one tile kind) from the base-run cells. Same-kind tiles that merely touch a
//!    run are swept into the same match, so L, T and longer snake shapes clear
//!    as one event.
//!
//! Diagonal contact never joins a region, and regions of different kinds never
//! merge. The same function validates swaps and drives cascades.

use std::collections::VecDeque;

use tracing::trace;

use crate::board::Board;
use crate::types::{Coord, TileType, EMPTY_TILE, MIN_RUN_LENGTH};

/// A set of board coordinates, stored as a bit-mask over the grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSet {
    size: u8,
    mask: Vec<bool>,
    len: usize,
}

impl MatchSet {
    /// Empty set for a `size`×`size` board
    pub fn new(size: u8) -> Self {
        let n = size as usize;
        Self {
            size,
            mask: vec![false; n * n],
            len: 0,
        }
    }

    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if c.row >= self.size || c.col >= self.size {
            return None;
        }
        Some(c.row as usize * self.size as usize + c.col as usize)
    }

    /// Add a coordinate. Returns false if it was already present or off-board.
    pub fn insert(&mut self, c: Coord) -> bool {
        match self.index(c) {
            Some(i) if !self.mask[i] => {
                self.mask[i] = true;
                self.len += 1;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.index(c).map(|i| self.mask[i]).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Board edge length this set was built for
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Members in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        let n = self.size as usize;
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &hit)| hit)
            .map(move |(i, _)| Coord::new((i / n) as u8, (i % n) as u8))
    }

    pub fn to_vec(&self) -> Vec<Coord> {
        self.iter().collect()
    }
}

/// One connected group of same-kind matched cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRegion {
    pub kind: TileType,
    /// Cells in row-major order
    pub cells: Vec<Coord>,
}

impl MatchRegion {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Scan one line of cells for runs, calling `hit` for every cell in a run.
///
/// `at(i)` yields the kind of the i-th cell of the line.
fn scan_line(len: usize, at: impl Fn(usize) -> TileType, mut hit: impl FnMut(usize)) {
    let mut start = 0;
    while start < len {
        let kind = at(start);
        let mut end = start + 1;
        while end < len && at(end) == kind {
            end += 1;
        }
        if kind != EMPTY_TILE && end - start >= MIN_RUN_LENGTH {
            (start..end).for_each(&mut hit);
        }
        start = end;
    }
}

/// Cells belonging to a straight run of three or more (no expansion)
pub fn base_runs(board: &Board) -> MatchSet {
    let n = board.size() as usize;
    let mut set = MatchSet::new(board.size());

    for row in 0..n {
        scan_line(n, |col| board.kind_at(row, col), |col| {
            set.insert(Coord::new(row as u8, col as u8));
        });
    }
    for col in 0..n {
        scan_line(n, |row| board.kind_at(row, col), |row| {
            set.insert(Coord::new(row as u8, col as u8));
        });
    }

    set
}

/// True if any straight run of three or more exists.
///
/// Allocation-free early-exit variant of [`base_runs`], used by move search.
pub fn has_run(board: &Board) -> bool {
    let n = board.size() as usize;
    let run_in = |at: &dyn Fn(usize) -> TileType| {
        let mut count = 1;
        for i in 1..n {
            let kind = at(i);
            if kind != EMPTY_TILE && kind == at(i - 1) {
                count += 1;
                if count >= MIN_RUN_LENGTH {
                    return true;
                }
            } else {
                count = 1;
            }
        }
        false
    };

    (0..n).any(|row| run_in(&|col| board.kind_at(row, col)))
        || (0..n).any(|col| run_in(&|row| board.kind_at(row, col)))
}

/// Expanded match regions, one per connected same-kind component.
///
/// Regions are ordered by their first cell in row-major order.
pub fn detect_regions(board: &Board) -> Vec<MatchRegion> {
    let base = base_runs(board);
    let mut regions = Vec::new();
    if base.is_empty() {
        return regions;
    }

    let size = board.size();
    let mut seen = MatchSet::new(size);
    let mut queue = VecDeque::new();

    for start in base.iter() {
        if seen.contains(start) {
            continue;
        }
        let kind = board.kind_at(start.row as usize, start.col as usize);
        let mut cells = Vec::new();

        seen.insert(start);
        queue.push_back(start);
        while let Some(c) = queue.pop_front() {
            cells.push(c);
            for next in c.neighbors(size) {
                if !seen.contains(next)
                    && board.kind_at(next.row as usize, next.col as usize) == kind
                {
                    seen.insert(next);
                    queue.push_back(next);
                }
            }
        }

        cells.sort_unstable();
        trace!(kind, cells = cells.len(), "match region");
        regions.push(MatchRegion { kind, cells });
    }

    regions
}

/// All matched coordinates on the board: base runs plus their expansion.
pub fn detect(board: &Board) -> MatchSet {
    let mut set = MatchSet::new(board.size());
    for region in detect_regions(board) {
        for c in region.cells {
            set.insert(c);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[TileType]]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_match_set_basics() {
        let mut set = MatchSet::new(4);
        assert!(set.is_empty());
        assert!(set.insert(Coord::new(2, 1)));
        assert!(!set.insert(Coord::new(2, 1)));
        assert!(!set.insert(Coord::new(4, 0)));
        assert!(set.insert(Coord::new(0, 3)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_vec(), vec![Coord::new(0, 3), Coord::new(2, 1)]);
        assert!(!set.contains(Coord::new(9, 9)));
    }

    #[test]
    fn test_no_run_detects_nothing() {
        let b = board(&[&[1, 2, 1, 2], &[2, 1, 2, 1], &[1, 2, 1, 2], &[2, 1, 2, 1]]);
        assert!(detect(&b).is_empty());
        assert!(!has_run(&b));
        assert!(detect_regions(&b).is_empty());
    }

    #[test]
    fn test_horizontal_and_vertical_runs() {
        let b = board(&[&[1, 1, 1, 2], &[2, 3, 4, 2], &[3, 4, 3, 2], &[4, 3, 4, 3]]);
        let found = detect(&b);
        assert_eq!(
            found.to_vec(),
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(0, 2),
                Coord::new(0, 3),
                Coord::new(1, 3),
                Coord::new(2, 3),
            ]
        );
        // The row-0 run of 1s and the column-3 run of 2s are separate regions.
        let regions = detect_regions(&b);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].kind, 1);
        assert_eq!(regions[0].len(), 3);
        assert_eq!(regions[1].kind, 2);
        assert_eq!(regions[1].len(), 3);
    }

    #[test]
    fn test_expansion_sweeps_touching_same_kind_cells() {
        // Run of 1s on row 1; the 1 at (0,0) and the bend at (2,2),(2,3) touch it.
        let b = board(&[&[1, 2, 3, 4], &[1, 1, 1, 2], &[3, 4, 1, 1], &[2, 3, 4, 3]]);
        let found = detect(&b);
        assert_eq!(found.len(), 6);
        for c in [(0, 0), (1, 0), (1, 1), (1, 2), (2, 2), (2, 3)] {
            assert!(found.contains(Coord::new(c.0, c.1)), "missing {:?}", c);
        }
        // Base runs alone would only report the straight three.
        assert_eq!(base_runs(&b).len(), 3);
    }

    #[test]
    fn test_diagonal_contact_does_not_join() {
        let b = board(&[&[1, 1, 1, 2], &[2, 3, 4, 1], &[3, 4, 3, 2], &[4, 3, 4, 3]]);
        // (1,3) is a 1 touching the run only diagonally.
        let found = detect(&b);
        assert_eq!(found.len(), 3);
        assert!(!found.contains(Coord::new(1, 3)));
    }

    #[test]
    fn test_empty_cells_never_match() {
        let b = board(&[&[0, 0, 0, 0], &[0, 0, 0, 0], &[1, 2, 1, 2], &[2, 1, 2, 1]]);
        assert!(detect(&b).is_empty());
        assert!(!has_run(&b));
    }

    #[test]
    fn test_expansion_stops_at_other_kinds() {
        // Two 2s hang below the run of 1s; they belong to no run of their own.
        let b = board(&[&[1, 1, 1, 3], &[2, 2, 4, 3], &[3, 4, 2, 4], &[4, 3, 4, 2]]);
        let found = detect(&b);
        assert_eq!(found.len(), 3);
        assert!(!found.contains(Coord::new(1, 0)));
    }

    #[test]
    fn test_has_run_finds_vertical_runs() {
        let b = board(&[&[1, 2, 3], &[1, 3, 2], &[1, 2, 3]]);
        assert!(has_run(&b));
        assert_eq!(detect(&b).len(), 3);
    }
}
