//! Match detection and legal-move search on hand-built boards

use match3::core::{matcher, moves, Board, SimpleRng};
use match3::types::Coord;

fn board(rows: &[&[u8]]) -> Board {
    Board::from_rows(rows).unwrap()
}

fn coords(list: &[(u8, u8)]) -> Vec<Coord> {
    list.iter().map(|&(r, c)| Coord::new(r, c)).collect()
}

#[test]
fn test_t_shape_is_one_region() {
    let b = board(&[&[1, 1, 1, 2], &[2, 1, 3, 4], &[3, 1, 4, 2], &[4, 2, 3, 3]]);
    let regions = matcher::detect_regions(&b);
    assert_eq!(regions.len(), 1);
    assert_eq!(
        regions[0].cells,
        coords(&[(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)])
    );
}

#[test]
fn test_snake_attached_to_a_run_is_swept_up() {
    let b = board(&[
        &[1, 1, 1, 2, 3],
        &[2, 3, 1, 1, 2],
        &[3, 4, 2, 1, 1],
        &[4, 2, 3, 4, 1],
        &[2, 3, 4, 2, 3],
    ]);
    assert_eq!(matcher::base_runs(&b).len(), 3);

    let found = matcher::detect(&b);
    assert_eq!(
        found.to_vec(),
        coords(&[
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 2),
            (1, 3),
            (2, 3),
            (2, 4),
            (3, 4)
        ])
    );
}

#[test]
fn test_disjoint_runs_of_one_kind_stay_separate() {
    let b = board(&[
        &[1, 1, 1, 2, 3],
        &[2, 3, 4, 3, 2],
        &[3, 4, 2, 4, 3],
        &[2, 3, 4, 2, 4],
        &[1, 1, 1, 3, 2],
    ]);
    let regions = matcher::detect_regions(&b);
    assert_eq!(regions.len(), 2);
    assert!(regions.iter().all(|r| r.kind == 1 && r.len() == 3));
    assert_eq!(matcher::detect(&b).len(), 6);
}

#[test]
fn test_swap_fixture_produces_four_cell_match() {
    let mut b = board(&[&[1, 1, 3, 1], &[2, 3, 1, 2], &[3, 4, 2, 4], &[4, 2, 4, 3]]);
    assert!(matcher::detect(&b).is_empty());

    b.swap_cells(Coord::new(0, 2), Coord::new(1, 2));
    assert_eq!(b.to_rows()[0], vec![1, 1, 1, 1]);
    assert_eq!(matcher::detect(&b).len(), 4);
}

#[test]
fn test_checkerboard_swap_yields_nothing() {
    let mut b = board(&[&[1, 2, 1, 2], &[2, 1, 2, 1], &[1, 2, 1, 2], &[2, 1, 2, 1]]);
    b.swap_cells(Coord::new(0, 0), Coord::new(0, 1));
    assert_eq!(b.to_rows()[0], vec![2, 1, 1, 2]);
    assert!(matcher::detect(&b).is_empty());
}

/// Reference search: try every adjacent swap and run the full detector.
fn brute_force_moves(board: &Board) -> Vec<(Coord, Coord)> {
    let n = board.size();
    let mut found = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let a = Coord::new(row, col);
            for b in [Coord::new(row, col + 1), Coord::new(row + 1, col)] {
                if !board.contains(b) {
                    continue;
                }
                let mut probe = board.clone();
                probe.swap_cells(a, b);
                if !matcher::detect(&probe).is_empty() {
                    found.push((a, b));
                }
            }
        }
    }
    found
}

#[test]
fn test_legal_moves_agree_with_brute_force() {
    for seed in 1..60 {
        let mut rng = SimpleRng::new(seed);
        let size = 4 + (seed % 4) as u8;
        let types = 3 + (seed % 3) as u8;
        let b = Board::initialize(size, types, &mut rng).unwrap();

        let expected = brute_force_moves(&b);
        assert_eq!(moves::legal_moves(&b), expected, "seed {}", seed);
        assert_eq!(moves::has_legal_move(&b), !expected.is_empty());
        assert_eq!(moves::find_legal_move(&b), expected.first().copied());
    }
}

#[test]
fn test_latin_square_has_no_move() {
    let b = board(&[&[1, 2, 3, 4], &[2, 3, 4, 1], &[3, 4, 1, 2], &[4, 1, 2, 3]]);
    assert!(brute_force_moves(&b).is_empty());
    assert!(!moves::has_legal_move(&b));
}
