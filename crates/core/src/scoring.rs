//! Scoring module - chain-multiplied tile points
//!
//! Every tile removed in chain step `i` of a cascade is worth
//! `points_per_tile * i`, so a cascade with per-step match counts
//! `m_1, m_2, ..., m_j` adds `Σ m_i * points_per_tile * i`.

/// Points for one chain step
///
/// `chain` is 1-based: the matches produced directly by the swap are chain 1.
pub fn chain_score(matched: usize, chain: u32, points_per_tile: u32) -> u32 {
    let matched = u32::try_from(matched).unwrap_or(u32::MAX);
    matched
        .saturating_mul(points_per_tile)
        .saturating_mul(chain)
}

/// Total points for a whole cascade, given the match count of each step in order
pub fn cascade_score(matches_per_step: &[usize], points_per_tile: u32) -> u32 {
    matches_per_step
        .iter()
        .zip(1u32..)
        .fold(0u32, |acc, (&m, chain)| {
            acc.saturating_add(chain_score(m, chain, points_per_tile))
        })
}

/// Banner shown for chain steps after the first ("Chain x3!")
pub fn chain_banner(chain: u32) -> Option<String> {
    (chain >= 2).then(|| format!("Chain x{}!", chain))
}
