use ahash::RandomState;
use smallvec::SmallVec;
use std::hash::{BuildHasher, Hash, Hasher};

/// Sentinel rank of an empty cell. Real ranks live in `[0, MAX_RANK)`.
pub const MAX_RANK: u32 = u32::MAX;

/// One `(x, y)` per round; inline for the usual handful of rounds.
pub type Coords = SmallVec<[(usize, usize); 8]>;

/// Maps an edge identity to its grid coordinates and tie-break rank.
///
/// Implementations must be pure: the same `(source, dest, depth, width)`
/// always yields the same answer.
pub trait CoordinateScheme: Send + Sync {
    fn coordinates_and_rank(
        &self,
        source: &str,
        dest: &str,
        depth: usize,
        width: usize,
    ) -> (Coords, u32);
}

const RANK_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];
const ROUND_SEED: u64 = 0x4528_21e6_38d0_1377;

#[inline(always)]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seeds for round `i`, all derived from the round index.
#[inline]
fn round_state(i: usize) -> RandomState {
    let s0 = splitmix64(ROUND_SEED ^ i as u64);
    let s1 = splitmix64(s0);
    let s2 = splitmix64(s1);
    let s3 = splitmix64(s2);
    RandomState::with_seeds(s0, s1, s2, s3)
}

/// Fixed-seed `ahash` scheme.
#[derive(Debug, Clone, Default)]
pub struct SeededCoordinates;

impl SeededCoordinates {
    pub fn rank(source: &str, dest: &str) -> u32 {
        let state = RandomState::with_seeds(RANK_SEEDS[0], RANK_SEEDS[1], RANK_SEEDS[2], RANK_SEEDS[3]);
        let mut h = state.build_hasher();
        (source, dest).hash(&mut h);
        (h.finish() % MAX_RANK as u64) as u32
    }

    #[inline]
    fn slot(state: &RandomState, id: &str, width: usize) -> usize {
        let mut h = state.build_hasher();
        id.hash(&mut h);
        (h.finish() % width as u64) as usize
    }
}

impl CoordinateScheme for SeededCoordinates {
    fn coordinates_and_rank(
        &self,
        source: &str,
        dest: &str,
        depth: usize,
        width: usize,
    ) -> (Coords, u32) {
        let coords = (0..depth)
            .map(|i| {
                let state = round_state(i);
                (
                    Self::slot(&state, source, width),
                    Self::slot(&state, dest, width),
                )
            })
            .collect();
        (coords, Self::rank(source, dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let s = SeededCoordinates;
        let a = s.coordinates_and_rank("10", "20", 5, 1000);
        let b = s.coordinates_and_rank("10", "20", 5, 1000);
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 5);
        assert!(a.1 < MAX_RANK);
    }

    #[test]
    fn coordinates_within_width() {
        let s = SeededCoordinates;
        for n in 0..200 {
            let (coords, _) = s.coordinates_and_rank(&n.to_string(), &(n * 7).to_string(), 4, 13);
            assert!(coords.iter().all(|&(x, y)| x < 13 && y < 13));
        }
    }

    #[test]
    fn direction_matters_for_rank() {
        // ordered pair identity: (a,b) and (b,a) are different edges
        let distinct = (0..50)
            .filter(|n| {
                let a = n.to_string();
                let b = (n + 1000).to_string();
                SeededCoordinates::rank(&a, &b) != SeededCoordinates::rank(&b, &a)
            })
            .count();
        assert!(distinct > 45);
    }

    #[test]
    fn rounds_are_independent() {
        // source slot in round 0 vs round 1 should not be systematically equal
        let s = SeededCoordinates;
        let same = (0..500)
            .filter(|n| {
                let (c, _) = s.coordinates_and_rank(&n.to_string(), "x", 2, 1 << 16);
                c[0].0 == c[1].0
            })
            .count();
        assert!(same < 5);
    }

    #[test]
    fn width_one_collapses_to_origin() {
        let (coords, _) = SeededCoordinates.coordinates_and_rank("a", "b", 3, 1);
        assert!(coords.iter().all(|&c| c == (0, 0)));
    }
}
