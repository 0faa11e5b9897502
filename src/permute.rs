//! Fixed-seed permutation applied once, when the corpus is first built.
//!
//! The order must be identical on every platform and release, so the shuffle
//! is spelled out here instead of relying on `SliceRandom::shuffle`, whose
//! output may change between `rand` versions. ChaCha20 output for a given
//! seed is stable by contract of `rand_chacha`.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub const PERMUTATION_SEED: u64 = 0xB0C1_FA52;

/// Uniform permutation of `0..len`, Fisher-Yates driven by ChaCha20.
pub fn permutation(len: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = uniform_below(&mut rng, i as u64 + 1) as usize;
        indices.swap(i, j);
    }
    indices
}

/// Rejection sampling so every value below `bound` is equally likely.
fn uniform_below<R: RngCore>(rng: &mut R, bound: u64) -> u64 {
    debug_assert!(bound > 0);
    // 2^64 mod bound; values in the last partial block are rejected.
    let rem = (u64::MAX % bound + 1) % bound;
    loop {
        let value = rng.next_u64();
        if value <= u64::MAX - rem {
            return value % bound;
        }
    }
}
