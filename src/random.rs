//! Deterministic, seed-string driven random source.
//!
//! A seed string is hashed with 64-bit FNV-1a and expanded into a
//! `ChaCha8Rng`. Both steps are platform independent, so the same seed
//! string yields the same draw sequence everywhere.
//!
//! When no seed is given, one is drawn from OS entropy and exposed via
//! [`SeededRng::seed`] so the run can be replayed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A seeded generator together with the seed string it was built from.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: String,
    rng: ChaCha8Rng,
}

impl SeededRng {
    /// Builds a generator from `seed`, or from a fresh seed when `seed` is
    /// `None` or blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::Rng;
    /// use u_teamsort::random::SeededRng;
    ///
    /// let mut a = SeededRng::new(Some("seed123"));
    /// let mut b = SeededRng::new(Some("seed123"));
    /// assert_eq!(a.seed(), "seed123");
    /// assert_eq!(a.rng_mut().random::<u64>(), b.rng_mut().random::<u64>());
    ///
    /// let fresh = SeededRng::new(None);
    /// assert!(!fresh.seed().is_empty());
    /// ```
    pub fn new(seed: Option<&str>) -> Self {
        let seed = match seed.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => generate_seed(),
        };
        let rng = ChaCha8Rng::seed_from_u64(hash_seed(&seed));
        Self { seed, rng }
    }

    /// The seed actually in use.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Mutable access to the generator.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Shuffles a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        shuffle(items, &mut self.rng);
    }
}

/// Fisher–Yates shuffle drawing `u64` indices.
///
/// Draws are made over `u64` rather than `usize` so the permutation does
/// not depend on the target's pointer width.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i as u64) as usize;
        items.swap(i, j);
    }
}

/// 64-bit FNV-1a over the UTF-8 bytes of a seed string.
pub fn hash_seed(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET_BASIS, |state, byte| {
        (state ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// A fresh 16-hex-digit seed from OS entropy.
fn generate_seed() -> String {
    format!("{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new(Some("seed123"));
        let mut b = SeededRng::new(Some("seed123"));
        let xs: Vec<u64> = (0..16).map(|_| a.rng_mut().random()).collect();
        let ys: Vec<u64> = (0..16).map(|_| b.rng_mut().random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_different_seed_different_sequence() {
        let mut a = SeededRng::new(Some("seed123"));
        let mut b = SeededRng::new(Some("seed124"));
        let xs: Vec<u64> = (0..4).map(|_| a.rng_mut().random()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.rng_mut().random()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_blank_seed_is_generated() {
        for seed in [None, Some(""), Some("   ")] {
            let rng = SeededRng::new(seed);
            assert_eq!(rng.seed().len(), 16);
            assert!(rng.seed().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_generated_seed_replays() {
        let mut first = SeededRng::new(None);
        let seed = first.seed().to_string();
        let mut replay = SeededRng::new(Some(&seed));
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        first.shuffle(&mut a);
        replay.shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_is_trimmed() {
        assert_eq!(SeededRng::new(Some("  abc ")).seed(), "abc");
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SeededRng::new(Some("perm"));
        let mut items: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_fnv_reference_values() {
        // Published FNV-1a 64-bit test vectors
        assert_eq!(hash_seed(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(hash_seed("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
