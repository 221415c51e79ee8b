//! Deterministic seeded random stream shared by layout and placement passes.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

/// All randomness in one generation pass flows through a single stream so a
/// given seed reproduces an identical level.
pub struct RandomStream {
    rng: ChaCha8Rng,
}

impl RandomStream {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Stream for one retry attempt. Each attempt gets an independent stream
    /// so a failed layout never perturbs the next attempt's draws.
    pub fn for_attempt(run_seed: u64, attempt: u32) -> Self {
        Self::from_seed(derive_stream_seed(run_seed, attempt as u64))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform draw from the inclusive range.
    pub fn range_usize(&mut self, min_value: usize, max_value: usize) -> usize {
        debug_assert!(min_value <= max_value);
        let span = (max_value - min_value + 1) as u64;
        min_value + (self.rng.next_u64() % span) as usize
    }

    pub fn range_i32(&mut self, min_value: i32, max_value: i32) -> i32 {
        debug_assert!(min_value <= max_value);
        let span = (max_value as i64 - min_value as i64 + 1) as u64;
        min_value + (self.rng.next_u64() % span) as i32
    }

    /// Uniform draw from [0, 1).
    pub fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.unit() < probability
    }

    /// `base` perturbed by up to `spread` in either direction.
    pub fn jitter(&mut self, base: f64, spread: f64) -> f64 {
        base + (self.unit() * 2.0 - 1.0) * spread
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        debug_assert!(!items.is_empty());
        &items[self.range_usize(0, items.len() - 1)]
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let swap_with = self.range_usize(0, index);
            items.swap(index, swap_with);
        }
    }
}

/// Splitmix-style mixer so derived streams decorrelate even for adjacent
/// attempt numbers.
pub(crate) fn derive_stream_seed(run_seed: u64, stream: u64) -> u64 {
    let mut mixed = run_seed ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= stream.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}
