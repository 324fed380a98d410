// 2.0: deterministic randomness. nothing in the simulation may touch a
// platform RNG; every draw flows through a SimRng derived from the single
// master seed.
//
// substream derivation: each entity (company, subsystem) gets its own stream
// seeded from (master_seed, key). two engines built from the same seed are
// bit-identical, and entity A's stream never depends on whether entity B was
// generated in the same run or in a different order.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

// FNV-1a over the key bytes. stable across platforms and releases, unlike
// std's DefaultHasher.
fn fnv1a64(key: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in key.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Seedable pseudo-random generator with per-entity substreams.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream for `key`. Deterministic in
    /// (master seed, key); consuming this stream never advances the parent.
    pub fn substream(&self, key: &str) -> SimRng {
        let derived = self.seed ^ fnv1a64(key).wrapping_mul(GOLDEN_GAMMA);
        SimRng::from_seed(derived)
    }

    /// Uniform f64 in [0, 1). 53 bits of the next u64.
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Bernoulli trial: true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Approximate standard normal draw via Irwin-Hall: the sum of three
    /// uniforms has variance 1/4, so (sum - 1.5) * 2 has unit variance and is
    /// hard-bounded in [-3, 3]. Good enough for return shaping, and the bound
    /// keeps single draws from ever producing an extreme move.
    pub fn next_gaussian(&mut self) -> f64 {
        let sum = self.next_f64() + self.next_f64() + self.next_f64();
        (sum - 1.5) * 2.0
    }
}
