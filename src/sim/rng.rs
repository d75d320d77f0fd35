//! Seedable gameplay RNG
//!
//! Only spawn-type draws, spawn placement and headings go through here.
//! Visual flourishes must not consume from this stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    inner: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform integer in [0, n); 0 when n is 0
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.inner.random_range(0..n)
    }

    /// Uniform in [lo, hi); lo when the range is empty
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.inner.random_range(lo..hi)
    }

    /// Uniform heading in [0, TAU)
    pub fn angle(&mut self) -> f32 {
        self.unit() * std::f32::consts::TAU
    }
}
