//! Halton low-discrepancy sequence over the normalized embedding.
//!
//! Per-dimension radical inverse in co-prime bases, with a seeded random
//! leap offset so different seeds cover the cube along different prefixes.
//! Star discrepancy O((log N)^d / N) beats pseudo-random O(N^{-1/2}) for
//! the small dimension counts typical of scenario parameter spaces.

use rand::Rng;
use refute_space::{ParameterSpace, Point};

use crate::rng::sampler_rng;
use crate::sampler::{Sampler, SamplerError};

/// First 16 primes; co-prime bases for up to 16 dimensions, cycling after.
const BASES: [u64; 16] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Radical inverse of `n` in base `b`: digit-reverse n across the radix point.
fn radical_inverse(mut n: u64, b: u64) -> f64 {
    let mut inv = 0.0;
    let mut denom = 1.0;
    while n > 0 {
        denom *= b as f64;
        inv += (n % b) as f64 / denom;
        n /= b;
    }
    inv
}

/// Quasi-random sampler; stateless with respect to history.
pub struct HaltonSampler {
    index: u64,
    offset: u64,
}

impl HaltonSampler {
    pub fn new(seed: u64) -> Self {
        // Leap into the sequence at a seed-dependent offset, skipping the
        // degenerate all-zeros first element.
        let mut rng = sampler_rng(seed, 1);
        Self {
            index: 0,
            offset: 1 + rng.gen_range(0..1_000_000u64),
        }
    }
}

impl Sampler for HaltonSampler {
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError> {
        let n = self.offset + self.index;
        self.index += 1;
        let embedding: Vec<f64> = (0..space.arity())
            .map(|d| radical_inverse(n, BASES[d % BASES.len()]))
            .collect();
        Ok(space.unproject(&embedding)?)
    }

    fn update(&mut self, _point: &Point, _robustness: f64, _verdict: bool) {}

    fn name(&self) -> &str {
        "halton"
    }
}
