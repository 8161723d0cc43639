use rand_chacha::ChaCha8Rng;
use refute_space::{ParameterSpace, Point};

use crate::rng::sampler_rng;
use crate::sampler::{Sampler, SamplerError};

/// Independent uniform draws; history is ignored.
pub struct UniformSampler {
    rng: ChaCha8Rng,
}

impl UniformSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: sampler_rng(seed, 0),
        }
    }
}

impl Sampler for UniformSampler {
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError> {
        Ok(space.sample_uniform(&mut self.rng))
    }

    fn update(&mut self, _point: &Point, _robustness: f64, _verdict: bool) {}

    fn name(&self) -> &str {
        "uniform"
    }
}
