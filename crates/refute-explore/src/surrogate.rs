//! Surrogate-guided search.
//!
//! Fits an inverse-distance-weighted regression surrogate over observed
//! (embedding, robustness) pairs and proposes the candidate minimizing an
//! acquisition value: predicted robustness minus an exploration bonus for
//! distance from the nearest observation. The inner optimization is a
//! bounded candidate sweep (uniform draws plus perturbations of the
//! incumbent best) rather than an unbounded solver, so `propose` always
//! terminates.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use refute_space::{ParameterSpace, Point};
use tracing::debug;

use crate::rng::sampler_rng;
use crate::sampler::{Sampler, SamplerError};

const EPS: f64 = 1e-9;

pub struct SurrogateSampler {
    rng: ChaCha8Rng,
    observations: Vec<(Vec<f64>, f64)>,
    pending: Option<Vec<f64>>,
    /// Candidates scored per proposal.
    candidates: usize,
    /// Weight of the exploration bonus in the acquisition.
    explore_weight: f64,
}

impl SurrogateSampler {
    pub fn new(seed: u64) -> Self {
        Self::with_params(seed, 64, 0.5)
    }

    pub fn with_params(seed: u64, candidates: usize, explore_weight: f64) -> Self {
        Self {
            rng: sampler_rng(seed, 4),
            observations: Vec::new(),
            pending: None,
            candidates: candidates.max(4),
            explore_weight: explore_weight.abs(),
        }
    }

    /// Surrogate prediction at `x`: inverse-square-distance weighted mean
    /// of observed robustness values.
    fn predict(&self, x: &[f64]) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for (obs, rob) in &self.observations {
            let d2 = sq_dist(obs, x);
            if d2 < EPS {
                return *rob;
            }
            let w = 1.0 / d2;
            num += w * rob;
            den += w;
        }
        num / den
    }

    fn nearest_dist(&self, x: &[f64]) -> f64 {
        self.observations
            .iter()
            .map(|(obs, _)| sq_dist(obs, x).sqrt())
            .fold(f64::INFINITY, f64::min)
    }

    /// Acquisition to minimize: low predicted robustness is promising, and
    /// unexplored regions get a distance bonus.
    fn acquisition(&self, x: &[f64]) -> f64 {
        self.predict(x) - self.explore_weight * self.nearest_dist(x)
    }

    fn best_observation(&self) -> Option<&(Vec<f64>, f64)> {
        self.observations.iter().fold(None, |acc, obs| match acc {
            None => Some(obs),
            Some(best) if obs.1 < best.1 => Some(obs),
            Some(best) => Some(best),
        })
    }
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

impl Sampler for SurrogateSampler {
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError> {
        // Bootstrap: nothing observed yet, independent draw.
        if self.observations.is_empty() {
            let point = space.sample_uniform(&mut self.rng);
            self.pending = Some(space.project(&point)?);
            return Ok(point);
        }

        let arity = space.arity();
        let incumbent = self
            .best_observation()
            .map(|(e, _)| e.clone())
            .unwrap_or_else(|| vec![0.5; arity]);

        let mut best: Option<(f64, Point)> = None;
        for i in 0..self.candidates {
            // Alternate global uniform candidates with local refinements of
            // the incumbent best.
            let embedding: Vec<f64> = if i % 2 == 0 {
                (0..arity).map(|_| self.rng.gen::<f64>()).collect()
            } else {
                incumbent
                    .iter()
                    .map(|&c| (c + (self.rng.gen::<f64>() * 2.0 - 1.0) * 0.1).clamp(0.0, 1.0))
                    .collect()
            };
            let Ok(point) = space.unproject(&embedding) else {
                continue;
            };
            if space.validate(&point).is_err() {
                continue;
            }
            let score = self.acquisition(&embedding);
            if best.as_ref().map_or(true, |(s, _)| score < *s) {
                best = Some((score, point));
            }
        }

        let point = match best {
            Some((_, point)) => point,
            // Candidate sweep failed to produce a valid point; an
            // independent draw keeps the loop moving.
            None => {
                debug!("surrogate candidate sweep produced no valid point, falling back");
                space.sample_uniform(&mut self.rng)
            }
        };
        self.pending = Some(space.project(&point)?);
        Ok(point)
    }

    fn update(&mut self, _point: &Point, robustness: f64, _verdict: bool) {
        if let Some(embedding) = self.pending.take() {
            self.observations.push((embedding, robustness));
        }
    }

    fn name(&self) -> &str {
        "surrogate"
    }
}
