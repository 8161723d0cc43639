//! Cross-entropy rare-event sampling.
//!
//! Maintains a per-coordinate Gaussian over the normalized embedding,
//! initially near-uniform. Every `batch_size` updates the parameters are
//! refit toward the elite (lowest-robustness) fraction of the generation,
//! smoothed against the previous parameters so the distribution cannot
//! collapse onto the first lucky sample.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use refute_space::{ParameterSpace, Point};
use tracing::debug;

use crate::rng::sampler_rng;
use crate::sampler::{propose_or_fallback, Sampler, SamplerError};

const REJECT_ATTEMPTS: usize = 32;
/// Floor on the fitted stddev; keeps later generations able to move.
const MIN_STD: f64 = 0.02;

pub struct CrossEntropySampler {
    rng: ChaCha8Rng,
    batch_size: usize,
    elite_frac: f64,
    smoothing: f64,
    mean: Vec<f64>,
    std: Vec<f64>,
    /// Current generation: (embedding, robustness) pairs.
    batch: Vec<(Vec<f64>, f64)>,
    /// Embedding of the last proposal, awaiting feedback.
    pending: Option<Vec<f64>>,
    generation: u64,
}

impl CrossEntropySampler {
    pub fn new(seed: u64, batch_size: usize) -> Self {
        Self::with_params(seed, batch_size, 0.2, 0.7)
    }

    /// `elite_frac` is the fraction of each generation refit into the
    /// distribution; `smoothing` weights the fresh fit against the previous
    /// parameters (1.0 = replace outright).
    pub fn with_params(seed: u64, batch_size: usize, elite_frac: f64, smoothing: f64) -> Self {
        Self {
            rng: sampler_rng(seed, 3),
            batch_size: batch_size.max(2),
            elite_frac: elite_frac.clamp(0.01, 1.0),
            smoothing: smoothing.clamp(0.0, 1.0),
            mean: Vec::new(),
            std: Vec::new(),
            batch: Vec::new(),
            pending: None,
            generation: 0,
        }
    }

    fn ensure_dims(&mut self, arity: usize) {
        if self.mean.len() != arity {
            // Near-uniform start: centered, wide.
            self.mean = vec![0.5; arity];
            self.std = vec![0.3; arity];
        }
    }

    fn refit(&mut self) {
        let mut generation = std::mem::take(&mut self.batch);
        generation.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let elite_count = ((generation.len() as f64 * self.elite_frac).ceil() as usize).max(1);
        let elite = &generation[..elite_count];

        let arity = self.mean.len();
        for d in 0..arity {
            let fit_mean =
                elite.iter().map(|(e, _)| e[d]).sum::<f64>() / elite_count as f64;
            let fit_var = elite
                .iter()
                .map(|(e, _)| (e[d] - fit_mean).powi(2))
                .sum::<f64>()
                / elite_count as f64;
            let fit_std = fit_var.sqrt().max(MIN_STD);

            // Decayed mixture with the previous parameters.
            self.mean[d] = self.smoothing * fit_mean + (1.0 - self.smoothing) * self.mean[d];
            self.std[d] = self.smoothing * fit_std + (1.0 - self.smoothing) * self.std[d];
        }
        self.generation += 1;
        debug!(
            generation = self.generation,
            elite_count,
            best = elite[0].1,
            "cross-entropy refit"
        );
    }
}

/// Standard normal draw via Box-Muller.
fn gauss(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-300);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

impl Sampler for CrossEntropySampler {
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError> {
        self.ensure_dims(space.arity());
        let mean = self.mean.clone();
        let std = self.std.clone();
        let point = propose_or_fallback(space, REJECT_ATTEMPTS, &mut self.rng, |rng| {
            let embedding: Vec<f64> = mean
                .iter()
                .zip(&std)
                .map(|(&m, &s)| m + gauss(rng) * s)
                .collect();
            // Reject draws outside the unit cube rather than clamping,
            // so the fitted distribution is not biased onto the faces.
            if embedding.iter().any(|&c| !(0.0..=1.0).contains(&c)) {
                return None;
            }
            space.unproject(&embedding).ok()
        });
        self.pending = Some(space.project(&point)?);
        Ok(point)
    }

    fn update(&mut self, _point: &Point, robustness: f64, _verdict: bool) {
        let Some(embedding) = self.pending.take() else {
            return;
        };
        self.batch.push((embedding, robustness));
        if self.batch.len() >= self.batch_size {
            self.refit();
        }
    }

    fn name(&self) -> &str {
        "cross_entropy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refute_space::{Dimension, DimensionKind, ParamValue};

    fn line() -> ParameterSpace {
        ParameterSpace::new(vec![Dimension {
            name: "x".to_string(),
            kind: DimensionKind::Continuous { lo: 0.0, hi: 10.0 },
            condition: None,
        }])
        .unwrap()
    }

    fn x_of(p: &Point) -> f64 {
        match p.get("x").unwrap() {
            ParamValue::Float(v) => *v,
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn test_first_propose_needs_no_history() {
        let space = line();
        let mut sampler = CrossEntropySampler::new(1, 10);
        let p = sampler.propose(&space).unwrap();
        assert!(space.validate(&p).is_ok());
    }

    #[test]
    fn test_refit_happens_per_batch() {
        let space = line();
        let mut sampler = CrossEntropySampler::new(1, 5);
        for _ in 0..5 {
            let p = sampler.propose(&space).unwrap();
            let x = x_of(&p);
            sampler.update(&p, (x - 9.0).abs(), true);
        }
        assert_eq!(sampler.generation, 1);
        assert!(sampler.batch.is_empty());
    }

    #[test]
    fn test_std_never_collapses_below_floor() {
        let space = line();
        let mut sampler = CrossEntropySampler::with_params(1, 4, 0.25, 1.0);
        // Identical elites every generation would fit std = 0 without the floor.
        for _ in 0..20 {
            let p = sampler.propose(&space).unwrap();
            sampler.update(&p, 0.0, true);
        }
        assert!(sampler.std.iter().all(|&s| s >= MIN_STD));
    }

    #[test]
    fn test_reproducible_with_fixed_seed() {
        let space = line();
        let run = || {
            let mut sampler = CrossEntropySampler::new(33, 8);
            let mut xs = Vec::new();
            for _ in 0..40 {
                let p = sampler.propose(&space).unwrap();
                let x = x_of(&p);
                xs.push(x);
                sampler.update(&p, (x - 9.0).abs(), true);
            }
            xs
        };
        assert_eq!(run(), run());
    }
}
