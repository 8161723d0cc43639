//! Simulated-annealing local search toward low robustness.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use refute_space::{ParameterSpace, Point};

use crate::rng::sampler_rng;
use crate::sampler::{propose_or_fallback, Sampler, SamplerError};

const REJECT_ATTEMPTS: usize = 16;

/// Perturbs an incumbent point by domain-scaled noise in the normalized
/// embedding; accepts moves by the Metropolis criterion on the robustness
/// delta. Lower robustness is better, so the search walks toward violations.
pub struct AnnealingSampler {
    rng: ChaCha8Rng,
    temperature: f64,
    cooling: f64,
    step_scale: f64,
    /// Incumbent embedding and its robustness.
    current: Option<(Vec<f64>, f64)>,
    /// Embedding of the last proposal, awaiting feedback.
    pending: Option<Vec<f64>>,
}

impl AnnealingSampler {
    pub fn new(seed: u64) -> Self {
        Self::with_schedule(seed, 1.0, 0.97, 0.15)
    }

    /// `temperature` is the initial acceptance temperature, `cooling` the
    /// per-update decay factor in (0, 1), `step_scale` the perturbation
    /// half-width in normalized units.
    pub fn with_schedule(seed: u64, temperature: f64, cooling: f64, step_scale: f64) -> Self {
        Self {
            rng: sampler_rng(seed, 2),
            temperature: temperature.max(f64::MIN_POSITIVE),
            cooling: cooling.clamp(f64::MIN_POSITIVE, 1.0),
            step_scale: step_scale.abs(),
            current: None,
            pending: None,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl Sampler for AnnealingSampler {
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError> {
        let point = match &self.current {
            // Bootstrap: no history yet, independent draw.
            None => space.sample_uniform(&mut self.rng),
            Some((incumbent, _)) => {
                let base = incumbent.clone();
                let step = self.step_scale;
                propose_or_fallback(space, REJECT_ATTEMPTS, &mut self.rng, |rng| {
                    let perturbed: Vec<f64> = base
                        .iter()
                        .map(|&c| (c + (rng.gen::<f64>() * 2.0 - 1.0) * step).clamp(0.0, 1.0))
                        .collect();
                    space.unproject(&perturbed).ok()
                })
            }
        };
        self.pending = Some(space.project(&point)?);
        Ok(point)
    }

    fn update(&mut self, _point: &Point, robustness: f64, _verdict: bool) {
        let Some(candidate) = self.pending.take() else {
            return;
        };
        let accept = match &self.current {
            None => true,
            Some((_, incumbent_rob)) => {
                let delta = robustness - incumbent_rob;
                // Better (lower) robustness is accepted unconditionally;
                // worse moves pass the Metropolis test.
                delta <= 0.0 || self.rng.gen::<f64>() < (-delta / self.temperature).exp()
            }
        };
        if accept {
            self.current = Some((candidate, robustness));
        }
        self.temperature *= self.cooling;
    }

    fn name(&self) -> &str {
        "annealing"
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
        let mut sampler = AnnealingSampler::new(11);
        let p = sampler.propose(&space).unwrap();
        assert!(space.validate(&p).is_ok());
    }

    #[test]
    fn test_temperature_decays_monotonically() {
        let space = line();
        let mut sampler = AnnealingSampler::new(11);
        let mut last = sampler.temperature();
        for _ in 0..10 {
            let p = sampler.propose(&space).unwrap();
            sampler.update(&p, 1.0, true);
            assert!(sampler.temperature() < last);
            last = sampler.temperature();
        }
    }

    #[test]
    fn test_walks_toward_lower_robustness() {
        // Robustness = x: the minimum sits at x = 0. After enough accepted
        // moves the incumbent should be well below the domain midpoint.
        let space = line();
        let mut sampler = AnnealingSampler::with_schedule(3, 0.5, 0.93, 0.1);
        let mut best = f64::INFINITY;
        for _ in 0..120 {
            let p = sampler.propose(&space).unwrap();
            let rob = x_of(&p);
            best = best.min(rob);
            sampler.update(&p, rob, rob >= 0.0);
        }
        assert!(best < 2.0, "annealing never got close to the minimum: {best}");
    }

    #[test]
    fn test_reproducible_with_fixed_seed() {
        let space = line();
        let run = |seed: u64| {
            let mut sampler = AnnealingSampler::new(seed);
            let mut xs = Vec::new();
            for _ in 0..30 {
                let p = sampler.propose(&space).unwrap();
                let rob = x_of(&p);
                xs.push(rob);
                sampler.update(&p, rob, true);
            }
            xs
        };
        assert_eq!(run(21), run(21));
        assert_ne!(run(21), run(22));
    }
}
