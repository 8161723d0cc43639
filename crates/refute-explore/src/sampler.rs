use refute_space::{DomainError, ParameterSpace, Point};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplerError {
    /// The strategy has enumerated its whole search plan (e.g. a grid
    /// sweep finished). Adaptive strategies never return this; they fall
    /// back to an independent uniform draw instead.
    #[error("sampler '{name}' is exhausted: {reason}")]
    Exhausted { name: String, reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A sampling strategy: proposes the next point to evaluate and learns
/// from the outcome.
///
/// `update` is the only channel through which history reaches a strategy;
/// there is no shared mutable state between strategies. The first `propose`
/// call must succeed using only the parameter space, before any `update`.
pub trait Sampler {
    /// Propose the next candidate point.
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError>;

    /// Feed back the evaluation of a previously proposed point.
    fn update(&mut self, point: &Point, robustness: f64, verdict: bool);

    /// Name of this strategy (for tracing and error messages).
    fn name(&self) -> &str;
}

/// Bounded rejection loop shared by the adaptive strategies: try `attempts`
/// draws from `gen` (which returns `None` for a rejected draw), keep the
/// first valid point, otherwise fall back to an independent uniform draw
/// from the space.
pub(crate) fn propose_or_fallback(
    space: &ParameterSpace,
    attempts: usize,
    rng: &mut rand_chacha::ChaCha8Rng,
    mut gen: impl FnMut(&mut rand_chacha::ChaCha8Rng) -> Option<Point>,
) -> Point {
    for _ in 0..attempts {
        if let Some(point) = gen(rng) {
            if space.validate(&point).is_ok() {
                return point;
            }
        }
    }
    tracing::debug!(attempts, "adaptive proposal rejected, falling back to uniform draw");
    space.sample_uniform(rng)
}
