//! Sampling strategies for falsification search.
//!
//! Every strategy implements [`sampler::Sampler`]: `propose` the next point,
//! `update` with the robustness feedback from the last evaluation. `update`
//! is the only way history enters a sampler, and every strategy's first
//! `propose` works with no history at all.

pub mod anneal;
pub mod cross_entropy;
pub mod grid;
pub mod halton;
pub mod rng;
pub mod sampler;
pub mod surrogate;
pub mod uniform;

pub use anneal::AnnealingSampler;
pub use cross_entropy::CrossEntropySampler;
pub use grid::GridSampler;
pub use halton::HaltonSampler;
pub use rng::sampler_rng;
pub use sampler::{Sampler, SamplerError};
pub use surrogate::SurrogateSampler;
pub use uniform::UniformSampler;
