//! Parameter spaces for falsification search.
//!
//! A [`space::ParameterSpace`] declares the structured domain being searched:
//! continuous intervals, discrete integer sets, and categorical choices,
//! optionally conditional on other dimensions' values. It is pure data:
//! validation, independent draws, and a normalized [0,1] embedding are the
//! only behavior.

pub mod point;
pub mod space;

pub use point::{ParamValue, Point};
pub use space::{Condition, Dimension, DimensionKind, DomainError, ParameterSpace};
