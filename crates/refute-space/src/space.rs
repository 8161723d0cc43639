//! Dimension declarations and the search domain.
//!
//! Dimensions are declared in order; a conditional dimension's parent must
//! appear earlier in the list, so independent draws and decoding can resolve
//! parents before children in a single left-to-right pass.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::point::{ParamValue, Point};

/// The kind of domain a single dimension ranges over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimensionKind {
    /// Closed real interval [lo, hi].
    Continuous { lo: f64, hi: f64 },
    /// Enumerated integer set.
    Discrete { values: Vec<i64> },
    /// Enumerated label set.
    Categorical { choices: Vec<String> },
}

/// Conditional domain: the dimension only exists in a point when its
/// parent dimension holds `equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parent: String,
    pub equals: ParamValue,
}

/// One named dimension of the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub kind: DimensionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// Errors for malformed spaces and points outside the declared domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("duplicate dimension '{name}'")]
    DuplicateDimension { name: String },

    #[error("dimension '{name}' has an empty value set")]
    EmptyDomain { name: String },

    #[error("continuous dimension '{name}' has invalid range [{lo}, {hi}]")]
    InvalidRange { name: String, lo: f64, hi: f64 },

    #[error("dimension '{name}' depends on '{parent}', which is not declared before it")]
    UnknownParent { name: String, parent: String },

    #[error("point is missing dimension '{name}'")]
    MissingDimension { name: String },

    #[error("point assigns unknown dimension '{name}'")]
    UnknownDimension { name: String },

    #[error("dimension '{name}' expects a {expected} value, got {got}")]
    WrongKind {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("value {value} is outside the domain of dimension '{name}'")]
    OutOfRange { name: String, value: String },

    #[error("dimension '{name}' is inactive (condition on '{parent}' not met) but has a value")]
    InactiveDimension { name: String, parent: String },

    #[error("embedding has {got} coordinates, space has {expected} dimensions")]
    WrongArity { expected: usize, got: usize },
}

/// An ordered, immutable collection of dimensions.
///
/// Constructed once and shared read-only by every component that touches
/// points. Construction validates the declaration; after that, the only
/// operations are point validation, independent uniform draws, and the
/// normalized embedding used by numeric samplers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    dimensions: Vec<Dimension>,
}

impl ParameterSpace {
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, DomainError> {
        for (i, dim) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|d| d.name == dim.name) {
                return Err(DomainError::DuplicateDimension {
                    name: dim.name.clone(),
                });
            }
            match &dim.kind {
                DimensionKind::Continuous { lo, hi } => {
                    if !lo.is_finite() || !hi.is_finite() || lo > hi {
                        return Err(DomainError::InvalidRange {
                            name: dim.name.clone(),
                            lo: *lo,
                            hi: *hi,
                        });
                    }
                }
                DimensionKind::Discrete { values } => {
                    if values.is_empty() {
                        return Err(DomainError::EmptyDomain {
                            name: dim.name.clone(),
                        });
                    }
                }
                DimensionKind::Categorical { choices } => {
                    if choices.is_empty() {
                        return Err(DomainError::EmptyDomain {
                            name: dim.name.clone(),
                        });
                    }
                }
            }
            if let Some(cond) = &dim.condition {
                // Parent must be declared earlier so it resolves first.
                if !dimensions[..i].iter().any(|d| d.name == cond.parent) {
                    return Err(DomainError::UnknownParent {
                        name: dim.name.clone(),
                        parent: cond.parent.clone(),
                    });
                }
            }
        }
        Ok(Self { dimensions })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of dimensions, which is also the embedding arity.
    pub fn arity(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether a dimension is active for the given (partial) point.
    /// Unconditional dimensions are always active; conditional ones are
    /// active when the parent holds the required value.
    fn is_active(&self, dim: &Dimension, point: &Point) -> bool {
        match &dim.condition {
            None => true,
            Some(cond) => point.get(&cond.parent) == Some(&cond.equals),
        }
    }

    /// Check that a point assigns exactly one in-domain value per active
    /// dimension and nothing else.
    pub fn validate(&self, point: &Point) -> Result<(), DomainError> {
        for name in point.assignments.keys() {
            if !self.dimensions.iter().any(|d| &d.name == name) {
                return Err(DomainError::UnknownDimension { name: name.clone() });
            }
        }

        for dim in &self.dimensions {
            let active = self.is_active(dim, point);
            let value = point.get(&dim.name);
            match (active, value) {
                (true, None) => {
                    return Err(DomainError::MissingDimension {
                        name: dim.name.clone(),
                    })
                }
                (false, Some(_)) => {
                    let parent = dim
                        .condition
                        .as_ref()
                        .map(|c| c.parent.clone())
                        .unwrap_or_default();
                    return Err(DomainError::InactiveDimension {
                        name: dim.name.clone(),
                        parent,
                    });
                }
                (false, None) => {}
                (true, Some(value)) => check_value(dim, value)?,
            }
        }
        Ok(())
    }

    /// Independent uniform draw, ignoring history. Conditional dimensions
    /// see their parent's drawn value because parents are declared first.
    pub fn sample_uniform(&self, rng: &mut ChaCha8Rng) -> Point {
        let mut point = Point::new();
        for dim in &self.dimensions {
            if !self.is_active(dim, &point) {
                continue;
            }
            let value = match &dim.kind {
                DimensionKind::Continuous { lo, hi } => {
                    ParamValue::Float(lo + rng.gen::<f64>() * (hi - lo))
                }
                DimensionKind::Discrete { values } => {
                    ParamValue::Int(values[rng.gen_range(0..values.len())])
                }
                DimensionKind::Categorical { choices } => {
                    ParamValue::Choice(choices[rng.gen_range(0..choices.len())].clone())
                }
            };
            point.set(dim.name.clone(), value);
        }
        point
    }

    /// Map a valid point into the normalized [0,1]^arity embedding.
    ///
    /// Continuous dimensions rescale linearly; discrete/categorical encode
    /// as index/(n-1) (0.5 for singletons). Inactive conditional dimensions
    /// encode as 0.0 so the embedding has fixed arity.
    pub fn project(&self, point: &Point) -> Result<Vec<f64>, DomainError> {
        self.validate(point)?;
        let mut embedding = Vec::with_capacity(self.dimensions.len());
        for dim in &self.dimensions {
            let coord = match point.get(&dim.name) {
                None => 0.0,
                Some(value) => match (&dim.kind, value) {
                    (DimensionKind::Continuous { lo, hi }, ParamValue::Float(v)) => {
                        if hi > lo {
                            (v - lo) / (hi - lo)
                        } else {
                            0.5
                        }
                    }
                    (DimensionKind::Discrete { values }, ParamValue::Int(v)) => {
                        let idx = values.iter().position(|x| x == v).unwrap_or(0);
                        index_coord(idx, values.len())
                    }
                    (DimensionKind::Categorical { choices }, ParamValue::Choice(v)) => {
                        let idx = choices.iter().position(|x| x == v).unwrap_or(0);
                        index_coord(idx, choices.len())
                    }
                    // validate() already rejected kind mismatches.
                    _ => 0.0,
                },
            };
            embedding.push(coord);
        }
        Ok(embedding)
    }

    /// Inverse of [`project`](Self::project): decode a normalized vector
    /// into a point, clamping coordinates to [0,1] and dropping inactive
    /// conditional dimensions.
    pub fn unproject(&self, embedding: &[f64]) -> Result<Point, DomainError> {
        if embedding.len() != self.dimensions.len() {
            return Err(DomainError::WrongArity {
                expected: self.dimensions.len(),
                got: embedding.len(),
            });
        }
        let mut point = Point::new();
        for (dim, &coord) in self.dimensions.iter().zip(embedding) {
            if !self.is_active(dim, &point) {
                continue;
            }
            let x = if coord.is_finite() {
                coord.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let value = match &dim.kind {
                DimensionKind::Continuous { lo, hi } => ParamValue::Float(lo + x * (hi - lo)),
                DimensionKind::Discrete { values } => {
                    ParamValue::Int(values[coord_index(x, values.len())])
                }
                DimensionKind::Categorical { choices } => {
                    ParamValue::Choice(choices[coord_index(x, choices.len())].clone())
                }
            };
            point.set(dim.name.clone(), value);
        }
        Ok(point)
    }
}

/// Check a single value against a dimension's declared domain.
fn check_value(dim: &Dimension, value: &ParamValue) -> Result<(), DomainError> {
    let wrong_kind = |expected: &'static str| DomainError::WrongKind {
        name: dim.name.clone(),
        expected,
        got: kind_name(value),
    };
    match &dim.kind {
        DimensionKind::Continuous { lo, hi } => match value {
            ParamValue::Float(v) => {
                if v.is_finite() && *v >= *lo && *v <= *hi {
                    Ok(())
                } else {
                    Err(DomainError::OutOfRange {
                        name: dim.name.clone(),
                        value: value.to_string(),
                    })
                }
            }
            _ => Err(wrong_kind("float")),
        },
        DimensionKind::Discrete { values } => match value {
            ParamValue::Int(v) => {
                if values.contains(v) {
                    Ok(())
                } else {
                    Err(DomainError::OutOfRange {
                        name: dim.name.clone(),
                        value: value.to_string(),
                    })
                }
            }
            _ => Err(wrong_kind("int")),
        },
        DimensionKind::Categorical { choices } => match value {
            ParamValue::Choice(v) => {
                if choices.contains(v) {
                    Ok(())
                } else {
                    Err(DomainError::OutOfRange {
                        name: dim.name.clone(),
                        value: value.to_string(),
                    })
                }
            }
            _ => Err(wrong_kind("choice")),
        },
    }
}

fn kind_name(value: &ParamValue) -> &'static str {
    match value {
        ParamValue::Float(_) => "float",
        ParamValue::Int(_) => "int",
        ParamValue::Choice(_) => "choice",
    }
}

/// Normalized coordinate for index i out of n.
fn index_coord(idx: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        idx as f64 / (n - 1) as f64
    }
}

/// Index for a normalized coordinate in [0,1], n buckets.
fn coord_index(x: f64, n: usize) -> usize {
    ((x * n as f64) as usize).min(n - 1)
}
