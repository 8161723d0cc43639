use refute_space::{ParameterSpace, Point};

use crate::sampler::{Sampler, SamplerError};

/// Lattice sweep over the normalized embedding.
///
/// Enumerates `points_per_axis^arity` points in row-major order, axis
/// coordinates evenly spaced over [0,1]. Returns
/// [`SamplerError::Exhausted`] once the sweep completes; a finished grid
/// is genuine exhaustion, not a stall.
pub struct GridSampler {
    points_per_axis: usize,
    cursor: u64,
}

impl GridSampler {
    pub fn new(points_per_axis: usize) -> Self {
        Self {
            points_per_axis: points_per_axis.max(1),
            cursor: 0,
        }
    }

    /// Total lattice size for a given space.
    pub fn total(&self, space: &ParameterSpace) -> u64 {
        (self.points_per_axis as u64).saturating_pow(space.arity() as u32)
    }
}

impl Sampler for GridSampler {
    fn propose(&mut self, space: &ParameterSpace) -> Result<Point, SamplerError> {
        if self.cursor >= self.total(space) {
            return Err(SamplerError::Exhausted {
                name: self.name().to_string(),
                reason: format!("grid sweep of {} points complete", self.total(space)),
            });
        }
        let n = self.points_per_axis as u64;
        let mut remainder = self.cursor;
        self.cursor += 1;

        let embedding: Vec<f64> = (0..space.arity())
            .map(|_| {
                let idx = remainder % n;
                remainder /= n;
                if n == 1 {
                    0.5
                } else {
                    idx as f64 / (n - 1) as f64
                }
            })
            .collect();
        Ok(space.unproject(&embedding)?)
    }

    fn update(&mut self, _point: &Point, _robustness: f64, _verdict: bool) {}

    fn name(&self) -> &str {
        "grid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refute_space::{Dimension, DimensionKind, ParamValue};

    fn square() -> ParameterSpace {
        ParameterSpace::new(vec![
            Dimension {
                name: "x".to_string(),
                kind: DimensionKind::Continuous { lo: 0.0, hi: 2.0 },
                condition: None,
            },
            Dimension {
                name: "y".to_string(),
                kind: DimensionKind::Continuous { lo: 0.0, hi: 2.0 },
                condition: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_enumerates_full_lattice_then_exhausts() {
        let space = square();
        let mut sampler = GridSampler::new(3);
        let mut points = Vec::new();
        for _ in 0..9 {
            points.push(sampler.propose(&space).unwrap());
        }
        assert!(matches!(
            sampler.propose(&space),
            Err(SamplerError::Exhausted { .. })
        ));

        // All nine lattice points are distinct and on the grid.
        for p in &points {
            assert!(space.validate(p).is_ok());
            let ParamValue::Float(x) = p.get("x").unwrap() else {
                panic!("expected float");
            };
            assert!([0.0, 1.0, 2.0].iter().any(|g| (g - x).abs() < 1e-12));
        }
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert_ne!(points[i], points[j]);
            }
        }
    }

    #[test]
    fn test_single_point_axis_uses_midpoint() {
        let space = square();
        let mut sampler = GridSampler::new(1);
        let p = sampler.propose(&space).unwrap();
        assert_eq!(p.get("x"), Some(&ParamValue::Float(1.0)));
        assert!(matches!(
            sampler.propose(&space),
            Err(SamplerError::Exhausted { .. })
        ));
    }
}
