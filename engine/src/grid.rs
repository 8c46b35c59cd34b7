//! Square sampling lattices shared by the verifier and the surface grids.

use thiserror::Error;

/// Points closer to the origin than this are excluded from sampling checks.
pub const ORIGIN_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GridError {
    #[error("domain limit must be a finite number greater than 0, got {0}")]
    InvalidLimit(f64),
    #[error("at least 2 points per axis are required, got {0}")]
    TooFewPoints(usize),
}

/// Validated bounds `[-limit, limit]` and points per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    limit: f64,
    points: usize,
}

impl GridSpec {
    pub fn new(limit: f64, points: usize) -> Result<Self, GridError> {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(GridError::InvalidLimit(limit));
        }
        if points < 2 {
            return Err(GridError::TooFewPoints(points));
        }
        Ok(Self { limit, points })
    }

    #[must_use]
    pub fn limit(self) -> f64 {
        self.limit
    }

    #[must_use]
    pub fn points(self) -> usize {
        self.points
    }

    /// Evenly spaced coordinates from `-limit` to `limit`, both included.
    #[must_use]
    pub fn axis(self) -> Vec<f64> {
        linspace(-self.limit, self.limit, self.points)
    }
}

#[must_use]
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = (points - 1) as f64;
            (0..points)
                .map(|i| start + (end - start) * (i as f64 / last))
                .collect()
        }
    }
}

/// Every lattice point of a [`GridSpec`] in row-major order.
///
/// Row `r` holds the points whose second coordinate is `axis[r]`, so
/// `points[r * n + c] == [axis[c], axis[r]]`.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    axis: Vec<f64>,
    points: Vec<[f64; 2]>,
    off_origin: Vec<bool>,
}

impl SampleGrid {
    #[must_use]
    pub fn new(spec: GridSpec) -> Self {
        let axis = spec.axis();
        let points: Vec<[f64; 2]> = axis
            .iter()
            .flat_map(|&y| axis.iter().map(move |&x| [x, y]))
            .collect();
        let off_origin = points
            .iter()
            .map(|[x, y]| x.hypot(*y) > ORIGIN_EPSILON)
            .collect();
        Self {
            axis,
            points,
            off_origin,
        }
    }

    #[must_use]
    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    #[must_use]
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Mask aligned with [`SampleGrid::points`]; `true` means off the origin.
    #[must_use]
    pub fn off_origin_mask(&self) -> &[bool] {
        &self.off_origin
    }

    #[must_use]
    pub fn off_origin_count(&self) -> usize {
        self.off_origin.iter().filter(|keep| **keep).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{GridError, GridSpec, SampleGrid, linspace};

    #[test]
    fn rejects_invalid_specs() {
        assert_eq!(GridSpec::new(0.0, 10), Err(GridError::InvalidLimit(0.0)));
        assert_eq!(GridSpec::new(-1.0, 10), Err(GridError::InvalidLimit(-1.0)));
        assert!(matches!(
            GridSpec::new(f64::NAN, 10),
            Err(GridError::InvalidLimit(_))
        ));
        assert_eq!(GridSpec::new(3.0, 1), Err(GridError::TooFewPoints(1)));
        assert!(GridSpec::new(3.0, 2).is_ok());
    }

    #[test]
    fn linspace_includes_both_endpoints() {
        let values = linspace(-2.0, 2.0, 5);
        assert_eq!(values, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(linspace(-3.0, 3.0, 40).first(), Some(&-3.0));
        assert_eq!(linspace(-3.0, 3.0, 40).last(), Some(&3.0));
    }

    #[test]
    fn even_grid_has_no_origin_point() {
        let grid = SampleGrid::new(GridSpec::new(3.0, 40).unwrap());
        assert_eq!(grid.points().len(), 1600);
        assert_eq!(grid.off_origin_count(), 1600);
    }

    #[test]
    fn odd_grid_masks_exactly_the_origin() {
        let grid = SampleGrid::new(GridSpec::new(2.0, 5).unwrap());
        assert_eq!(grid.off_origin_count(), 24);
        let masked: Vec<_> = grid
            .points()
            .iter()
            .zip(grid.off_origin_mask())
            .filter(|(_, keep)| !**keep)
            .map(|(point, _)| *point)
            .collect();
        assert_eq!(masked, vec![[0.0, 0.0]]);
    }

    #[test]
    fn points_are_row_major_in_second_coordinate() {
        let grid = SampleGrid::new(GridSpec::new(1.0, 3).unwrap());
        assert_eq!(grid.points()[1], [0.0, -1.0]);
        assert_eq!(grid.points()[3], [-1.0, 0.0]);
    }
}
