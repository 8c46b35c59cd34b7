//! Dense evaluation of V and Vdot for the visualizer.

use lyapviz_symbolic::{CompiledExpr, Expr};
use lyapviz_types::ui::{SliceRange, SurfaceKind};

use crate::grid::{GridSpec, SampleGrid};

/// One surface sampled over a square grid.
///
/// `values[row * n + col]` is the surface at `(axis[col], axis[row])`.
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    kind: SurfaceKind,
    axis: Vec<f64>,
    values: Vec<f64>,
    range: SliceRange,
}

impl SurfaceGrid {
    #[must_use]
    pub fn evaluate(kind: SurfaceKind, expr: &Expr, grid: &SampleGrid) -> Self {
        let mut values = Vec::with_capacity(grid.points().len());
        CompiledExpr::new(expr).eval_many(grid.points().iter().copied(), &mut values);
        Self::from_values(kind, grid.axis().to_vec(), values)
    }

    /// Build from precomputed row-major values; `values.len()` must be `axis.len()^2`.
    #[must_use]
    pub fn from_values(kind: SurfaceKind, axis: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), axis.len() * axis.len());
        let (min, max) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or_else(|| {
                tracing::warn!(surface = kind.label(), "surface has no finite values");
                (0.0, 0.0)
            });
        Self {
            kind,
            axis,
            values,
            range: SliceRange::new(min, max),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    #[must_use]
    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    /// Points per axis.
    #[must_use]
    pub fn size(&self) -> usize {
        self.axis.len()
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row * self.size() + col)
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// `[min, max]` over the finite values.
    #[must_use]
    pub fn range(&self) -> SliceRange {
        self.range
    }

    #[must_use]
    pub fn limit(&self) -> f64 {
        self.axis.last().copied().unwrap_or(0.0)
    }
}

/// Both surfaces on one shared grid.
#[derive(Debug, Clone)]
pub struct Surfaces {
    v: SurfaceGrid,
    vdot: SurfaceGrid,
}

impl Surfaces {
    #[must_use]
    pub fn evaluate(v: &Expr, vdot: &Expr, spec: GridSpec) -> Self {
        let grid = SampleGrid::new(spec);
        let surfaces = Self {
            v: SurfaceGrid::evaluate(SurfaceKind::V, v, &grid),
            vdot: SurfaceGrid::evaluate(SurfaceKind::Vdot, vdot, &grid),
        };
        tracing::debug!(
            points = spec.points(),
            v_min = surfaces.v.range().min(),
            v_max = surfaces.v.range().max(),
            vdot_min = surfaces.vdot.range().min(),
            vdot_max = surfaces.vdot.range().max(),
            "evaluated surfaces"
        );
        surfaces
    }

    #[must_use]
    pub fn get(&self, kind: SurfaceKind) -> &SurfaceGrid {
        match kind {
            SurfaceKind::V => &self.v,
            SurfaceKind::Vdot => &self.vdot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SurfaceGrid, Surfaces};
    use crate::grid::{GridSpec, SampleGrid};
    use lyapviz_symbolic::{StateVars, parse};
    use lyapviz_types::ui::SurfaceKind;

    #[test]
    fn range_spans_finite_values() {
        let vars = StateVars::default();
        let v = parse("x1**2 + x2**2", &vars).unwrap();
        let grid = SampleGrid::new(GridSpec::new(2.0, 5).unwrap());
        let surface = SurfaceGrid::evaluate(SurfaceKind::V, &v, &grid);
        assert_eq!(surface.range().min(), 0.0);
        assert_eq!(surface.range().max(), 8.0);
        assert_eq!(surface.value(2, 2), 0.0);
        assert_eq!(surface.value(0, 4), 8.0);
        assert_eq!(surface.limit(), 2.0);
    }

    #[test]
    fn non_finite_values_are_skipped_for_bounds() {
        let surface = SurfaceGrid::from_values(
            SurfaceKind::Vdot,
            vec![-1.0, 1.0],
            vec![f64::NAN, -3.0, f64::INFINITY, 2.0],
        );
        assert_eq!(surface.range().min(), -3.0);
        assert_eq!(surface.range().max(), 2.0);
    }

    #[test]
    fn all_non_finite_collapses_to_zero_range() {
        let surface = SurfaceGrid::from_values(SurfaceKind::V, vec![0.0], vec![f64::NAN]);
        assert_eq!(surface.range().span(), 0.0);
    }

    #[test]
    fn surfaces_share_one_grid() {
        let vars = StateVars::default();
        let v = parse("x1**2 + x2**2", &vars).unwrap();
        let vdot = parse("-2*x1**4 - 2*x2**2", &vars).unwrap();
        let surfaces = Surfaces::evaluate(&v, &vdot, GridSpec::new(3.0, 80).unwrap());
        assert_eq!(surfaces.get(SurfaceKind::V).axis(), surfaces.get(SurfaceKind::Vdot).axis());
        assert_eq!(surfaces.get(SurfaceKind::Vdot).kind(), SurfaceKind::Vdot);
        assert!(surfaces.get(SurfaceKind::Vdot).range().max() <= 0.0);
    }
}
