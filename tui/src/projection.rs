//! Orthographic projection of the surface box onto the canvas.
//!
//! World coordinates are normalized into the cube `[-1, 1]^3` (state axes by
//! the grid limit, the value axis by the surface range) and then projected
//! onto the camera's right/up plane. Depth grows towards the viewer.

use lyapviz_engine::{Camera, SliceRange};

/// Screen position plus depth of a projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Projector {
    right: [f64; 3],
    up: [f64; 3],
    toward_viewer: [f64; 3],
    limit: f64,
    z_range: SliceRange,
}

impl Projector {
    #[must_use]
    pub fn new(camera: Camera, limit: f64, z_range: SliceRange) -> Self {
        let (sin_e, cos_e) = camera.elevation().to_radians().sin_cos();
        let (sin_a, cos_a) = camera.azimuth().to_radians().sin_cos();
        Self {
            right: [-sin_a, cos_a, 0.0],
            up: [-sin_e * cos_a, -sin_e * sin_a, cos_e],
            toward_viewer: [cos_e * cos_a, cos_e * sin_a, sin_e],
            limit: if limit > 0.0 { limit } else { 1.0 },
            z_range,
        }
    }

    /// Value-axis coordinate in `[-1, 1]`; a flat range maps to 0.
    #[must_use]
    pub fn normalize_z(&self, z: f64) -> f64 {
        let span = self.z_range.span();
        if span > 0.0 {
            2.0 * (z - self.z_range.min()) / span - 1.0
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn project(&self, x: f64, y: f64, z: f64) -> Projected {
        self.project_normalized([x / self.limit, y / self.limit, self.normalize_z(z)])
    }

    #[must_use]
    pub fn project_normalized(&self, p: [f64; 3]) -> Projected {
        Projected {
            x: dot(p, self.right),
            y: dot(p, self.up),
            depth: dot(p, self.toward_viewer),
        }
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use lyapviz_engine::{Camera, CameraPreset, SliceRange};

    use super::Projector;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn top_down_shows_both_state_axes() {
        let p = Projector::new(
            Camera::from_preset(CameraPreset::TopDown),
            3.0,
            SliceRange::new(0.0, 10.0),
        );
        let q = p.project(3.0, -1.5, 7.0);
        assert!(close(q.x, 1.0));
        assert!(close(q.y, -0.5));
        // Higher values sit closer to a viewer looking down.
        assert!(p.project(0.0, 0.0, 10.0).depth > p.project(0.0, 0.0, 0.0).depth);
    }

    #[test]
    fn side_views_show_value_axis_vertically() {
        let range = SliceRange::new(-4.0, 4.0);
        let x1_side = Projector::new(Camera::from_preset(CameraPreset::X1Side), 2.0, range);
        let q = x1_side.project(1.0, 2.0, 4.0);
        assert!(close(q.x, 0.5));
        assert!(close(q.y, 1.0));

        let x2_side = Projector::new(Camera::from_preset(CameraPreset::X2Side), 2.0, range);
        let q = x2_side.project(1.0, 2.0, -4.0);
        assert!(close(q.x, 1.0));
        assert!(close(q.y, -1.0));
    }

    #[test]
    fn flat_range_projects_to_middle_height() {
        let p = Projector::new(Camera::default(), 3.0, SliceRange::new(5.0, 5.0));
        assert_eq!(p.normalize_z(5.0), 0.0);
    }
}
