//! Marching-squares iso-lines over a [`SurfaceGrid`].

use lyapviz_engine::SurfaceGrid;

/// A contour piece in state-space coordinates.
pub type Segment = [(f64, f64); 2];

/// Line segments where the surface crosses `level`.
///
/// Cells with a non-finite corner are skipped. A corner exactly at `level`
/// counts as above it.
#[must_use]
pub fn contour_segments(surface: &SurfaceGrid, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    if !level.is_finite() {
        return segments;
    }
    let axis = surface.axis();
    let n = surface.size();
    for row in 0..n.saturating_sub(1) {
        for col in 0..n - 1 {
            let (x0, x1) = (axis[col], axis[col + 1]);
            let (y0, y1) = (axis[row], axis[row + 1]);
            // Counter-clockwise from the bottom-left corner.
            let corners = [
                ((x0, y0), surface.value(row, col)),
                ((x1, y0), surface.value(row, col + 1)),
                ((x1, y1), surface.value(row + 1, col + 1)),
                ((x0, y1), surface.value(row + 1, col)),
            ];
            if corners.iter().any(|(_, v)| !v.is_finite()) {
                continue;
            }
            cell_segments(&corners, level, &mut segments);
        }
    }
    segments
}

/// `corners` are bottom-left, bottom-right, top-right, top-left.
fn cell_segments(corners: &[((f64, f64), f64); 4], level: f64, out: &mut Vec<Segment>) {
    let above = corners.map(|(_, v)| v >= level);
    // Edge i joins corner i and corner i+1: bottom, right, top, left.
    let mut crossings: [Option<(f64, f64)>; 4] = [None; 4];
    for (edge, crossing) in crossings.iter_mut().enumerate() {
        let next = (edge + 1) % 4;
        if above[edge] != above[next] {
            *crossing = Some(interpolate(corners[edge], corners[next], level));
        }
    }
    match crossings {
        [Some(bottom), Some(right), Some(top), Some(left)] => {
            let center = corners.iter().map(|(_, v)| v).sum::<f64>() / 4.0;
            if (center >= level) == above[0] {
                out.push([bottom, right]);
                out.push([top, left]);
            } else {
                out.push([bottom, left]);
                out.push([right, top]);
            }
        }
        _ => {
            let mut points = crossings.into_iter().flatten();
            if let (Some(a), Some(b)) = (points.next(), points.next()) {
                out.push([a, b]);
            }
        }
    }
}

fn interpolate(a: ((f64, f64), f64), b: ((f64, f64), f64), level: f64) -> (f64, f64) {
    let ((ax, ay), av) = a;
    let ((bx, by), bv) = b;
    let t = if bv == av { 0.5 } else { (level - av) / (bv - av) };
    (ax + (bx - ax) * t, ay + (by - ay) * t)
}
