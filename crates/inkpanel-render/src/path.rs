//! Conversion from kurbo geometry to tiny-skia paths and transforms.

use kurbo::{Affine, BezPath, PathEl, Point};
use tiny_skia::{Path, PathBuilder, Transform};

/// Convert a kurbo path to a tiny-skia path.
///
/// Returns `None` for empty or degenerate paths (zero-area boxes, non-finite
/// coordinates) so callers can skip drawing without special cases.
pub fn to_skia_path(path: &BezPath) -> Option<Path> {
    let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(p) if finite(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) if finite(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(a, b) if finite(a) && finite(b) => {
                pb.quad_to(a.x as f32, a.y as f32, b.x as f32, b.y as f32)
            }
            PathEl::CurveTo(a, b, c) if finite(a) && finite(b) && finite(c) => {
                pb.cubic_to(a.x as f32, a.y as f32, b.x as f32, b.y as f32, c.x as f32, c.y as f32)
            }
            PathEl::ClosePath => pb.close(),
            _ => return None,
        }
    }
    pb.finish()
}

/// Straight segment between two points.
pub fn segment_path(from: Point, to: Point) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x as f32, from.y as f32);
    pb.line_to(to.x as f32, to.y as f32);
    pb.finish()
}

/// Convert a kurbo affine transform to a tiny-skia transform.
pub fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}
