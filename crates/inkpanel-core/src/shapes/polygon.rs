//! Triangle, diamond and the regular n-gons.

use super::{BoxFrame, polyline_path};
use kurbo::BezPath;
use std::f64::consts::TAU;

/// Isosceles triangle with its apex at the top-center of the box.
pub fn triangle_path(frame: &BoxFrame) -> BezPath {
    polyline_path(&[
        frame.at(0.0, -frame.half_h),
        frame.at(frame.half_w, frame.half_h),
        frame.at(-frame.half_w, frame.half_h),
    ])
}

/// Rhombus touching the midpoint of each box edge.
pub fn diamond_path(frame: &BoxFrame) -> BezPath {
    polyline_path(&[
        frame.at(0.0, -frame.half_h),
        frame.at(frame.half_w, 0.0),
        frame.at(0.0, frame.half_h),
        frame.at(-frame.half_w, 0.0),
    ])
}

/// Polygon with `sides` vertices on the ellipse inscribed in the box.
///
/// Vertex `i` sits at angle `i * 2π / sides + phase`.
pub fn regular_polygon_path(frame: &BoxFrame, sides: usize, phase: f64) -> BezPath {
    let points: Vec<_> = (0..sides)
        .map(|i| {
            let angle = i as f64 * TAU / sides as f64 + phase;
            frame.at(frame.half_w * angle.cos(), frame.half_h * angle.sin())
        })
        .collect();
    polyline_path(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};
    use std::f64::consts::FRAC_PI_2;

    fn vertices(path: &BezPath) -> Vec<Point> {
        path.elements()
            .iter()
            .filter_map(|el| match *el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pentagon_starts_at_top() {
        let frame = BoxFrame::new(0.0, 0.0, 100.0, 100.0);
        let pts = vertices(&regular_polygon_path(&frame, 5, -FRAC_PI_2));
        assert_eq!(pts.len(), 5);
        assert!((pts[0].x - 50.0).abs() < 1e-9);
        assert!(pts[0].y.abs() < 1e-9);
    }

    #[test]
    fn test_vertex_counts() {
        let frame = BoxFrame::new(0.0, 0.0, 60.0, 40.0);
        for sides in [6, 7, 8] {
            assert_eq!(vertices(&regular_polygon_path(&frame, sides, 0.0)).len(), sides);
        }
        assert_eq!(vertices(&triangle_path(&frame)).len(), 3);
        assert_eq!(vertices(&diamond_path(&frame)).len(), 4);
    }

    #[test]
    fn test_diamond_touches_edges() {
        let frame = BoxFrame::new(10.0, 20.0, 30.0, 60.0);
        let pts = vertices(&diamond_path(&frame));
        assert_eq!(pts[0], Point::new(20.0, 20.0));
        assert_eq!(pts[1], Point::new(30.0, 40.0));
    }
}
