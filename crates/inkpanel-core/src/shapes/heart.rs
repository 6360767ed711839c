//! Heart built from six cubic segments.

use super::BoxFrame;
use kurbo::BezPath;

/// Heart centered in the box, sized by the smaller half extent so it never distorts.
pub fn heart_path(frame: &BoxFrame) -> BezPath {
    let s = frame.min_half();
    let p = |dx: f64, dy: f64| frame.at(dx * s, dy * s);

    let mut path = BezPath::new();
    path.move_to(p(0.0, -0.4));
    // Left lobe.
    path.curve_to(p(0.0, -0.7), p(-0.2, -1.0), p(-0.5, -1.0));
    path.curve_to(p(-0.8, -1.0), p(-1.0, -0.75), p(-1.0, -0.4));
    path.curve_to(p(-1.0, 0.1), p(-0.4, 0.55), p(0.0, 1.0));
    // Right lobe, mirrored.
    path.curve_to(p(0.4, 0.55), p(1.0, 0.1), p(1.0, -0.4));
    path.curve_to(p(1.0, -0.75), p(0.8, -1.0), p(0.5, -1.0));
    path.curve_to(p(0.2, -1.0), p(0.0, -0.7), p(0.0, -0.4));
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Shape as _};

    #[test]
    fn test_heart_has_six_cubics() {
        let frame = BoxFrame::new(0.0, 0.0, 200.0, 100.0);
        let path = heart_path(&frame);
        let cubics = path.elements().iter().filter(|el| matches!(el, PathEl::CurveTo(..))).count();
        assert_eq!(cubics, 6);
    }

    #[test]
    fn test_heart_uses_smaller_extent() {
        let frame = BoxFrame::new(0.0, 0.0, 200.0, 100.0);
        let bb = heart_path(&frame).bounding_box();
        assert!((bb.width() - 100.0).abs() < 1e-6);
        assert!((bb.height() - 100.0).abs() < 1e-6);
    }
}
