//! Block arrow and plus-shaped cross.

use super::{BoxFrame, polyline_path};
use kurbo::BezPath;

/// Half-width of the arrow shaft and cross arms, as a fraction of the smaller half extent.
pub const ARM_WIDTH_RATIO: f64 = 0.2;
/// Where the arrow head starts, as a fraction of the half width right of center.
const HEAD_START_RATIO: f64 = 0.3;

/// Right-pointing block arrow.
pub fn arrow_path(frame: &BoxFrame) -> BezPath {
    let arm = ARM_WIDTH_RATIO * frame.min_half();
    let (hw, hh) = (frame.half_w, frame.half_h);
    let head_x = hw * HEAD_START_RATIO;
    polyline_path(&[
        frame.at(-hw, -arm),
        frame.at(head_x, -arm),
        frame.at(head_x, -hh),
        frame.at(hw, 0.0),
        frame.at(head_x, hh),
        frame.at(head_x, arm),
        frame.at(-hw, arm),
    ])
}

/// Plus sign spanning the full box.
pub fn cross_path(frame: &BoxFrame) -> BezPath {
    let arm = ARM_WIDTH_RATIO * frame.min_half();
    let (hw, hh) = (frame.half_w, frame.half_h);
    polyline_path(&[
        frame.at(-arm, -hh),
        frame.at(arm, -hh),
        frame.at(arm, -arm),
        frame.at(hw, -arm),
        frame.at(hw, arm),
        frame.at(arm, arm),
        frame.at(arm, hh),
        frame.at(-arm, hh),
        frame.at(-arm, arm),
        frame.at(-hw, arm),
        frame.at(-hw, -arm),
        frame.at(-arm, -arm),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    #[test]
    fn test_cross_arm_width() {
        let frame = BoxFrame::new(0.0, 0.0, 100.0, 200.0);
        let path = cross_path(&frame);
        // Vertical arm is 2 * 0.2 * 50 wide.
        let first = path.elements()[0].end_point().unwrap();
        let second = path.elements()[1].end_point().unwrap();
        assert!((second.x - first.x - 20.0).abs() < 1e-9);
        assert_eq!(path.bounding_box(), kurbo::Rect::new(0.0, 0.0, 100.0, 200.0));
    }

    #[test]
    fn test_arrow_tip_at_right_edge() {
        let frame = BoxFrame::new(0.0, 0.0, 100.0, 40.0);
        let bb = arrow_path(&frame).bounding_box();
        assert_eq!(bb, kurbo::Rect::new(0.0, 0.0, 100.0, 40.0));
    }
}
