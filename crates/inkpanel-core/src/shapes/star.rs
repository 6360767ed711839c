//! Five-pointed star.

use super::{BoxFrame, polyline_path};
use kurbo::BezPath;
use std::f64::consts::{FRAC_PI_2, PI};

/// Number of outer spikes.
pub const STAR_SPIKES: usize = 5;
/// Inner vertex radius as a fraction of the outer radius.
pub const STAR_INNER_RATIO: f64 = 0.5;

/// Star alternating outer and inner vertices, first spike pointing up.
pub fn star_path(frame: &BoxFrame) -> BezPath {
    let step = PI / STAR_SPIKES as f64;
    let points: Vec<_> = (0..STAR_SPIKES * 2)
        .map(|i| {
            let ratio = if i % 2 == 0 { 1.0 } else { STAR_INNER_RATIO };
            let angle = i as f64 * step - FRAC_PI_2;
            frame.at(frame.half_w * ratio * angle.cos(), frame.half_h * ratio * angle.sin())
        })
        .collect();
    polyline_path(&points)
}
