//! Rectangle, rotation and resize math shared by layers and raster regions.
//!
//! Every function here is pure and works in logical canvas pixels.

use crate::selection::{AxisEdge, ResizeHandle};
use kurbo::{Point, Rect, Size, Vec2};

/// Smallest width or height a resized box may collapse to.
pub const MIN_BOX_SIZE: f64 = 1.0;

/// Build a rectangle from two arbitrary drag points (start may be after end).
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Clamp a point into `[0, size.width] x [0, size.height]`.
pub fn clamp_point(point: Point, size: Size) -> Point {
    Point::new(point.x.clamp(0.0, size.width), point.y.clamp(0.0, size.height))
}

/// Clamp an origin so that a box of `box_size` stays fully inside `bounds`.
///
/// Boxes larger than the bounds are pinned to the origin.
pub fn clamp_origin(origin: Point, box_size: Size, bounds: Size) -> Point {
    let max_x = (bounds.width - box_size.width).max(0.0);
    let max_y = (bounds.height - box_size.height).max(0.0);
    Point::new(origin.x.clamp(0.0, max_x), origin.y.clamp(0.0, max_y))
}

/// Shift a rectangle (keeping its size) so it lies inside `bounds`.
pub fn clamp_rect(rect: Rect, bounds: Size) -> Rect {
    let origin = clamp_origin(rect.origin(), rect.size(), bounds);
    Rect::from_origin_size(origin, rect.size())
}

/// Rotate `point` around `center` by `angle` radians (clockwise in screen space).
pub fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Rotate a vector by `angle` radians.
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Corners of `rect` rotated about its own center, in TL, TR, BR, BL order.
pub fn rotated_corners(rect: Rect, rotation: f64) -> [Point; 4] {
    let center = rect.center();
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
    .map(|p| rotate_about(p, center, rotation))
}

/// Axis-aligned bounds of a `size` box centered at `center` and rotated by `rotation`.
///
/// Callers always pass the original unrotated size, so repeated rotations
/// never grow the result.
pub fn rotated_bounds(size: Size, center: Point, rotation: f64) -> Rect {
    let unrotated = Rect::from_center_size(center, size);
    let corners = rotated_corners(unrotated, rotation);

    let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    Rect::new(min_x, min_y, max_x, max_y)
}

/// Inclusive point-in-rectangle test (kurbo's `contains` excludes the far edges).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Check whether `point` lies inside `rect` rotated by `rotation` about its center.
pub fn point_in_rotated_rect(point: Point, rect: Rect, rotation: f64) -> bool {
    let local = rotate_about(point, rect.center(), -rotation);
    rect_contains(rect, local)
}

/// Angle in radians of the ray from `center` to `point`.
pub fn angle_from(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x)
}

/// Total rotation while dragging a rotation handle.
///
/// `base_angle` is the rotation the target had when the gesture started and
/// `start_angle` is the pointer angle at that moment, so successive gestures
/// compose instead of resetting.
pub fn accumulated_rotation(center: Point, start_angle: f64, base_angle: f64, pointer: Point) -> f64 {
    base_angle + (angle_from(center, pointer) - start_angle)
}

/// Resize `start` by dragging `handle` by `delta`.
///
/// Corner handles move both axes, edge handles move one. A dimension never
/// drops below [`MIN_BOX_SIZE`]; when the dragged edge crosses the opposite
/// one, the box is re-anchored against that opposite edge.
pub fn resize_rect(handle: ResizeHandle, start: Rect, delta: Vec2) -> Rect {
    let (x0, x1) = resize_axis(start.x0, start.x1, delta.x, handle.x_edge());
    let (y0, y1) = resize_axis(start.y0, start.y1, delta.y, handle.y_edge());
    Rect::new(x0, y0, x1, y1)
}

fn resize_axis(min: f64, max: f64, delta: f64, edge: AxisEdge) -> (f64, f64) {
    match edge {
        AxisEdge::Fixed => (min, max),
        AxisEdge::Min => {
            let moved = min + delta;
            if max - moved < MIN_BOX_SIZE {
                (max - MIN_BOX_SIZE, max)
            } else {
                (moved, max)
            }
        }
        AxisEdge::Max => {
            let moved = max + delta;
            if moved - min < MIN_BOX_SIZE {
                (min, min + MIN_BOX_SIZE)
            } else {
                (min, moved)
            }
        }
    }
}

/// Width and height scale factors between two boxes, guarding zero-sized starts.
pub fn scale_factors(from: Rect, to: Rect) -> (f64, f64) {
    let sx = to.width() / from.width().max(MIN_BOX_SIZE);
    let sy = to.height() / from.height().max(MIN_BOX_SIZE);
    (sx, sy)
}
