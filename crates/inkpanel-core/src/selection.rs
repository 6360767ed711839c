//! Selection handles and the gesture state machine shared by layers and raster regions.

use crate::geometry::{angle_from, rotate_about};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Visual size of a resize handle in canvas pixels.
pub const HANDLE_SIZE: f64 = 12.0;
/// Hit box of a resize handle, larger than the visual square for easier grabbing.
pub const HANDLE_HIT_SIZE: f64 = 16.0;
/// Distance from the top edge of a box to its rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 30.0;
/// Hit and visual radius of the rotation handle.
pub const ROTATE_HANDLE_RADIUS: f64 = 5.0;

/// One of the eight resize handles around a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

/// Which side of one axis a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEdge {
    /// The low edge (`x0` or `y0`) moves.
    Min,
    /// The high edge (`x1` or `y1`) moves.
    Max,
    /// The axis is untouched.
    Fixed,
}

impl ResizeHandle {
    /// All eight handles, corners first.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::Top,
        ResizeHandle::Right,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
    ];

    pub fn x_edge(self) -> AxisEdge {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft => AxisEdge::Min,
            ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight => AxisEdge::Max,
            ResizeHandle::Top | ResizeHandle::Bottom => AxisEdge::Fixed,
        }
    }

    pub fn y_edge(self) -> AxisEdge {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight => AxisEdge::Min,
            ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight => AxisEdge::Max,
            ResizeHandle::Left | ResizeHandle::Right => AxisEdge::Fixed,
        }
    }

    /// Unrotated position of the handle on `rect`.
    pub fn anchor(self, rect: Rect) -> Point {
        let x = match self.x_edge() {
            AxisEdge::Min => rect.x0,
            AxisEdge::Max => rect.x1,
            AxisEdge::Fixed => rect.center().x,
        };
        let y = match self.y_edge() {
            AxisEdge::Min => rect.y0,
            AxisEdge::Max => rect.y1,
            AxisEdge::Fixed => rect.center().y,
        };
        Point::new(x, y)
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Resize(ResizeHandle),
    /// Rotation handle (positioned above the box).
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates, already rotated.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a canvas point hits this handle.
    ///
    /// The rotation handle is a circle; resize handles are axis-aligned squares.
    pub fn hit_test(&self, point: Point) -> bool {
        match self.kind {
            HandleKind::Rotate => (point - self.position).hypot() <= ROTATE_HANDLE_RADIUS,
            HandleKind::Resize(_) => {
                let half = HANDLE_HIT_SIZE / 2.0;
                (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
            }
        }
    }
}

/// Position of the rotation handle for `rect` rotated by `rotation` about its center.
pub fn rotate_handle_position(rect: Rect, rotation: f64) -> Point {
    let center = rect.center();
    let unrotated = Point::new(center.x, rect.y0 - ROTATE_HANDLE_OFFSET);
    rotate_about(unrotated, center, rotation)
}

/// Top-center point of the box, where the rotation spoke starts.
pub fn spoke_origin(rect: Rect, rotation: f64) -> Point {
    let center = rect.center();
    rotate_about(Point::new(center.x, rect.y0), center, rotation)
}

/// All handles of a box: the eight resize handles plus the rotation handle.
pub fn handles(rect: Rect, rotation: f64) -> Vec<Handle> {
    let center = rect.center();
    let mut out: Vec<Handle> = ResizeHandle::ALL
        .iter()
        .map(|&h| Handle::new(rotate_about(h.anchor(rect), center, rotation), HandleKind::Resize(h)))
        .collect();
    out.push(Handle::new(rotate_handle_position(rect, rotation), HandleKind::Rotate));
    out
}

/// Find which handle (if any) is hit at the given point.
///
/// The rotation handle wins over resize handles when both overlap.
pub fn hit_test_handles(rect: Rect, rotation: f64, point: Point) -> Option<HandleKind> {
    let all = handles(rect, rotation);
    all.iter()
        .find(|h| h.kind == HandleKind::Rotate && h.hit_test(point))
        .or_else(|| all.iter().find(|h| h.hit_test(point)))
        .map(|h| h.kind)
}

/// Explicit state of an in-progress transform on the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Whole-object drag; `offset` is pointer minus object origin at press.
    Dragging { offset: Vec2 },
    Resizing {
        handle: ResizeHandle,
        start_rect: Rect,
        start_pos: Point,
    },
    Rotating {
        center: Point,
        start_angle: f64,
        base_angle: f64,
    },
}

impl Gesture {
    /// Begin a rotation about `center` with the pointer at `pointer`.
    pub fn rotating(center: Point, pointer: Point, base_angle: f64) -> Self {
        Gesture::Rotating {
            center,
            start_angle: angle_from(center, pointer),
            base_angle,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_handle_count_and_positions() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let hs = handles(rect, 0.0);
        assert_eq!(hs.len(), 9);
        let br = hs
            .iter()
            .find(|h| h.kind == HandleKind::Resize(ResizeHandle::BottomRight))
            .unwrap();
        assert_eq!(br.position, Point::new(100.0, 50.0));
        let rot = hs.iter().find(|h| h.kind == HandleKind::Rotate).unwrap();
        assert_eq!(rot.position, Point::new(50.0, -30.0));
    }

    #[test]
    fn test_rotate_handle_follows_rotation() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let p = rotate_handle_position(rect, FRAC_PI_2);
        // Top of the box turns to face right after a quarter turn clockwise.
        assert!((p.x - 130.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_box_larger_than_visual() {
        let rect = Rect::new(100.0, 100.0, 200.0, 200.0);
        let hit = hit_test_handles(rect, 0.0, Point::new(207.0, 207.0));
        assert_eq!(hit, Some(HandleKind::Resize(ResizeHandle::BottomRight)));
        assert_eq!(hit_test_handles(rect, 0.0, Point::new(150.0, 150.0)), None);
    }

    #[test]
    fn test_rotate_handle_is_circular() {
        let rect = Rect::new(0.0, 30.0, 4.0, 34.0);
        assert_eq!(hit_test_handles(rect, 0.0, Point::new(2.0, 2.0)), Some(HandleKind::Rotate));
        // Inside a 16px square around the handle but outside its 5px radius.
        assert_eq!(hit_test_handles(rect, 0.0, Point::new(6.0, 4.0)), None);
    }

    #[test]
    fn test_edges() {
        assert_eq!(ResizeHandle::Top.x_edge(), AxisEdge::Fixed);
        assert_eq!(ResizeHandle::Top.y_edge(), AxisEdge::Min);
        assert_eq!(ResizeHandle::BottomLeft.x_edge(), AxisEdge::Min);
        assert_eq!(ResizeHandle::BottomLeft.y_edge(), AxisEdge::Max);
    }

    #[test]
    fn test_gesture_default_idle() {
        assert!(!Gesture::default().is_active());
        assert!(Gesture::rotating(Point::ZERO, Point::new(1.0, 0.0), 0.0).is_active());
    }
}
