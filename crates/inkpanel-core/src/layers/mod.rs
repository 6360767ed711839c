//! Transformable layers floating above the raster background.
//!
//! Shape layers and text layers share one generic [`Layer`] type. Only the
//! payload differs, so hit-testing, drag/resize/rotate, duplicate, delete and
//! history bookkeeping are written once in [`stack`] and [`gesture`].

pub mod gesture;
pub mod shape;
pub mod stack;
pub mod text;

pub use gesture::{LayerEditor, PressTarget};
pub use shape::{ShapeContent, ShapeLayer};
pub use stack::{DUPLICATE_OFFSET, LayerChange, LayerStack};
pub use text::{CanvasFont, EstimatedMetrics, TextContent, TextLayer, TextMeasure};

use crate::geometry::{MIN_BOX_SIZE, rect_contains};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

/// Payload carried by a layer.
pub trait LayerContent: Clone + fmt::Debug + PartialEq {
    /// Human-readable kind, used in log lines.
    const KIND: &'static str;

    /// Content after its box was resized by `sx` x `sy` from the gesture start.
    fn scaled(&self, _sx: f64, _sy: f64) -> Self {
        self.clone()
    }
}

/// An independently transformable object.
///
/// `x, y, width, height` is the axis-aligned box before rotation; `rotation`
/// is in radians about the box center and is never normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer<C> {
    pub id: LayerId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub content: C,
}

impl<C: LayerContent> Layer<C> {
    /// Create a layer with a fresh identity. Width and height are floored at 1.
    pub fn new(rect: Rect, content: C) -> Self {
        let rect = rect.abs();
        Self {
            id: Uuid::new_v4(),
            x: rect.x0,
            y: rect.y0,
            width: rect.width().max(MIN_BOX_SIZE),
            height: rect.height().max(MIN_BOX_SIZE),
            rotation: 0.0,
            content,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Replace the box, keeping the size invariant.
    pub fn set_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width().max(MIN_BOX_SIZE);
        self.height = rect.height().max(MIN_BOX_SIZE);
    }

    /// Axis-aligned hit test. Rotation is ignored.
    pub fn contains(&self, point: Point) -> bool {
        rect_contains(self.rect(), point)
    }

    /// Clone with a newly generated identity.
    pub fn with_new_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SerializableColor, ShapeKind};

    fn content() -> ShapeContent {
        ShapeContent::new(ShapeKind::Star, SerializableColor::black(), 3.0, None)
    }

    #[test]
    fn test_new_layer_floors_size() {
        let layer = Layer::new(Rect::new(10.0, 10.0, 10.0, 10.0), content());
        assert_eq!(layer.width, 1.0);
        assert_eq!(layer.height, 1.0);
    }

    #[test]
    fn test_negative_rect_normalized() {
        let layer = Layer::new(Rect::new(100.0, 80.0, 20.0, 40.0), content());
        assert_eq!(layer.rect(), Rect::new(20.0, 40.0, 100.0, 80.0));
    }

    #[test]
    fn test_contains_ignores_rotation() {
        let mut layer = Layer::new(Rect::new(0.0, 0.0, 100.0, 10.0), content());
        layer.rotation = 1.2;
        assert!(layer.contains(Point::new(95.0, 5.0)));
        assert!(!layer.contains(Point::new(50.0, 40.0)));
    }

    #[test]
    fn test_with_new_id() {
        let layer = Layer::new(Rect::new(0.0, 0.0, 10.0, 10.0), content());
        let copy = layer.with_new_id();
        assert_ne!(copy.id, layer.id);
        assert_eq!(copy.rect(), layer.rect());
    }
}
