//! Shape layer payload.

use super::{Layer, LayerContent};
use crate::shapes::{SerializableColor, ShapeKind, trace_rect};
use kurbo::BezPath;
use serde::{Deserialize, Serialize};

/// Vector shape stamped onto the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeContent {
    pub shape_kind: ShapeKind,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
}

impl ShapeContent {
    pub fn new(
        shape_kind: ShapeKind,
        stroke_color: SerializableColor,
        stroke_width: f64,
        fill_color: Option<SerializableColor>,
    ) -> Self {
        Self {
            shape_kind,
            stroke_color,
            stroke_width,
            fill_color,
        }
    }
}

impl LayerContent for ShapeContent {
    const KIND: &'static str = "shape";
}

pub type ShapeLayer = Layer<ShapeContent>;

impl Layer<ShapeContent> {
    /// Outline path in unrotated canvas space.
    pub fn path(&self) -> BezPath {
        trace_rect(self.content.shape_kind, self.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn test_serialized_field_names() {
        let layer = ShapeLayer::new(
            Rect::new(0.0, 0.0, 40.0, 20.0),
            ShapeContent::new(ShapeKind::Heart, SerializableColor::black(), 2.0, None),
        );
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["shapeKind"], "heart");
        assert_eq!(json["strokeWidth"], 2.0);
        assert!(json["fillColor"].is_null());
        assert_eq!(json["width"], 40.0);

        let back: ShapeLayer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_resize_keeps_stroke() {
        let c = ShapeContent::new(ShapeKind::Circle, SerializableColor::black(), 5.0, None);
        assert_eq!(c.scaled(3.0, 0.5).stroke_width, 5.0);
    }
}
