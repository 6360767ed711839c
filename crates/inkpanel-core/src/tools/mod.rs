//! Tool selection and per-tool settings.

use crate::shapes::{SerializableColor, ShapeKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Fixed width of the eraser stroke.
pub const ERASER_WIDTH: f64 = 20.0;

/// Default font family for text and balloon entries.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Default font size in CSS pixels.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
/// Default emoji glyph stamped by the emoji tool.
pub const DEFAULT_EMOJI: &str = "😀";
/// Font size used for stamped emoji.
pub const EMOJI_FONT_SIZE: f64 = 48.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Eraser,
    /// Freehand raster shapes baked into the background.
    Shapes,
    /// Shapes placed as transformable layers.
    ObjectShapes,
    Fill,
    Text,
    Balloon,
    Emoji,
}

impl ToolKind {
    /// Tools whose press-drag-release draws a shape outline preview.
    pub fn previews_shape(&self) -> bool {
        matches!(self, ToolKind::Shapes | ToolKind::ObjectShapes)
    }

    /// Tools that stroke pixels into the background while dragging.
    pub fn strokes(&self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Eraser)
    }
}

/// Pen width classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PenWidth {
    Fine,
    Thin,
    #[default]
    Medium,
    Thick,
    VeryThick,
}

impl PenWidth {
    /// Stroke width in canvas pixels.
    pub fn pixels(&self) -> f64 {
        match self {
            PenWidth::Fine => 1.0,
            PenWidth::Thin => 3.0,
            PenWidth::Medium => 5.0,
            PenWidth::Thick => 8.0,
            PenWidth::VeryThick => 12.0,
        }
    }
}

/// Everything the toolbar feeds into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub shape_kind: ShapeKind,
    pub pen_width: PenWidth,
    pub color: SerializableColor,
    pub font_family: String,
    pub font_size: f64,
    pub emoji: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            shape_kind: ShapeKind::default(),
            pen_width: PenWidth::default(),
            color: SerializableColor::black(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            emoji: DEFAULT_EMOJI.to_string(),
        }
    }
}

impl ToolSettings {
    /// Stroke width for the active tool.
    pub fn stroke_width(&self) -> f64 {
        match self.tool {
            ToolKind::Eraser => ERASER_WIDTH,
            _ => self.pen_width.pixels(),
        }
    }
}

/// State of a press-drag-release tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Tool is actively being used.
    Active {
        start: Point,
        current: Point,
        /// Previous pointer position, for stroking segment by segment.
        last: Point,
    },
}

impl ToolState {
    pub fn begin(&mut self, point: Point) {
        *self = ToolState::Active {
            start: point,
            current: point,
            last: point,
        };
    }

    /// Move the interaction to `point`, returning the segment just covered.
    pub fn update(&mut self, point: Point) -> Option<(Point, Point)> {
        match self {
            ToolState::Active { current, last, .. } => {
                *last = *current;
                *current = point;
                Some((*last, point))
            }
            ToolState::Idle => None,
        }
    }

    /// Finish and return the drag rectangle (start to last position), if active.
    pub fn end(&mut self) -> Option<(Point, Point)> {
        match std::mem::take(self) {
            ToolState::Active { start, current, .. } => Some((start, current)),
            ToolState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ToolState::Active { .. })
    }

    /// Current drag rectangle, normalized.
    pub fn drag_rect(&self) -> Option<Rect> {
        match self {
            ToolState::Active { start, current, .. } => Some(Rect::from_points(*start, *current)),
            ToolState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_widths() {
        assert_eq!(PenWidth::Fine.pixels(), 1.0);
        assert_eq!(PenWidth::VeryThick.pixels(), 12.0);
    }

    #[test]
    fn test_eraser_width_fixed() {
        let settings = ToolSettings {
            tool: ToolKind::Eraser,
            pen_width: PenWidth::Fine,
            ..Default::default()
        };
        assert_eq!(settings.stroke_width(), ERASER_WIDTH);
    }

    #[test]
    fn test_tool_state_segments() {
        let mut state = ToolState::default();
        assert!(state.update(Point::new(1.0, 1.0)).is_none());
        state.begin(Point::new(0.0, 0.0));
        assert_eq!(
            state.update(Point::new(10.0, 0.0)),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 0.0)))
        );
        assert_eq!(
            state.update(Point::new(10.0, 5.0)),
            Some((Point::new(10.0, 0.0), Point::new(10.0, 5.0)))
        );
        assert_eq!(state.drag_rect(), Some(Rect::new(0.0, 0.0, 10.0, 5.0)));
        assert_eq!(state.end(), Some((Point::new(0.0, 0.0), Point::new(10.0, 5.0))));
        assert!(!state.is_active());
    }

    #[test]
    fn test_tool_names() {
        let json = serde_json::to_string(&ToolKind::ObjectShapes).unwrap();
        assert_eq!(json, "\"objectShapes\"");
        let width: PenWidth = serde_json::from_str("\"very-thick\"").unwrap();
        assert_eq!(width, PenWidth::VeryThick);
    }
}
