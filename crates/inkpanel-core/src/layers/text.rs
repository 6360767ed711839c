//! Text and emoji layer payload, and the measurement seam used to size it.

use super::{Layer, LayerContent};
use crate::geometry::MIN_BOX_SIZE;
use crate::shapes::SerializableColor;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest font size a resize can shrink text to.
pub const MIN_FONT_SIZE: f64 = 1.0;

/// Advance per character assumed by [`EstimatedMetrics`], as a fraction of the font size.
pub const ESTIMATED_CHAR_WIDTH: f64 = 0.6;
/// Line height assumed by [`EstimatedMetrics`], as a fraction of the font size.
pub const ESTIMATED_LINE_HEIGHT: f64 = 1.2;

/// A font as handed to the rasterizer: a pixel size in canvas space and a family name.
///
/// Formats as `"{px}px {family}"`, e.g. `24px Arial`.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasFont {
    pub size_px: f64,
    pub family: String,
}

impl CanvasFont {
    pub fn new(size_px: f64, family: impl Into<String>) -> Self {
        Self {
            size_px,
            family: family.into(),
        }
    }
}

impl fmt::Display for CanvasFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// Measures the box occupied by a run of text.
pub trait TextMeasure {
    /// Width and height of `text` (which may contain newlines) in canvas pixels.
    fn measure(&self, text: &str, font: &CanvasFont) -> Size;
}

/// Fixed-ratio metrics for when no font file is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl TextMeasure for EstimatedMetrics {
    fn measure(&self, text: &str, font: &CanvasFont) -> Size {
        let lines: Vec<&str> = text.split('\n').collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Size::new(
            longest as f64 * font.size_px * ESTIMATED_CHAR_WIDTH,
            lines.len() as f64 * font.size_px * ESTIMATED_LINE_HEIGHT,
        )
    }
}

/// Text (or a single emoji glyph) placed on the panel.
///
/// `font_size` is in CSS pixels and does not depend on the display scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub font: String,
    pub font_size: f64,
    pub color: SerializableColor,
}

impl TextContent {
    pub fn new(text: impl Into<String>, font: impl Into<String>, font_size: f64, color: SerializableColor) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            font_size,
            color,
        }
    }

    /// Font used for measuring and drawing at the given display scale.
    pub fn canvas_font(&self, scale: f64) -> CanvasFont {
        CanvasFont::new(self.font_size * scale, self.font.clone())
    }
}

impl LayerContent for TextContent {
    const KIND: &'static str = "text";

    /// Glyphs follow the box: the font is scaled by the mean of both factors.
    fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            font_size: (self.font_size * (sx + sy) / 2.0).max(MIN_FONT_SIZE),
            ..self.clone()
        }
    }
}

pub type TextLayer = Layer<TextContent>;

impl Layer<TextContent> {
    /// New layer with its box measured from the content, top-left at `anchor`.
    pub fn measured(content: TextContent, anchor: Point, measurer: &dyn TextMeasure, scale: f64) -> Self {
        let size = measurer.measure(&content.text, &content.canvas_font(scale));
        Layer::new(Rect::from_origin_size(anchor, size), content)
    }

    /// New layer with its box measured from the content and centered on `center`.
    pub fn measured_centered(content: TextContent, center: Point, measurer: &dyn TextMeasure, scale: f64) -> Self {
        let size = measurer.measure(&content.text, &content.canvas_font(scale));
        Layer::new(Rect::from_center_size(center, size), content)
    }

    /// Recompute the box size from the current text, font and font size.
    ///
    /// The origin stays put.
    pub fn remeasure(&mut self, measurer: &dyn TextMeasure, scale: f64) {
        let size = measurer.measure(&self.content.text, &self.content.canvas_font(scale));
        self.width = size.width.max(MIN_BOX_SIZE);
        self.height = size.height.max(MIN_BOX_SIZE);
    }

    /// Replace the text and remeasure.
    pub fn set_text(&mut self, text: impl Into<String>, measurer: &dyn TextMeasure, scale: f64) {
        self.content.text = text.into();
        self.remeasure(measurer, scale);
    }
}
