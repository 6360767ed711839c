//! Panel model: one comic page with its raster background, grid layout and layers.

use crate::layers::{LayerStack, ShapeContent, TextContent};
use base64::engine::general_purpose::STANDARD;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Logical canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1200;
/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 800;
/// Logical canvas size.
pub const CANVAS_SIZE: Size = Size::new(CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
/// Space between and around grid cells.
pub const GUTTER: f64 = 12.0;

/// Errors from loading or building a panel.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Invalid panel JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Background buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BackgroundSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Grid of comic cells: a row count and the number of columns in each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub rows: usize,
    #[serde(default)]
    pub columns_per_row: Vec<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            rows: 1,
            columns_per_row: vec![1],
        }
    }
}

impl Layout {
    pub fn new(rows: usize, columns_per_row: Vec<usize>) -> Self {
        Self { rows, columns_per_row }
    }

    /// Columns in `row`; a missing or zero entry counts as one column.
    pub fn columns_in(&self, row: usize) -> usize {
        self.columns_per_row.get(row).copied().unwrap_or(1).max(1)
    }

    /// Cell rectangles on a canvas of `size`, row-major.
    pub fn cells_in(&self, size: Size) -> Vec<Rect> {
        if self.rows == 0 {
            return Vec::new();
        }
        let rows = self.rows as f64;
        let row_height = (size.height - GUTTER * (rows + 1.0)) / rows;

        let mut cells = Vec::new();
        for row in 0..self.rows {
            let cols = self.columns_in(row);
            let col_width = (size.width - GUTTER * (cols as f64 + 1.0)) / cols as f64;
            let y = GUTTER + row as f64 * (row_height + GUTTER);
            for col in 0..cols {
                let x = GUTTER + col as f64 * (col_width + GUTTER);
                cells.push(Rect::new(x, y, x + col_width, y + row_height));
            }
        }
        cells
    }

    /// Cell rectangles on the logical canvas.
    pub fn cells(&self) -> Vec<Rect> {
        self.cells_in(CANVAS_SIZE)
    }
}

/// Unpremultiplied RGBA pixels of a panel background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub width: u32,
    pub height: u32,
    #[serde(with = "base64_bytes")]
    pub rgba: Vec<u8>,
}

impl BackgroundImage {
    /// Wrap a pixel buffer, checking its length.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, PanelError> {
        let image = Self { width, height, rgba };
        image.validate()?;
        Ok(image)
    }

    /// Check that the buffer holds exactly `width * height` RGBA pixels.
    pub fn validate(&self) -> Result<(), PanelError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() == expected {
            Ok(())
        } else {
            Err(PanelError::BackgroundSize {
                width: self.width,
                height: self.height,
                expected,
                actual: self.rgba.len(),
            })
        }
    }
}

mod base64_bytes {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// One drawable page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub background_image: Option<BackgroundImage>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub shape_layers: LayerStack<ShapeContent>,
    #[serde(default)]
    pub text_layers: LayerStack<TextContent>,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Panel {
    /// Create an empty panel with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            background_image: None,
            layout: Layout::default(),
            shape_layers: LayerStack::default(),
            text_layers: LayerStack::default(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, PanelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, validating the background buffer.
    pub fn from_json(json: &str) -> Result<Self, PanelError> {
        let panel: Panel = serde_json::from_str(json)?;
        if let Some(bg) = &panel.background_image {
            bg.validate()?;
        }
        Ok(panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Layer, TextLayer};
    use crate::shapes::{SerializableColor, ShapeKind};
    use kurbo::Point;

    #[test]
    fn test_single_cell_layout() {
        let cells = Layout::default().cells();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0], Rect::new(12.0, 12.0, 1188.0, 788.0));
    }

    #[test]
    fn test_mixed_columns_layout() {
        let layout = Layout::new(2, vec![1, 3]);
        let cells = layout.cells();
        assert_eq!(cells.len(), 4);
        let row_height = (800.0 - 12.0 * 3.0) / 2.0;
        assert!((cells[0].height() - row_height).abs() < 1e-9);
        let col_width = (1200.0 - 12.0 * 4.0) / 3.0;
        assert!((cells[1].width() - col_width).abs() < 1e-9);
        assert!((cells[3].x1 - 1188.0).abs() < 1e-9);
        assert!((cells[3].y1 - 788.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_row_entry() {
        let layout = Layout::new(2, vec![2]);
        assert_eq!(layout.cells().len(), 3);
        assert!(Layout::new(0, vec![]).cells().is_empty());
    }

    #[test]
    fn test_background_size_checked() {
        assert!(BackgroundImage::new(2, 2, vec![0; 16]).is_ok());
        let err = BackgroundImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, PanelError::BackgroundSize { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn test_panel_json_round_trip() {
        let mut panel = Panel::new("Page 1");
        panel.background_image = Some(BackgroundImage::new(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap());
        panel.shape_layers.add(Layer::new(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            ShapeContent::new(ShapeKind::Star, SerializableColor::black(), 2.0, None),
        ));
        panel.text_layers.add(TextLayer::measured(
            TextContent::new("Hi", "Arial", 24.0, SerializableColor::black()),
            Point::new(5.0, 5.0),
            &crate::layers::EstimatedMetrics,
            1.0,
        ));

        let json = panel.to_json().unwrap();
        assert!(json.contains("\"backgroundImage\""));
        assert!(json.contains("\"AQIDBAUGBwg=\""));
        let back = Panel::from_json(&json).unwrap();
        assert_eq!(back, panel);
    }

    #[test]
    fn test_from_json_rejects_bad_background() {
        let json = r#"{"id":"p","name":"n","backgroundImage":{"width":2,"height":2,"rgba":"AAAA"}}"#;
        assert!(matches!(Panel::from_json(json), Err(PanelError::BackgroundSize { .. })));
    }

    #[test]
    fn test_minimal_json_defaults() {
        let panel = Panel::from_json(r#"{"id":"p","name":"n"}"#).unwrap();
        assert_eq!(panel.layout, Layout::default());
        assert!(panel.shape_layers.is_empty());
    }
}
