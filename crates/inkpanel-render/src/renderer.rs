//! Renderer trait abstraction and per-frame render context.

use crate::raster::Raster;
use crate::region::FloatingRegion;
use inkpanel_core::layers::{LayerId, LayerStack, ShapeContent, TextContent};
use inkpanel_core::panel::Layout;
use inkpanel_core::shapes::{SerializableColor, ShapeKind};
use kurbo::Rect;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Pixel buffer is {actual} bytes, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Image encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Decode a PNG (or any format the `image` crate was built with) into a raster.
pub fn decode_image(bytes: &[u8]) -> RenderResult<Raster> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Raster::from_rgba(rgba.width(), rgba.height(), rgba.as_raw())
}

/// Shape being dragged out with a shape tool, drawn as a preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePreview {
    pub kind: ShapeKind,
    pub rect: Rect,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

/// Everything needed to draw one frame.
pub struct RenderContext<'a> {
    /// Background pixels; `None` leaves the frame white.
    pub background: Option<&'a Raster>,
    pub layout: &'a Layout,
    pub shape_layers: &'a LayerStack<ShapeContent>,
    pub text_layers: &'a LayerStack<TextContent>,
    /// Display scale used when text boxes were measured.
    pub text_scale: f64,
    /// Active shape layer, outlined with handles.
    pub active_shape: Option<LayerId>,
    /// Active text layer, outlined with handles.
    pub active_text: Option<LayerId>,
    /// Marquee rectangle being dragged with the select tool.
    pub marquee: Option<Rect>,
    /// Raster region lifted off the background.
    pub region: Option<&'a FloatingRegion>,
    pub shape_preview: Option<ShapePreview>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(
        layout: &'a Layout,
        shape_layers: &'a LayerStack<ShapeContent>,
        text_layers: &'a LayerStack<TextContent>,
    ) -> Self {
        Self {
            background: None,
            layout,
            shape_layers,
            text_layers,
            text_scale: 1.0,
            active_shape: None,
            active_text: None,
            marquee: None,
            region: None,
            shape_preview: None,
        }
    }

    pub fn with_background(mut self, background: Option<&'a Raster>) -> Self {
        self.background = background;
        self
    }

    pub fn with_text_scale(mut self, scale: f64) -> Self {
        self.text_scale = scale;
        self
    }

    /// Set the active shape and text layers (at most one is expected).
    pub fn with_active(mut self, shape: Option<LayerId>, text: Option<LayerId>) -> Self {
        self.active_shape = shape;
        self.active_text = text;
        self
    }

    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    /// Set the floating region; its base image replaces the background.
    pub fn with_region(mut self, region: Option<&'a FloatingRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn with_shape_preview(mut self, preview: Option<ShapePreview>) -> Self {
        self.shape_preview = preview;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Draw the visible frame: background, grid, layers and overlays.
    fn render_frame(&mut self, ctx: &RenderContext) -> &Raster;

    /// Draw background and grid only, on a surface the frame never touches.
    fn render_background(&mut self, ctx: &RenderContext) -> &Raster;
}
