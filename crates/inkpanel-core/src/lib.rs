//! InkPanel Core Library
//!
//! Platform-agnostic data structures and math for the comic panel canvas:
//! geometry, the shape path tracer, transformable layers, gestures, history
//! tags, tool settings, input state and the display-to-canvas mapping.

pub mod geometry;
pub mod history;
pub mod input;
pub mod layers;
pub mod panel;
pub mod selection;
pub mod shapes;
pub mod tools;
pub mod viewport;

pub use history::{Checkpoint, HistoryAction, UndoStack};
pub use input::{InputState, Key, KeyEvent, Modifiers, PointerEvent};
pub use layers::{
    CanvasFont, EstimatedMetrics, Layer, LayerChange, LayerEditor, LayerId, LayerStack, ShapeContent, ShapeLayer,
    TextContent, TextLayer, TextMeasure,
};
pub use panel::{BackgroundImage, CANVAS_HEIGHT, CANVAS_SIZE, CANVAS_WIDTH, GUTTER, Layout, Panel, PanelError};
pub use selection::{Gesture, HandleKind, ResizeHandle};
pub use shapes::{SerializableColor, ShapeKind, trace_path};
pub use tools::{PenWidth, ToolKind, ToolSettings, ToolState};
pub use viewport::Viewport;
