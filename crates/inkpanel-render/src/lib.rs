//! InkPanel Render Library
//!
//! Everything that touches pixels: the raster surface, flood fill, pen and
//! eraser compositing, the grid overlay, text rasterization, raster-region
//! transforms and the frame compositor. Rendering is done on the CPU with
//! tiny-skia.

pub mod compositor;
pub mod fill;
pub mod grid;
pub mod painter;
pub mod path;
pub mod raster;
mod renderer;
pub mod region;
pub mod text;
pub mod text_editor;

pub use compositor::{AffordanceTracker, Affordances, Compositor};
pub use fill::flood_fill;
pub use grid::draw_grid;
pub use raster::{Raster, StrokeStyle};
pub use region::{ContentRegion, FloatingRegion, RegionTracker};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, ShapePreview, decode_image};
pub use text::FontBook;
pub use text_editor::{EntryPlacement, TextEditResult, TextEntry};
