//! CPU frame compositor.
//!
//! Two surfaces are kept: the visible frame (background, grid, layers and
//! selection chrome) and the background snapshot (background and grid only).
//! The snapshot is drawn from scratch and never reads the frame, so it can
//! never pick up layer pixels.

use crate::grid::draw_grid;
use crate::painter::{paint_marquee, paint_selection, paint_shape_layer, paint_shape_preview, paint_text_layer};
use crate::raster::Raster;
use crate::renderer::{RenderContext, RenderResult, Renderer};
use crate::text::FontBook;
use inkpanel_core::geometry::rotated_corners;
use inkpanel_core::panel::{CANVAS_HEIGHT, CANVAS_WIDTH};
use inkpanel_core::shapes::SerializableColor;
use inkpanel_core::viewport::Viewport;
use kurbo::{Affine, Point, Rect, Vec2};

/// Affordance controls are re-emitted only when they move further than this.
pub const AFFORDANCE_EPSILON: f64 = 0.1;
/// Horizontal gap between the selection's top-right corner and the controls.
pub const AFFORDANCE_GAP: f64 = 10.0;
/// Vertical distance between the delete and duplicate controls.
pub const AFFORDANCE_SPACING: f64 = 28.0;

/// Screen-space anchors of the delete and duplicate controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affordances {
    pub delete: Point,
    pub duplicate: Point,
}

impl Affordances {
    /// Controls beside the rotated top-right corner of `rect`.
    pub fn for_box(rect: Rect, rotation: f64, viewport: &Viewport) -> Self {
        let corner = rotated_corners(rect, rotation)[1];
        let delete = viewport.canvas_to_screen(corner) + Vec2::new(AFFORDANCE_GAP, 0.0);
        Self {
            delete,
            duplicate: delete + Vec2::new(0.0, AFFORDANCE_SPACING),
        }
    }

    fn moved_from(&self, other: &Affordances) -> bool {
        (self.delete - other.delete).hypot() > AFFORDANCE_EPSILON
            || (self.duplicate - other.duplicate).hypot() > AFFORDANCE_EPSILON
    }
}

/// Suppresses affordance updates that would not visibly move the controls.
#[derive(Debug, Clone, Default)]
pub struct AffordanceTracker {
    last: Option<Affordances>,
}

impl AffordanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Affordances> {
        self.last
    }

    /// Feed the latest positions. Returns `Some` when they should be re-emitted.
    pub fn update(&mut self, next: Option<Affordances>) -> Option<Option<Affordances>> {
        let changed = match (&self.last, &next) {
            (None, None) => false,
            (Some(last), Some(next)) => next.moved_from(last),
            _ => true,
        };
        if changed {
            self.last = next;
            Some(next)
        } else {
            None
        }
    }
}

/// Draws frames and background snapshots into tiny-skia pixmaps.
#[derive(Debug)]
pub struct Compositor {
    frame: Raster,
    snapshot: Raster,
    fonts: FontBook,
}

impl Compositor {
    /// Compositor for the standard 1200x800 canvas.
    pub fn new(fonts: FontBook) -> RenderResult<Self> {
        Self::with_size(CANVAS_WIDTH, CANVAS_HEIGHT, fonts)
    }

    pub fn with_size(width: u32, height: u32, fonts: FontBook) -> RenderResult<Self> {
        Ok(Self {
            frame: Raster::white(width, height)?,
            snapshot: Raster::white(width, height)?,
            fonts,
        })
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Last rendered frame.
    pub fn frame(&self) -> &Raster {
        &self.frame
    }

    /// Last rendered background snapshot.
    pub fn snapshot(&self) -> &Raster {
        &self.snapshot
    }
}

impl Renderer for Compositor {
    fn render_frame(&mut self, ctx: &RenderContext) -> &Raster {
        let frame = &mut self.frame;
        frame.clear(SerializableColor::white());

        match (ctx.region, ctx.background) {
            (Some(region), _) => region.paint_onto(frame),
            (None, Some(background)) => frame.draw_raster(background, Affine::IDENTITY),
            (None, None) => {}
        }
        draw_grid(frame, ctx.layout);

        for layer in ctx.shape_layers.iter() {
            paint_shape_layer(frame, layer);
        }
        for layer in ctx.text_layers.iter() {
            paint_text_layer(frame, &self.fonts, layer, ctx.text_scale);
        }

        if let Some(preview) = &ctx.shape_preview {
            paint_shape_preview(frame, preview);
        }
        if let Some(marquee) = ctx.marquee {
            paint_marquee(frame, marquee);
        }

        if let Some(layer) = ctx.active_shape.and_then(|id| ctx.shape_layers.get(id)) {
            paint_selection(frame, layer.rect(), layer.rotation);
        }
        if let Some(layer) = ctx.active_text.and_then(|id| ctx.text_layers.get(id)) {
            paint_selection(frame, layer.rect(), layer.rotation);
        }
        if let Some(region) = ctx.region {
            paint_selection(frame, region.content_rect(), region.rotation());
        }

        &self.frame
    }

    fn render_background(&mut self, ctx: &RenderContext) -> &Raster {
        let snapshot = &mut self.snapshot;
        snapshot.clear(SerializableColor::white());
        if let Some(background) = ctx.background {
            snapshot.draw_raster(background, Affine::IDENTITY);
        }
        draw_grid(snapshot, ctx.layout);
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpanel_core::layers::{Layer, LayerStack, ShapeContent, TextContent};
    use inkpanel_core::panel::Layout;
    use inkpanel_core::shapes::ShapeKind;
    use kurbo::Size;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    fn red_square() -> Layer<ShapeContent> {
        let red = SerializableColor::new(255, 0, 0, 255);
        Layer::new(
            Rect::new(100.0, 100.0, 200.0, 200.0),
            ShapeContent::new(ShapeKind::Rectangle, red, 2.0, Some(red)),
        )
    }

    #[test]
    fn test_frame_draws_layers_over_background() {
        let mut compositor = Compositor::new(FontBook::new()).unwrap();
        let layout = Layout::default();
        let shapes = LayerStack::new(vec![red_square()]);
        let texts = LayerStack::<TextContent>::default();
        let mut background = Raster::white(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();
        background.fill_rect(Rect::new(300.0, 300.0, 320.0, 320.0), SerializableColor::black());

        let ctx = RenderContext::new(&layout, &shapes, &texts).with_background(Some(&background));
        let frame = compositor.render_frame(&ctx).clone();
        assert_eq!(frame.pixel(150, 150), Some(RED));
        assert_eq!(frame.pixel(310, 310), Some([0, 0, 0, 255]));
        // Grid border around the single cell.
        assert_eq!(frame.pixel(12, 400), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_snapshot_excludes_layers() {
        let mut compositor = Compositor::new(FontBook::new()).unwrap();
        let layout = Layout::default();
        let shapes = LayerStack::new(vec![red_square()]);
        let texts = LayerStack::<TextContent>::default();
        let ctx = RenderContext::new(&layout, &shapes, &texts);

        compositor.render_frame(&ctx);
        let snapshot = compositor.render_background(&ctx);
        assert_eq!(snapshot.pixel(150, 150), Some(WHITE));
        assert_eq!(snapshot.pixel(12, 400), Some([0, 0, 0, 255]));
        // The frame still has the layer.
        assert_eq!(compositor.frame().pixel(150, 150), Some(RED));
    }

    #[test]
    fn test_transparent_background_shows_white() {
        let mut compositor = Compositor::new(FontBook::new()).unwrap();
        let layout = Layout::new(0, vec![]);
        let shapes = LayerStack::default();
        let texts = LayerStack::default();
        let background = Raster::new(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();
        let ctx = RenderContext::new(&layout, &shapes, &texts).with_background(Some(&background));
        assert_eq!(compositor.render_frame(&ctx).pixel(5, 5), Some(WHITE));
    }

    #[test]
    fn test_affordance_tracker_threshold() {
        let viewport = Viewport::default();
        let rect = Rect::new(100.0, 100.0, 200.0, 150.0);
        let mut tracker = AffordanceTracker::new();

        let first = Affordances::for_box(rect, 0.0, &viewport);
        assert_eq!(first.delete, Point::new(210.0, 100.0));
        assert_eq!(tracker.update(Some(first)), Some(Some(first)));

        let nudged = Affordances::for_box(rect + Vec2::new(0.05, 0.0), 0.0, &viewport);
        assert_eq!(tracker.update(Some(nudged)), None);

        let moved = Affordances::for_box(rect + Vec2::new(0.5, 0.0), 0.0, &viewport);
        assert_eq!(tracker.update(Some(moved)), Some(Some(moved)));

        assert_eq!(tracker.update(None), Some(None));
        assert_eq!(tracker.update(None), None);
    }

    #[test]
    fn test_affordances_follow_display_scale() {
        let viewport = Viewport::new(Point::ZERO, Size::new(600.0, 400.0));
        let a = Affordances::for_box(Rect::new(100.0, 100.0, 200.0, 150.0), 0.0, &viewport);
        assert_eq!(a.delete, Point::new(110.0, 50.0));
        assert_eq!(a.duplicate, Point::new(110.0, 78.0));
    }
}
