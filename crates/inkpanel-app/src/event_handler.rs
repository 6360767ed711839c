//! Canvas interaction engine: routes pointer and key events to the active tool.
//!
//! The engine owns the working background raster and the two layer stacks of
//! one panel. Every handler finishes by recomposing the visible frame, so the
//! frame is never stale when control returns to the caller. Changes leave the
//! engine as [`EngineEvent`]s; the caller decides what to persist and what to
//! record for undo.

use inkpanel_core::geometry::normalize_rect;
use inkpanel_core::input::{InputState, Key, KeyEvent, PointerEvent};
use inkpanel_core::layers::{
    Layer, LayerChange, LayerEditor, LayerId, LayerStack, ShapeContent, ShapeLayer, TextContent, TextLayer,
};
use inkpanel_core::panel::{BackgroundImage, CANVAS_HEIGHT, CANVAS_SIZE, CANVAS_WIDTH, Layout, Panel};
use inkpanel_core::shapes::trace_rect;
use inkpanel_core::tools::{EMOJI_FONT_SIZE, ToolKind, ToolSettings, ToolState};
use inkpanel_core::viewport::Viewport;
use inkpanel_render::painter::paint_balloon;
use inkpanel_render::region::{ContentRegion, MIN_MARQUEE_SIZE};
use inkpanel_render::{
    AffordanceTracker, Affordances, Compositor, EntryPlacement, FloatingRegion, FontBook, Raster, RegionTracker,
    RenderContext, RenderResult, Renderer, ShapePreview, StrokeStyle, TextEditResult, TextEntry, flood_fill,
};
use kurbo::{Affine, Point, Rect};
use std::time::Instant;

/// Something the surrounding application should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Background pixels as they would look with no layers (grid included).
    BackgroundChanged(BackgroundImage),
    ShapeLayersChanged(LayerChange<ShapeContent>),
    TextLayersChanged(LayerChange<TextContent>),
    /// Inline text entry opened or closed.
    TextEditingActive(bool),
    /// Delete/duplicate controls moved (screen space), or disappeared.
    ControlsMoved(Option<Affordances>),
}

/// White canvas with the stored background drawn over it.
fn background_raster(image: Option<&BackgroundImage>) -> RenderResult<Raster> {
    let mut raster = Raster::white(CANVAS_WIDTH, CANVAS_HEIGHT)?;
    if let Some(image) = image {
        match Raster::from_background(image) {
            Ok(pixels) => raster.draw_raster(&pixels, Affine::IDENTITY),
            Err(e) => log::warn!("Ignoring unusable background: {e}"),
        }
    }
    Ok(raster)
}

/// Interaction engine for one panel.
pub struct CanvasEngine {
    settings: ToolSettings,
    viewport: Viewport,
    layout: Layout,
    background: Raster,
    shapes: LayerStack<ShapeContent>,
    texts: LayerStack<TextContent>,
    shape_editor: LayerEditor<ShapeContent>,
    text_editor: LayerEditor<TextContent>,
    input: InputState,
    /// Press-drag-release state of pen, eraser, shape and marquee drags.
    drag: ToolState,
    region: Option<FloatingRegion>,
    tracker: RegionTracker,
    entry: Option<TextEntry>,
    compositor: Compositor,
    controls: AffordanceTracker,
    events: Vec<EngineEvent>,
    /// Pixels were stroked since the press.
    ink_dirty: bool,
}

impl CanvasEngine {
    /// Create an engine showing `panel`.
    pub fn new(panel: &Panel, fonts: FontBook, viewport: Viewport) -> RenderResult<Self> {
        let mut engine = Self {
            settings: ToolSettings::default(),
            viewport,
            layout: panel.layout.clone(),
            background: background_raster(panel.background_image.as_ref())?,
            shapes: panel.shape_layers.clone(),
            texts: panel.text_layers.clone(),
            shape_editor: LayerEditor::new(CANVAS_SIZE),
            text_editor: LayerEditor::new(CANVAS_SIZE),
            input: InputState::new(),
            drag: ToolState::Idle,
            region: None,
            tracker: RegionTracker::new(),
            entry: None,
            compositor: Compositor::new(fonts)?,
            controls: AffordanceTracker::new(),
            events: Vec::new(),
            ink_dirty: false,
        };
        engine.recompose();
        Ok(engine)
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn shape_layers(&self) -> &LayerStack<ShapeContent> {
        &self.shapes
    }

    pub fn text_layers(&self) -> &LayerStack<TextContent> {
        &self.texts
    }

    pub fn active_shape(&self) -> Option<LayerId> {
        self.shape_editor.active()
    }

    pub fn active_text(&self) -> Option<LayerId> {
        self.text_editor.active()
    }

    pub fn region(&self) -> Option<&FloatingRegion> {
        self.region.as_ref()
    }

    pub fn content_regions(&self) -> &[ContentRegion] {
        self.tracker.regions()
    }

    pub fn text_entry(&self) -> Option<&TextEntry> {
        self.entry.as_ref()
    }

    pub fn is_text_editing(&self) -> bool {
        self.entry.is_some()
    }

    pub fn fonts(&self) -> &FontBook {
        self.compositor.fonts()
    }

    /// The visible frame as of the last event.
    pub fn frame(&self) -> &Raster {
        self.compositor.frame()
    }

    /// Background and grid without any layer pixels.
    pub fn background_snapshot(&mut self) -> BackgroundImage {
        let ctx = RenderContext::new(&self.layout, &self.shapes, &self.texts).with_background(Some(&self.background));
        self.compositor.render_background(&ctx).to_background()
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EngineEvent) {
        log::debug!("Engine event: {}", event_name(&event));
        self.events.push(event);
    }

    fn emit_background(&mut self) {
        let snapshot = self.background_snapshot();
        self.emit(EngineEvent::BackgroundChanged(snapshot));
    }

    // --- Inputs owned by the surrounding application ---

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.recompose();
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.recompose();
    }

    /// Replace the background, e.g. when switching panels. Drops any lifted region.
    pub fn set_background(&mut self, image: Option<&BackgroundImage>) -> RenderResult<()> {
        self.region = None;
        self.tracker.clear();
        self.background = background_raster(image)?;
        self.recompose();
        Ok(())
    }

    /// Replace the shape layers, e.g. after an undo.
    pub fn set_shape_layers(&mut self, layers: Vec<ShapeLayer>) {
        self.shape_editor.release();
        self.shapes.replace_all(layers);
        self.recompose();
    }

    /// Replace the text layers, e.g. after an undo.
    pub fn set_text_layers(&mut self, layers: Vec<TextLayer>) {
        self.text_editor.release();
        self.texts.replace_all(layers);
        self.recompose();
    }

    /// Apply toolbar settings; a tool change goes through [`Self::set_tool`].
    pub fn set_settings(&mut self, settings: ToolSettings) {
        if settings.tool != self.settings.tool {
            self.set_tool(settings.tool);
        }
        self.settings = settings;
        self.recompose();
    }

    /// Switch tools: bake any lifted region, close text entry and drop the selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.drag.end();
        if self.ink_dirty {
            self.finish_stroke();
        }
        self.commit_region();
        if self.entry.is_some() {
            self.cancel_entry();
        }
        self.shape_editor.clear();
        self.text_editor.clear();
        log::info!("Tool: {:?} -> {:?}", self.settings.tool, tool);
        self.settings.tool = tool;
        self.recompose();
    }

    /// End the gesture in progress, bake a lifted region and commit open text,
    /// so the emitted state is complete (e.g. before saving).
    pub fn flush(&mut self) {
        self.on_release();
        self.commit_region();
        self.commit_entry();
        self.recompose();
    }

    // --- Pointer input ---

    /// Handle a pointer event in screen coordinates.
    pub fn pointer(&mut self, event: PointerEvent) {
        self.pointer_at(event, Instant::now());
    }

    /// Handle a pointer event in screen coordinates that happened at `now`.
    pub fn pointer_at(&mut self, event: PointerEvent, now: Instant) {
        let event = event.map_position(|p| self.viewport.screen_to_canvas(p));
        self.input.handle_pointer_event_at(event, now);
        match event {
            PointerEvent::Down { position } => self.on_press(position),
            PointerEvent::Move { position } => self.on_move(position),
            PointerEvent::Up { .. } | PointerEvent::Leave { .. } => self.on_release(),
        }
        self.recompose();
    }

    fn on_press(&mut self, point: Point) {
        let tool = self.settings.tool;
        if self.entry.is_some() {
            self.commit_entry();
            // The click only closed the entry.
            if matches!(tool, ToolKind::Text | ToolKind::Balloon) {
                return;
            }
        }
        match tool {
            ToolKind::Select => self.press_select(point),
            ToolKind::Pen | ToolKind::Eraser | ToolKind::Shapes | ToolKind::ObjectShapes => {
                self.ink_dirty = false;
                self.drag.begin(point);
            }
            ToolKind::Fill => self.fill_at(point),
            ToolKind::Text => self.press_text(point),
            ToolKind::Balloon => self.place_balloon(point),
            ToolKind::Emoji => self.place_emoji(point),
        }
    }

    /// Lifted region, then the active layer's handles and body, then the
    /// topmost layer (text above shapes), then a new marquee.
    fn press_select(&mut self, point: Point) {
        if let Some(region) = self.region.as_mut() {
            if region.press(point).is_some() {
                return;
            }
            self.commit_region();
        }

        if self.input.is_double_click() {
            if let Some(id) = self.text_editor.active() {
                if self.texts.get(id).is_some_and(|layer| layer.contains(point)) {
                    self.reopen_text(id);
                    return;
                }
            }
        }

        if self.text_editor.press(&self.texts, point).is_some() {
            self.shape_editor.clear();
            return;
        }
        if self.shape_editor.press(&self.shapes, point).is_some() {
            self.text_editor.clear();
            return;
        }

        if let Some(id) = self.texts.hit_test(point) {
            self.shape_editor.clear();
            self.text_editor.begin_drag(&self.texts, id, point);
            return;
        }
        if let Some(id) = self.shapes.hit_test(point) {
            self.text_editor.clear();
            self.shape_editor.begin_drag(&self.shapes, id, point);
            return;
        }

        self.shape_editor.clear();
        self.text_editor.clear();
        self.drag.begin(point);
    }

    fn on_move(&mut self, point: Point) {
        match self.settings.tool {
            ToolKind::Select => {
                if self.region.as_mut().is_some_and(|region| region.update(point)) {
                    return;
                }
                if let Some(change) = self.shape_editor.update(&mut self.shapes, point) {
                    self.emit(EngineEvent::ShapeLayersChanged(change));
                    return;
                }
                if let Some(change) = self.text_editor.update(&mut self.texts, point) {
                    self.emit(EngineEvent::TextLayersChanged(change));
                    return;
                }
                self.drag.update(point);
            }
            tool if tool.strokes() => {
                if let Some((from, to)) = self.drag.update(point) {
                    let width = self.settings.stroke_width();
                    if tool == ToolKind::Eraser {
                        self.background.erase_segment(from, to, width);
                    } else {
                        self.background.pen_segment(from, to, self.settings.color.opaque(), width);
                    }
                    self.ink_dirty = true;
                }
            }
            tool if tool.previews_shape() => {
                self.drag.update(point);
            }
            _ => {}
        }
    }

    /// Pointer up and pointer leave both end whatever is in progress.
    fn on_release(&mut self) {
        self.shape_editor.release();
        self.text_editor.release();
        if let Some(region) = self.region.as_mut() {
            region.release();
        }

        let Some((start, end)) = self.drag.end() else {
            return;
        };
        match self.settings.tool {
            ToolKind::Select => self.finish_marquee(start, end),
            ToolKind::Pen | ToolKind::Eraser => self.finish_stroke(),
            ToolKind::Shapes => self.stamp_shape(normalize_rect(start, end)),
            ToolKind::ObjectShapes => self.create_shape_layer(normalize_rect(start, end)),
            _ => {}
        }
    }

    // --- Raster operations ---

    fn finish_stroke(&mut self) {
        if !self.ink_dirty {
            return;
        }
        self.ink_dirty = false;
        if self.settings.tool == ToolKind::Eraser {
            self.tracker.prune(&self.background);
        }
        self.emit_background();
    }

    fn fill_at(&mut self, point: Point) {
        // Match against what the user sees so grid lines bound the fill.
        let reference = {
            let ctx =
                RenderContext::new(&self.layout, &self.shapes, &self.texts).with_background(Some(&self.background));
            self.compositor.render_background(&ctx).clone()
        };
        let written = flood_fill(&mut self.background, &reference, point, self.settings.color);
        if written > 0 {
            self.emit_background();
        }
    }

    /// Stroke a freehand shape into the background and start tracking it.
    fn stamp_shape(&mut self, rect: Rect) {
        if rect.width() < 1.0 && rect.height() < 1.0 {
            return;
        }
        let width = self.settings.stroke_width();
        let style = StrokeStyle::rounded(self.settings.color.opaque(), width);
        self.background
            .stroke_path(&trace_rect(self.settings.shape_kind, rect), &style, Affine::IDENTITY);
        self.tracker.record(&self.background, rect.inflate(width / 2.0, width / 2.0));
        self.emit_background();
    }

    /// A sub-threshold marquee selects the tracked shape under the pointer, if any.
    fn finish_marquee(&mut self, start: Point, end: Point) {
        let rect = normalize_rect(start, end);
        let (target, tracked) = if rect.width() < MIN_MARQUEE_SIZE || rect.height() < MIN_MARQUEE_SIZE {
            match self.tracker.region_at(end) {
                Some(index) => (self.tracker.regions()[index].rect, Some(index)),
                None => return,
            }
        } else {
            (rect, self.tracker.overlapping(rect))
        };
        self.region = FloatingRegion::lift(&self.background, target, tracked);
    }

    /// Bake the lifted region back into the background. A no-op when there is none.
    fn commit_region(&mut self) {
        let Some(region) = self.region.take() else {
            return;
        };
        let dirty = region.is_dirty();
        let tracked = region.tracked();
        let lifted = region.lifted_rect();
        let bounds = region.bounding_box();
        self.background = region.commit();
        if dirty {
            if let Some(index) = tracked {
                self.tracker.retrack(index, &self.background, lifted, bounds);
            }
            self.emit_background();
        }
    }

    // --- Layers ---

    fn create_shape_layer(&mut self, rect: Rect) {
        let content = ShapeContent::new(
            self.settings.shape_kind,
            self.settings.color,
            self.settings.stroke_width(),
            None,
        );
        let layer = Layer::new(rect, content);
        let id = layer.id;
        let change = self.shapes.add(layer);
        self.text_editor.clear();
        self.shape_editor.select(id);
        self.emit(EngineEvent::ShapeLayersChanged(change));
    }

    fn place_emoji(&mut self, point: Point) {
        let content = TextContent::new(
            self.settings.emoji.clone(),
            self.settings.font_family.clone(),
            EMOJI_FONT_SIZE,
            self.settings.color,
        );
        let layer = TextLayer::measured_centered(content, point, self.compositor.fonts(), self.viewport.scale());
        let change = self.texts.add(layer);
        self.emit(EngineEvent::TextLayersChanged(change));
    }

    fn delete_active(&mut self) -> bool {
        if let Some(id) = self.shape_editor.active() {
            self.shape_editor.clear();
            if let Some(change) = self.shapes.remove(id) {
                self.emit(EngineEvent::ShapeLayersChanged(change));
            }
            return true;
        }
        if let Some(id) = self.text_editor.active() {
            self.text_editor.clear();
            if let Some(change) = self.texts.remove(id) {
                self.emit(EngineEvent::TextLayersChanged(change));
            }
            return true;
        }
        false
    }

    fn duplicate_active(&mut self) -> bool {
        if let Some(id) = self.shape_editor.active() {
            if let Some((copy, change)) = self.shapes.duplicate(id, CANVAS_SIZE) {
                self.shape_editor.select(copy);
                self.emit(EngineEvent::ShapeLayersChanged(change));
                return true;
            }
        }
        if let Some(id) = self.text_editor.active() {
            if let Some((copy, change)) = self.texts.duplicate(id, CANVAS_SIZE) {
                self.text_editor.select(copy);
                self.emit(EngineEvent::TextLayersChanged(change));
                return true;
            }
        }
        false
    }

    /// Remove the active layer (Delete/Backspace with the select tool).
    pub fn delete_selected(&mut self) -> bool {
        let deleted = self.delete_active();
        self.recompose();
        deleted
    }

    /// Duplicate the active layer and select the copy.
    pub fn duplicate_selected(&mut self) -> bool {
        let duplicated = self.duplicate_active();
        self.recompose();
        duplicated
    }

    // --- Text entry ---

    fn press_text(&mut self, point: Point) {
        if let Some(id) = self.texts.hit_test(point) {
            self.reopen_text(id);
            return;
        }
        self.shape_editor.clear();
        self.text_editor.clear();
        self.open_entry(TextEntry::at(point));
    }

    fn place_balloon(&mut self, point: Point) {
        paint_balloon(
            &mut self.background,
            point,
            self.settings.color.opaque(),
            self.settings.stroke_width(),
        );
        self.emit_background();
        self.open_entry(TextEntry::centered(point));
    }

    /// Re-open a text layer for editing with the toolbar showing its font.
    fn reopen_text(&mut self, id: LayerId) {
        let Some(layer) = self.texts.get(id) else {
            return;
        };
        let entry = TextEntry::editing(id, layer.rect().origin(), &layer.content.text);
        self.settings.font_family = layer.content.font.clone();
        self.settings.font_size = layer.content.font_size;
        self.settings.color = layer.content.color;
        self.text_editor.select(id);
        self.open_entry(entry);
    }

    fn open_entry(&mut self, entry: TextEntry) {
        self.entry = Some(entry);
        self.emit(EngineEvent::TextEditingActive(true));
    }

    fn cancel_entry(&mut self) {
        if self.entry.take().is_some() {
            self.emit(EngineEvent::TextEditingActive(false));
        }
    }

    /// Turn the open entry into a layer, or update the layer being re-edited.
    ///
    /// Blank text is discarded. The box is measured from the current font
    /// settings and the final text.
    fn commit_entry(&mut self) {
        let Some(entry) = self.entry.take() else {
            return;
        };
        self.emit(EngineEvent::TextEditingActive(false));
        if entry.is_blank() {
            log::debug!("Discarding blank text entry");
            return;
        }

        let scale = self.viewport.scale();
        let fonts = self.compositor.fonts();
        let family = self.settings.font_family.clone();
        let (size, color) = (self.settings.font_size, self.settings.color);
        let change = match entry.editing_layer() {
            Some(id) => self.texts.update(id, |layer| {
                layer.content.font = family;
                layer.content.font_size = size;
                layer.content.color = color;
                layer.set_text(entry.text(), fonts, scale);
            }),
            None => {
                let content = TextContent::new(entry.text(), family, size, color);
                let layer = match entry.placement() {
                    EntryPlacement::Anchor(anchor) => TextLayer::measured(content, anchor, fonts, scale),
                    EntryPlacement::Centered(center) => TextLayer::measured_centered(content, center, fonts, scale),
                };
                log::info!("Created text layer at {:?} with font {}", layer.rect(), layer.content.canvas_font(scale));
                Some(self.texts.add(layer))
            }
        };
        match change {
            Some(change) => self.emit(EngineEvent::TextLayersChanged(change)),
            None => log::debug!("Edited text layer no longer exists"),
        }
    }

    /// Append text to the open entry, as if typed.
    pub fn type_text(&mut self, text: &str) -> bool {
        let Some(entry) = self.entry.as_mut() else {
            return false;
        };
        entry.insert_str(text);
        self.recompose();
        true
    }

    // --- Keyboard ---

    /// Handle a key press. Returns false when the key was not used.
    ///
    /// An open text entry takes keys first, so Delete/Backspace only delete
    /// layers while no text is being typed.
    pub fn key(&mut self, event: KeyEvent) -> bool {
        if let Some(entry) = self.entry.as_mut() {
            let handled = match entry.handle_key(&event) {
                TextEditResult::Handled => true,
                TextEditResult::Commit => {
                    self.commit_entry();
                    true
                }
                TextEditResult::Cancel => {
                    self.cancel_entry();
                    true
                }
                TextEditResult::NotHandled => false,
            };
            if handled {
                self.recompose();
                return true;
            }
        }

        let handled = match event.key {
            Key::Delete | Key::Backspace if self.settings.tool == ToolKind::Select => self.delete_active(),
            Key::Char('d' | 'D') if event.modifiers.command() => self.duplicate_active(),
            Key::Escape => self.escape(),
            _ => false,
        };
        if handled {
            self.recompose();
        }
        handled
    }

    /// Put a lifted region back untouched, or drop the selection.
    fn escape(&mut self) -> bool {
        if let Some(region) = self.region.take() {
            self.background = region.cancel();
            return true;
        }
        let had_selection = self.shape_editor.active().is_some() || self.text_editor.active().is_some();
        self.shape_editor.clear();
        self.text_editor.clear();
        had_selection
    }

    // --- Compositing ---

    fn active_box(&self) -> Option<(Rect, f64)> {
        let shape = self.shape_editor.active().and_then(|id| self.shapes.get(id));
        let text = self.text_editor.active().and_then(|id| self.texts.get(id));
        shape
            .map(|l| (l.rect(), l.rotation))
            .or_else(|| text.map(|l| (l.rect(), l.rotation)))
    }

    /// Redraw the visible frame and re-emit the controls if they moved.
    fn recompose(&mut self) {
        self.shape_editor.forget_stale(&self.shapes);
        self.text_editor.forget_stale(&self.texts);

        let tool = self.settings.tool;
        let drag_rect = self.drag.drag_rect();
        let preview = drag_rect.filter(|_| tool.previews_shape()).map(|rect| ShapePreview {
            kind: self.settings.shape_kind,
            rect,
            color: self.settings.color.opaque(),
            stroke_width: self.settings.stroke_width(),
        });
        let marquee = drag_rect.filter(|_| tool == ToolKind::Select);

        let ctx = RenderContext::new(&self.layout, &self.shapes, &self.texts)
            .with_background(Some(&self.background))
            .with_text_scale(self.viewport.scale())
            .with_active(self.shape_editor.active(), self.text_editor.active())
            .with_marquee(marquee)
            .with_region(self.region.as_ref())
            .with_shape_preview(preview);
        self.compositor.render_frame(&ctx);

        let controls = self
            .active_box()
            .map(|(rect, rotation)| Affordances::for_box(rect, rotation, &self.viewport));
        if let Some(update) = self.controls.update(controls) {
            self.emit(EngineEvent::ControlsMoved(update));
        }
    }
}

fn event_name(event: &EngineEvent) -> &'static str {
    match event {
        EngineEvent::BackgroundChanged(_) => "background changed",
        EngineEvent::ShapeLayersChanged(_) => "shape layers changed",
        EngineEvent::TextLayersChanged(_) => "text layers changed",
        EngineEvent::TextEditingActive(_) => "text editing active",
        EngineEvent::ControlsMoved(_) => "controls moved",
    }
}
