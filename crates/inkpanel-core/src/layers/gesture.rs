//! Drag, resize and rotate interaction for the active layer of one stack.

use super::{Layer, LayerChange, LayerContent, LayerId, LayerStack};
use crate::geometry::{accumulated_rotation, clamp_origin, resize_rect, rotate_vec, scale_factors};
use crate::history::Checkpoint;
use crate::selection::{Gesture, HandleKind, ResizeHandle, hit_test_handles};
use kurbo::{Point, Size};

/// What a press on the active layer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Rotate,
    Resize(ResizeHandle),
    Body,
}

/// Selection and gesture state for one layer stack.
#[derive(Debug, Clone)]
pub struct LayerEditor<C> {
    active: Option<LayerId>,
    gesture: Gesture,
    /// The active layer as it was when the gesture started.
    start: Option<Layer<C>>,
    checkpoint: Checkpoint<Vec<Layer<C>>>,
    bounds: Size,
}

impl<C: LayerContent> LayerEditor<C> {
    /// Create an editor that keeps dragged layers inside `bounds`.
    pub fn new(bounds: Size) -> Self {
        Self {
            active: None,
            gesture: Gesture::Idle,
            start: None,
            checkpoint: Checkpoint::default(),
            bounds,
        }
    }

    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_busy(&self) -> bool {
        self.gesture.is_active()
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Make `id` the active layer without starting a gesture.
    pub fn select(&mut self, id: LayerId) {
        self.release();
        self.active = Some(id);
    }

    /// Clear the active layer and any gesture.
    pub fn clear(&mut self) {
        self.release();
        self.active = None;
    }

    /// Drop the active pointer if its layer no longer exists.
    pub fn forget_stale(&mut self, stack: &LayerStack<C>) {
        let Some(id) = self.active else {
            return;
        };
        if !stack.contains_id(id) {
            log::debug!("Active {} layer {} no longer exists", C::KIND, id);
            self.clear();
        }
    }

    /// Try to grab the active layer at `point`: rotation handle, then resize
    /// handles, then the layer body. Starts the matching gesture on success.
    pub fn press(&mut self, stack: &LayerStack<C>, point: Point) -> Option<PressTarget> {
        let layer = self.active.and_then(|id| stack.get(id))?.clone();

        let target = match hit_test_handles(layer.rect(), layer.rotation, point) {
            Some(HandleKind::Rotate) => PressTarget::Rotate,
            Some(HandleKind::Resize(handle)) => PressTarget::Resize(handle),
            None if layer.contains(point) => PressTarget::Body,
            None => return None,
        };

        match target {
            PressTarget::Rotate => self.begin_rotate(stack, &layer, point),
            PressTarget::Resize(handle) => self.begin_resize(stack, &layer, handle, point),
            PressTarget::Body => self.begin_drag_layer(stack, &layer, point),
        }
        Some(target)
    }

    /// Select `id` and start dragging it from `point`.
    pub fn begin_drag(&mut self, stack: &LayerStack<C>, id: LayerId, point: Point) -> bool {
        match stack.get(id) {
            Some(layer) => {
                let layer = layer.clone();
                self.begin_drag_layer(stack, &layer, point);
                true
            }
            None => false,
        }
    }

    fn begin(&mut self, stack: &LayerStack<C>, layer: &Layer<C>, gesture: Gesture) {
        self.active = Some(layer.id);
        self.gesture = gesture;
        self.start = Some(layer.clone());
        self.checkpoint.arm(stack.to_vec());
    }

    fn begin_drag_layer(&mut self, stack: &LayerStack<C>, layer: &Layer<C>, point: Point) {
        let offset = point - Point::new(layer.x, layer.y);
        self.begin(stack, layer, Gesture::Dragging { offset });
    }

    fn begin_resize(&mut self, stack: &LayerStack<C>, layer: &Layer<C>, handle: ResizeHandle, point: Point) {
        let gesture = Gesture::Resizing {
            handle,
            start_rect: layer.rect(),
            start_pos: point,
        };
        self.begin(stack, layer, gesture);
    }

    fn begin_rotate(&mut self, stack: &LayerStack<C>, layer: &Layer<C>, point: Point) {
        let gesture = Gesture::rotating(layer.center(), point, layer.rotation);
        self.begin(stack, layer, gesture);
    }

    /// Continue the current gesture with the pointer at `point`.
    ///
    /// The first effective update of a gesture carries `Record(previous)`,
    /// later ones `Skip`. Returns `None` when idle, when the layer vanished,
    /// or when nothing changed.
    pub fn update(&mut self, stack: &mut LayerStack<C>, point: Point) -> Option<LayerChange<C>> {
        let start = self.start.as_ref()?;
        let current = stack.get(start.id)?;
        let mut next = current.clone();

        match self.gesture {
            Gesture::Idle => return None,
            Gesture::Dragging { offset } => {
                let origin = clamp_origin(point - offset, next.size(), self.bounds);
                next.x = origin.x;
                next.y = origin.y;
            }
            Gesture::Resizing {
                handle,
                start_rect,
                start_pos,
            } => {
                let delta = rotate_vec(point - start_pos, -start.rotation);
                let rect = resize_rect(handle, start_rect, delta);
                let (sx, sy) = scale_factors(start_rect, rect);
                next.set_rect(rect);
                next.content = start.content.scaled(sx, sy);
            }
            Gesture::Rotating {
                center,
                start_angle,
                base_angle,
            } => {
                next.rotation = accumulated_rotation(center, start_angle, base_angle, point);
            }
        }

        if &next == current {
            return None;
        }
        let history = self.checkpoint.take();
        stack.replace(next, history)
    }

    /// End the gesture. Returns true if one was in progress.
    pub fn release(&mut self) -> bool {
        let was_active = self.gesture.is_active();
        self.gesture = Gesture::Idle;
        self.start = None;
        self.checkpoint.disarm();
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryAction;
    use crate::layers::{EstimatedMetrics, ShapeContent, TextContent, TextLayer};
    use crate::selection::rotate_handle_position;
    use crate::shapes::{SerializableColor, ShapeKind};
    use kurbo::Rect;
    use std::f64::consts::FRAC_PI_4;

    const CANVAS: Size = Size::new(1200.0, 800.0);

    fn shape_stack(rect: Rect) -> (LayerStack<ShapeContent>, LayerId) {
        let layer = Layer::new(
            rect,
            ShapeContent::new(ShapeKind::Rectangle, SerializableColor::black(), 3.0, None),
        );
        let id = layer.id;
        (LayerStack::new(vec![layer]), id)
    }

    #[test]
    fn test_drag_records_once_and_clamps() {
        let (mut stack, id) = shape_stack(Rect::new(100.0, 100.0, 200.0, 150.0));
        let mut editor = LayerEditor::new(CANVAS);
        assert!(editor.begin_drag(&stack, id, Point::new(110.0, 110.0)));

        let first = editor.update(&mut stack, Point::new(120.0, 130.0)).unwrap();
        assert!(matches!(first.history, HistoryAction::Record(ref prev) if prev[0].x == 100.0));
        let second = editor.update(&mut stack, Point::new(5000.0, -50.0)).unwrap();
        assert!(second.skip_history());

        let layer = stack.get(id).unwrap();
        assert_eq!(layer.x, 1100.0);
        assert_eq!(layer.y, 0.0);
        assert!(editor.release());
        assert_eq!(editor.active(), Some(id));
    }

    #[test]
    fn test_press_without_move_records_nothing() {
        let (mut stack, id) = shape_stack(Rect::new(100.0, 100.0, 200.0, 150.0));
        let mut editor = LayerEditor::new(CANVAS);
        editor.select(id);
        assert_eq!(editor.press(&stack, Point::new(150.0, 120.0)), Some(PressTarget::Body));
        assert!(editor.update(&mut stack, Point::new(150.0, 120.0)).is_none());
        editor.release();
        assert!(!editor.is_busy());
    }

    #[test]
    fn test_resize_bottom_right() {
        let (mut stack, id) = shape_stack(Rect::new(100.0, 100.0, 200.0, 150.0));
        let mut editor = LayerEditor::new(CANVAS);
        editor.select(id);
        let target = editor.press(&stack, Point::new(200.0, 150.0));
        assert_eq!(target, Some(PressTarget::Resize(ResizeHandle::BottomRight)));
        editor.update(&mut stack, Point::new(340.0, 230.0));
        editor.release();

        let layer = stack.get(id).unwrap();
        assert!((layer.width - 240.0).abs() < 1e-9);
        assert!((layer.height - 130.0).abs() < 1e-9);
        assert_eq!((layer.x, layer.y), (100.0, 100.0));
    }

    #[test]
    fn test_rotate_then_back() {
        let (mut stack, id) = shape_stack(Rect::new(100.0, 100.0, 200.0, 200.0));
        let mut editor = LayerEditor::new(CANVAS);
        editor.select(id);
        let before = stack.get(id).unwrap().clone();
        let center = before.center();

        let handle = rotate_handle_position(before.rect(), 0.0);
        assert_eq!(editor.press(&stack, handle), Some(PressTarget::Rotate));
        let turned = crate::geometry::rotate_about(handle, center, FRAC_PI_4);
        editor.update(&mut stack, turned);
        editor.release();
        assert!((stack.get(id).unwrap().rotation - FRAC_PI_4).abs() < 1e-9);

        let handle = rotate_handle_position(before.rect(), FRAC_PI_4);
        assert_eq!(editor.press(&stack, handle), Some(PressTarget::Rotate));
        let back = crate::geometry::rotate_about(handle, center, -FRAC_PI_4);
        editor.update(&mut stack, back);
        editor.release();

        let after = stack.get(id).unwrap();
        assert!(after.rotation.abs() < 1e-9);
        assert_eq!(after.rect(), before.rect());
    }

    #[test]
    fn test_text_resize_scales_font() {
        let content = TextContent::new("Hello", "Arial", 20.0, SerializableColor::black());
        let layer = TextLayer::measured(content, Point::new(100.0, 100.0), &EstimatedMetrics, 1.0);
        let id = layer.id;
        let br = Point::new(layer.x + layer.width, layer.y + layer.height);
        let (w, h) = (layer.width, layer.height);
        let mut stack = LayerStack::new(vec![layer]);
        let mut editor = LayerEditor::new(CANVAS);
        editor.select(id);
        editor.press(&stack, br);
        editor.update(&mut stack, Point::new(br.x + w, br.y + h));
        let resized = stack.get(id).unwrap();
        assert!((resized.content.font_size - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_press_misses_inactive() {
        let (stack, _) = shape_stack(Rect::new(100.0, 100.0, 200.0, 150.0));
        let mut editor = LayerEditor::new(CANVAS);
        assert_eq!(editor.press(&stack, Point::new(150.0, 120.0)), None);
    }

    #[test]
    fn test_forget_stale_active() {
        let (mut stack, id) = shape_stack(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut editor = LayerEditor::new(CANVAS);
        editor.select(id);
        stack.remove(id);
        editor.forget_stale(&stack);
        assert_eq!(editor.active(), None);
    }
}
