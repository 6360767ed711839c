//! Ordered layer collection: hit testing, add, delete and duplicate.

use super::{Layer, LayerContent, LayerId};
use crate::geometry::clamp_origin;
use crate::history::HistoryAction;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Offset applied in both axes to a duplicated layer.
pub const DUPLICATE_OFFSET: f64 = 30.0;

/// Result of a mutation: the full new array plus its history tag.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerChange<C> {
    pub layers: Vec<Layer<C>>,
    pub history: HistoryAction<Vec<Layer<C>>>,
}

impl<C> LayerChange<C> {
    pub fn skip_history(&self) -> bool {
        self.history.is_skip()
    }
}

/// Layers in paint order (back to front).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerStack<C> {
    layers: Vec<Layer<C>>,
}

impl<C> Default for LayerStack<C> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<C: LayerContent> LayerStack<C> {
    pub fn new(layers: Vec<Layer<C>>) -> Self {
        Self { layers }
    }

    pub fn as_slice(&self) -> &[Layer<C>] {
        &self.layers
    }

    pub fn to_vec(&self) -> Vec<Layer<C>> {
        self.layers.clone()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer<C>> {
        self.layers.iter()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer<C>> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn contains_id(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    /// Replace the whole array, e.g. after an undo.
    pub fn replace_all(&mut self, layers: Vec<Layer<C>>) {
        self.layers = layers;
    }

    /// Topmost layer whose unrotated box contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<LayerId> {
        self.layers.iter().rev().find(|l| l.contains(point)).map(|l| l.id)
    }

    fn change(&self, history: HistoryAction<Vec<Layer<C>>>) -> LayerChange<C> {
        LayerChange {
            layers: self.layers.clone(),
            history,
        }
    }

    /// Append a layer on top.
    pub fn add(&mut self, layer: Layer<C>) -> LayerChange<C> {
        let previous = self.layers.clone();
        log::debug!("Adding {} layer {}", C::KIND, layer.id);
        self.layers.push(layer);
        self.change(HistoryAction::Record(previous))
    }

    /// Overwrite an existing layer in place, tagging the result with `history`.
    ///
    /// Returns `None` when the id no longer exists.
    pub fn replace(&mut self, layer: Layer<C>, history: HistoryAction<Vec<Layer<C>>>) -> Option<LayerChange<C>> {
        let slot = self.layers.iter_mut().find(|l| l.id == layer.id)?;
        *slot = layer;
        Some(self.change(history))
    }

    /// Apply `edit` to a layer as its own undo step.
    pub fn update(&mut self, id: LayerId, edit: impl FnOnce(&mut Layer<C>)) -> Option<LayerChange<C>> {
        let previous = self.layers.clone();
        let slot = self.layers.iter_mut().find(|l| l.id == id)?;
        edit(slot);
        Some(self.change(HistoryAction::Record(previous)))
    }

    /// Remove a layer by identity. Returns `None` if it is already gone.
    pub fn remove(&mut self, id: LayerId) -> Option<LayerChange<C>> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        let previous = self.layers.clone();
        self.layers.remove(index);
        log::debug!("Removed {} layer {}", C::KIND, id);
        Some(self.change(HistoryAction::Record(previous)))
    }

    /// Clone a layer with a new identity, offset and clamped inside `bounds`.
    ///
    /// Returns the new id together with the change, or `None` for a stale id.
    pub fn duplicate(&mut self, id: LayerId, bounds: Size) -> Option<(LayerId, LayerChange<C>)> {
        let source = self.get(id)?;
        let mut copy = source.with_new_id();
        let origin = clamp_origin(
            Point::new(copy.x + DUPLICATE_OFFSET, copy.y + DUPLICATE_OFFSET),
            copy.size(),
            bounds,
        );
        copy.x = origin.x;
        copy.y = origin.y;
        let new_id = copy.id;
        Some((new_id, self.add(copy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::ShapeContent;
    use crate::shapes::{SerializableColor, ShapeKind};
    use kurbo::Rect;

    const CANVAS: Size = Size::new(1200.0, 800.0);

    fn layer(x: f64, y: f64, w: f64, h: f64) -> Layer<ShapeContent> {
        Layer::new(
            Rect::new(x, y, x + w, y + h),
            ShapeContent::new(ShapeKind::Rectangle, SerializableColor::black(), 3.0, None),
        )
    }

    #[test]
    fn test_topmost_layer_wins() {
        let a = layer(0.0, 0.0, 100.0, 100.0);
        let b = layer(50.0, 50.0, 100.0, 100.0);
        let b_id = b.id;
        let stack = LayerStack::new(vec![a, b]);
        assert_eq!(stack.hit_test(Point::new(75.0, 75.0)), Some(b_id));
        assert_eq!(stack.hit_test(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_duplicate_clamped_to_canvas() {
        let source = layer(1150.0, 100.0, 50.0, 50.0);
        let id = source.id;
        let mut stack = LayerStack::new(vec![source]);
        let (new_id, change) = stack.duplicate(id, CANVAS).unwrap();
        let copy = stack.get(new_id).unwrap();
        assert_ne!(new_id, id);
        assert!(copy.x <= 1150.0);
        assert_eq!(copy.y, 130.0);
        assert_eq!(change.layers.len(), 2);
        assert_eq!(change.history.into_previous().map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let l = layer(0.0, 0.0, 10.0, 10.0);
        let id = l.id;
        let mut stack = LayerStack::new(vec![l]);
        assert!(stack.remove(id).is_some());
        assert!(stack.remove(id).is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_replace_stale_id() {
        let mut stack: LayerStack<ShapeContent> = LayerStack::default();
        assert!(stack.replace(layer(0.0, 0.0, 1.0, 1.0), HistoryAction::Skip).is_none());
    }

    #[test]
    fn test_update_records_previous() {
        let l = layer(0.0, 0.0, 10.0, 10.0);
        let id = l.id;
        let mut stack = LayerStack::new(vec![l]);
        let change = stack.update(id, |l| l.x = 40.0).unwrap();
        assert_eq!(change.layers[0].x, 40.0);
        assert_eq!(change.history.into_previous().unwrap()[0].x, 0.0);
    }
}
