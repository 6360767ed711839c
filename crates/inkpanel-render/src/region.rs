//! Raster-region selection: lift pixels off the background, move, resize and
//! rotate them, then bake them back in.
//!
//! The lifted pixels are never modified. Every frame re-renders them from the
//! original snapshot under the accumulated transform, so repeated rotations do
//! not blur the image or grow its bounding box.

use crate::raster::Raster;
use inkpanel_core::geometry::{
    accumulated_rotation, clamp_origin, point_in_rotated_rect, rect_contains, resize_rect, rotate_vec, rotated_bounds,
};
use inkpanel_core::layers::PressTarget;
use inkpanel_core::selection::{Gesture, HandleKind, hit_test_handles};
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Marquees smaller than this in either axis are treated as clicks.
pub const MIN_MARQUEE_SIZE: f64 = 3.0;
/// A tracked region never reports fewer content pixels than this.
pub const MIN_CONTENT_PIXELS: usize = 12;
/// Channel value at or above which a pixel counts as near-white.
pub const NEAR_WHITE: u8 = 240;
/// Alpha below which a pixel counts as transparent.
pub const CONTENT_ALPHA: u8 = 10;

/// Whether a pixel carries ink: not transparent and not near-white.
pub fn is_content_pixel(px: [u8; 4]) -> bool {
    px[3] >= CONTENT_ALPHA && !px[..3].iter().all(|&c| c >= NEAR_WHITE)
}

/// Count ink pixels of `raster` inside `rect`.
pub fn count_content_pixels(raster: &Raster, rect: Rect) -> usize {
    raster.pixels_in(rect).filter(|&px| is_content_pixel(px)).count()
}

/// Bounding box and ink count of a shape drawn into the background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRegion {
    pub rect: Rect,
    pub content_pixels: usize,
}

/// Freehand shapes baked into the background, tracked so a click can select them.
#[derive(Debug, Clone, Default)]
pub struct RegionTracker {
    regions: Vec<ContentRegion>,
}

impl RegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &[ContentRegion] {
        &self.regions
    }

    pub fn get(&self, index: usize) -> Option<&ContentRegion> {
        self.regions.get(index)
    }

    /// Start tracking `rect`; returns the new region index.
    pub fn record(&mut self, raster: &Raster, rect: Rect) -> usize {
        let content_pixels = count_content_pixels(raster, rect).max(MIN_CONTENT_PIXELS);
        self.regions.push(ContentRegion { rect, content_pixels });
        self.regions.len() - 1
    }

    /// Topmost region whose box contains `point`.
    pub fn region_at(&self, point: Point) -> Option<usize> {
        self.regions.iter().rposition(|r| rect_contains(r.rect, point))
    }

    /// Topmost region overlapping `rect`.
    pub fn overlapping(&self, rect: Rect) -> Option<usize> {
        self.regions.iter().rposition(|r| r.rect.intersect(rect).area() > 0.0)
    }

    /// Follow a region whose pixels were lifted from `lifted` and dropped at `moved`.
    ///
    /// When the marquee only covered part of the region, the part left behind
    /// stays selectable: the region grows to span both places.
    pub fn retrack(&mut self, index: usize, raster: &Raster, lifted: Rect, moved: Rect) {
        let surface = raster.bounds();
        if let Some(region) = self.regions.get_mut(index) {
            let on_surface = region.rect.intersect(surface);
            let covered = lifted.inflate(1.0, 1.0).union(on_surface) == lifted.inflate(1.0, 1.0);
            region.rect = if covered { moved } else { region.rect.union(moved) };
            region.content_pixels = count_content_pixels(raster, region.rect).max(MIN_CONTENT_PIXELS);
        }
    }

    /// Drop regions whose ink fell below [`MIN_CONTENT_PIXELS`]. Returns how many were dropped.
    pub fn prune(&mut self, raster: &Raster) -> usize {
        let before = self.regions.len();
        self.regions
            .retain(|r| count_content_pixels(raster, r.rect) >= MIN_CONTENT_PIXELS);
        let dropped = before - self.regions.len();
        if dropped > 0 {
            log::debug!("Pruned {dropped} empty content regions");
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

/// A lifted region of the background.
#[derive(Debug, Clone)]
pub struct FloatingRegion {
    /// Background as it was before lifting.
    before: Raster,
    /// Background with the lifted area painted white.
    base: Raster,
    /// The lifted pixels at their original size.
    original: Raster,
    /// Current unrotated size.
    content_size: Size,
    center: Point,
    rotation: f64,
    gesture: Gesture,
    dirty: bool,
    tracked: Option<usize>,
    /// Where the pixels were lifted from.
    lifted: Rect,
}

impl FloatingRegion {
    /// Lift `rect` off `background`.
    ///
    /// Returns `None` for marquees under [`MIN_MARQUEE_SIZE`] in either axis
    /// (after clipping to the surface); the background is left untouched.
    pub fn lift(background: &Raster, rect: Rect, tracked: Option<usize>) -> Option<Self> {
        let rect = rect.abs().round().intersect(background.bounds());
        if rect.width() < MIN_MARQUEE_SIZE || rect.height() < MIN_MARQUEE_SIZE {
            log::debug!("Ignoring marquee {rect:?}");
            return None;
        }
        let original = background.crop(rect)?;
        let mut base = background.clone();
        base.whiten(rect);
        log::debug!("Lifted region {rect:?}");
        Some(Self {
            before: background.clone(),
            base,
            original,
            content_size: rect.size(),
            center: rect.center(),
            rotation: 0.0,
            gesture: Gesture::Idle,
            dirty: false,
            tracked,
            lifted: rect,
        })
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn tracked(&self) -> Option<usize> {
        self.tracked
    }

    pub fn lifted_rect(&self) -> Rect {
        self.lifted
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Unrotated box the handles are laid out on.
    pub fn content_rect(&self) -> Rect {
        Rect::from_center_size(self.center, self.content_size)
    }

    /// Axis-aligned bounds of the rotated content.
    pub fn bounding_box(&self) -> Rect {
        rotated_bounds(self.content_size, self.center, self.rotation)
    }

    /// Original pixels to canvas: scale to the current size, rotate, then place.
    fn transform(&self) -> Affine {
        let (w, h) = (self.original.width() as f64, self.original.height() as f64);
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.content_size.width / w, self.content_size.height / h)
            * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0))
    }

    /// Composite the base image, then the region at its current placement, over `target`.
    pub fn paint_onto(&self, target: &mut Raster) {
        target.draw_raster(&self.base, Affine::IDENTITY);
        target.draw_raster(&self.original, self.transform());
    }

    /// Grab the region at `point`: rotation handle, resize handles, then the body.
    pub fn press(&mut self, point: Point) -> Option<PressTarget> {
        let rect = self.content_rect();
        let target = match hit_test_handles(rect, self.rotation, point) {
            Some(HandleKind::Rotate) => PressTarget::Rotate,
            Some(HandleKind::Resize(handle)) => PressTarget::Resize(handle),
            None if point_in_rotated_rect(point, rect, self.rotation) => PressTarget::Body,
            None => return None,
        };
        self.gesture = match target {
            PressTarget::Rotate => Gesture::rotating(self.center, point, self.rotation),
            PressTarget::Resize(handle) => Gesture::Resizing {
                handle,
                start_rect: rect,
                start_pos: point,
            },
            PressTarget::Body => Gesture::Dragging {
                offset: point - self.bounding_box().origin(),
            },
        };
        Some(target)
    }

    /// Continue the current gesture. Returns true if the placement changed.
    pub fn update(&mut self, point: Point) -> bool {
        let (center, size, rotation) = (self.center, self.content_size, self.rotation);
        match self.gesture {
            Gesture::Idle => return false,
            Gesture::Dragging { offset } => {
                let bbox = self.bounding_box();
                let origin = clamp_origin(point - offset, bbox.size(), self.before.bounds().size());
                self.center = origin + bbox.size().to_vec2() / 2.0;
            }
            Gesture::Resizing {
                handle,
                start_rect,
                start_pos,
            } => {
                let delta = rotate_vec(point - start_pos, -self.rotation);
                let rect = resize_rect(handle, start_rect, delta);
                self.content_size = rect.size();
                self.center = rect.center();
            }
            Gesture::Rotating {
                center,
                start_angle,
                base_angle,
            } => {
                self.rotation = accumulated_rotation(center, start_angle, base_angle, point);
            }
        }
        let changed = center != self.center || size != self.content_size || rotation != self.rotation;
        self.dirty |= changed;
        changed
    }

    /// End the current gesture. Returns true if one was in progress.
    pub fn release(&mut self) -> bool {
        let was_active = self.gesture.is_active();
        self.gesture = Gesture::Idle;
        was_active
    }

    /// Bake the region into the background and return the result.
    ///
    /// An untouched region gives back the background exactly as it was.
    pub fn commit(self) -> Raster {
        if !self.dirty {
            return self.before;
        }
        let mut out = self.base.clone();
        out.draw_raster(&self.original, self.transform());
        out
    }

    /// Drop the selection and return the untouched background.
    pub fn cancel(self) -> Raster {
        self.before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpanel_core::selection::{ResizeHandle, rotate_handle_position};
    use inkpanel_core::shapes::SerializableColor;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn background() -> Raster {
        let mut raster = Raster::white(200, 100).unwrap();
        raster.fill_rect(Rect::new(20.0, 20.0, 60.0, 40.0), SerializableColor::new(255, 0, 0, 255));
        raster
    }

    #[test]
    fn test_small_marquee_discarded() {
        let bg = background();
        assert!(FloatingRegion::lift(&bg, Rect::new(10.0, 10.0, 12.0, 40.0), None).is_none());
        assert!(FloatingRegion::lift(&bg, Rect::new(10.0, 10.0, 40.0, 12.4), None).is_none());
        assert!(FloatingRegion::lift(&bg, Rect::new(10.0, 10.0, 13.0, 13.0), None).is_some());
    }

    #[test]
    fn test_untouched_commit_is_identical() {
        let bg = background();
        let mut region = FloatingRegion::lift(&bg, Rect::new(60.0, 40.0, 20.0, 20.0), None).unwrap();
        assert_eq!(region.content_rect(), Rect::new(20.0, 20.0, 60.0, 40.0));
        // Press and release without moving.
        assert_eq!(region.press(Point::new(40.0, 30.0)), Some(PressTarget::Body));
        assert!(!region.update(Point::new(40.0, 30.0)));
        region.release();
        assert_eq!(region.commit(), bg);
    }

    #[test]
    fn test_drag_moves_pixels() {
        let bg = background();
        let mut region = FloatingRegion::lift(&bg, Rect::new(20.0, 20.0, 60.0, 40.0), None).unwrap();
        region.press(Point::new(30.0, 30.0));
        assert!(region.update(Point::new(130.0, 60.0)));
        region.release();
        assert_eq!(region.content_rect(), Rect::new(120.0, 50.0, 160.0, 70.0));

        let out = region.commit();
        assert_eq!(out.pixel(140, 60), Some(RED));
        // The old spot was whitened.
        assert_eq!(out.pixel(40, 30), Some(WHITE));
    }

    #[test]
    fn test_drag_clamped_to_canvas() {
        let bg = background();
        let mut region = FloatingRegion::lift(&bg, Rect::new(20.0, 20.0, 60.0, 40.0), None).unwrap();
        region.press(Point::new(30.0, 30.0));
        region.update(Point::new(500.0, -300.0));
        assert_eq!(region.bounding_box(), Rect::new(160.0, 0.0, 200.0, 20.0));
    }

    #[test]
    fn test_rotation_composes_without_growth() {
        let bg = background();
        let mut region = FloatingRegion::lift(&bg, Rect::new(20.0, 20.0, 60.0, 40.0), None).unwrap();
        let center = region.content_rect().center();
        let radius = 50.0;

        // Two quarter-turn-halves compose into a quarter turn.
        for _ in 0..2 {
            let start = rotate_handle_position(region.content_rect(), region.rotation());
            assert_eq!(region.press(start), Some(PressTarget::Rotate));
            let angle = (start - center).atan2() + FRAC_PI_4;
            region.update(center + Vec2::from_angle(angle) * radius);
            region.release();
        }
        assert!((region.rotation() - FRAC_PI_2).abs() < 1e-9);
        let bbox = region.bounding_box();
        assert!((bbox.width() - 20.0).abs() < 1e-9);
        assert!((bbox.height() - 40.0).abs() < 1e-9);

        // And back again.
        let start = rotate_handle_position(region.content_rect(), region.rotation());
        region.press(start);
        let angle = (start - center).atan2() - FRAC_PI_2;
        region.update(center + Vec2::from_angle(angle) * radius);
        assert!(region.rotation().abs() < 1e-9);
        assert!((region.bounding_box().width() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_scales_content() {
        let bg = background();
        let mut region = FloatingRegion::lift(&bg, Rect::new(20.0, 20.0, 60.0, 40.0), None).unwrap();
        assert_eq!(
            region.press(Point::new(60.0, 40.0)),
            Some(PressTarget::Resize(ResizeHandle::BottomRight))
        );
        region.update(Point::new(100.0, 60.0));
        region.release();
        assert_eq!(region.content_rect(), Rect::new(20.0, 20.0, 100.0, 60.0));
        let out = region.commit();
        assert_eq!(out.pixel(90, 50), Some(RED));
    }

    #[test]
    fn test_content_counting() {
        let bg = background();
        assert_eq!(count_content_pixels(&bg, Rect::new(0.0, 0.0, 200.0, 100.0)), 40 * 20);
        assert!(!is_content_pixel([250, 250, 250, 255]));
        assert!(!is_content_pixel([0, 0, 0, 5]));
        assert!(is_content_pixel([0, 0, 0, 255]));
    }

    #[test]
    fn test_retrack_partial_lift_keeps_leftover() {
        let bg = Raster::white(200, 100).unwrap();
        let mut tracker = RegionTracker::new();
        let index = tracker.record(&bg, Rect::new(10.0, 10.0, 50.0, 50.0));

        tracker.retrack(index, &bg, Rect::new(10.0, 10.0, 30.0, 50.0), Rect::new(120.0, 10.0, 140.0, 50.0));
        assert_eq!(tracker.get(index).unwrap().rect, Rect::new(10.0, 10.0, 140.0, 50.0));
        assert_eq!(tracker.region_at(Point::new(40.0, 30.0)), Some(index));
        assert_eq!(tracker.region_at(Point::new(130.0, 30.0)), Some(index));
    }

    #[test]
    fn test_retrack_full_lift_follows_pixels() {
        let bg = Raster::white(200, 100).unwrap();
        let mut tracker = RegionTracker::new();
        // Partly off the surface; the lifted rect is clipped to it.
        let index = tracker.record(&bg, Rect::new(-2.0, 10.0, 40.0, 50.0));

        tracker.retrack(index, &bg, Rect::new(0.0, 10.0, 40.0, 50.0), Rect::new(100.0, 10.0, 140.0, 50.0));
        assert_eq!(tracker.get(index).unwrap().rect, Rect::new(100.0, 10.0, 140.0, 50.0));
        assert_eq!(tracker.region_at(Point::new(20.0, 30.0)), None);
    }

    #[test]
    fn test_tracker_floor_and_prune() {
        let mut bg = Raster::white(50, 50).unwrap();
        bg.set_pixel(5, 5, [0, 0, 0, 255]);
        let mut tracker = RegionTracker::new();
        let index = tracker.record(&bg, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(tracker.get(index).unwrap().content_pixels, MIN_CONTENT_PIXELS);
        assert_eq!(tracker.region_at(Point::new(5.0, 5.0)), Some(index));
        assert_eq!(tracker.overlapping(Rect::new(8.0, 8.0, 20.0, 20.0)), Some(index));
        assert_eq!(tracker.overlapping(Rect::new(30.0, 30.0, 40.0, 40.0)), None);

        // A single pixel is below the floor, so pruning drops it.
        assert_eq!(tracker.prune(&bg), 1);
        assert!(tracker.regions().is_empty());
    }
}
