//! Drawing layers, previews and selection chrome onto a raster.

use crate::raster::{Raster, StrokeStyle};
use crate::renderer::ShapePreview;
use crate::text::FontBook;
use inkpanel_core::layers::{ShapeLayer, TextLayer};
use inkpanel_core::selection::{HANDLE_SIZE, HandleKind, ROTATE_HANDLE_RADIUS, handles, spoke_origin};
use inkpanel_core::shapes::{SerializableColor, trace_rect};
use kurbo::{Affine, BezPath, Circle, Ellipse, Point, Rect, Shape, Vec2};

/// Selection accent color.
pub const SELECTION_COLOR: SerializableColor = SerializableColor {
    r: 59,
    g: 130,
    b: 246,
    a: 255,
};
/// Dash pattern of selection outlines and the marquee.
pub const SELECTION_DASH: (f32, f32) = (6.0, 4.0);

/// Speech balloon ellipse width.
pub const BALLOON_WIDTH: f64 = 220.0;
/// Speech balloon ellipse height.
pub const BALLOON_HEIGHT: f64 = 120.0;
/// How far the balloon tail tip reaches below the ellipse.
pub const BALLOON_TAIL_LENGTH: f64 = 35.0;

fn rotation_transform(rect: Rect, rotation: f64) -> Affine {
    Affine::rotate_about(rotation, rect.center())
}

/// Fill (if any) then stroke a shape layer under its rotation.
pub fn paint_shape_layer(raster: &mut Raster, layer: &ShapeLayer) {
    let path = layer.path();
    let transform = rotation_transform(layer.rect(), layer.rotation);
    if let Some(fill) = layer.content.fill_color {
        raster.fill_path(&path, fill, transform);
    }
    let stroke = StrokeStyle::solid(layer.content.stroke_color, layer.content.stroke_width);
    raster.stroke_path(&path, &stroke, transform);
}

/// Draw a text layer at the font size it was measured with.
pub fn paint_text_layer(raster: &mut Raster, fonts: &FontBook, layer: &TextLayer, scale: f64) {
    fonts.draw_text(
        raster,
        &layer.content.text,
        &layer.content.canvas_font(scale),
        layer.content.color,
        layer.rect(),
        layer.rotation,
    );
}

/// Outline of a shape being dragged out with a shape tool.
pub fn paint_shape_preview(raster: &mut Raster, preview: &ShapePreview) {
    let path = trace_rect(preview.kind, preview.rect);
    let stroke = StrokeStyle::rounded(preview.color, preview.stroke_width);
    raster.stroke_path(&path, &stroke, Affine::IDENTITY);
}

/// Ellipse of the speech balloon centered on `center`.
pub fn balloon_rect(center: Point) -> Rect {
    Rect::from_center_size(center, (BALLOON_WIDTH, BALLOON_HEIGHT))
}

/// Draw a white speech balloon with a tail toward the lower left.
///
/// The tail is filled after the ellipse outline so the outline does not cut
/// across the tail's base.
pub fn paint_balloon(raster: &mut Raster, center: Point, color: SerializableColor, width: f64) {
    let (rx, ry) = (BALLOON_WIDTH / 2.0, BALLOON_HEIGHT / 2.0);
    let ellipse = Ellipse::new(center, (rx, ry), 0.0).to_path(0.1);
    let outline = StrokeStyle::rounded(color, width);
    raster.fill_path(&ellipse, SerializableColor::white(), Affine::IDENTITY);
    raster.stroke_path(&ellipse, &outline, Affine::IDENTITY);

    // Base points sit just inside the ellipse, below and left of center.
    let on_ellipse = |deg: f64| {
        let (sin, cos) = deg.to_radians().sin_cos();
        center + Vec2::new(rx * cos, ry * sin) * 0.9
    };
    let (left, right) = (on_ellipse(125.0), on_ellipse(100.0));
    let tip = center + Vec2::new(-0.3 * BALLOON_WIDTH, ry + BALLOON_TAIL_LENGTH);

    let mut tail = BezPath::new();
    tail.move_to(right);
    tail.line_to(tip);
    tail.line_to(left);
    let mut body = tail.clone();
    body.close_path();
    raster.fill_path(&body, SerializableColor::white(), Affine::IDENTITY);
    raster.stroke_path(&tail, &outline, Affine::IDENTITY);
}

/// Dashed marquee rectangle.
pub fn paint_marquee(raster: &mut Raster, rect: Rect) {
    let style = StrokeStyle::dashed(SELECTION_COLOR, 1.0, SELECTION_DASH.0, SELECTION_DASH.1);
    raster.stroke_path(&rect.to_path(0.1), &style, Affine::IDENTITY);
}

/// Dashed rotated outline, eight resize handles, the rotation handle and its spoke.
pub fn paint_selection(raster: &mut Raster, rect: Rect, rotation: f64) {
    let dashed = StrokeStyle::dashed(SELECTION_COLOR, 1.0, SELECTION_DASH.0, SELECTION_DASH.1);
    raster.stroke_path(&rect.to_path(0.1), &dashed, rotation_transform(rect, rotation));

    let outline = StrokeStyle::solid(SELECTION_COLOR, 1.0);
    for handle in handles(rect, rotation) {
        match handle.kind {
            HandleKind::Resize(_) => {
                let square = Rect::from_center_size(handle.position, (HANDLE_SIZE, HANDLE_SIZE));
                raster.fill_rect(square, SerializableColor::white());
                raster.stroke_path(&square.to_path(0.1), &outline, Affine::IDENTITY);
            }
            HandleKind::Rotate => {
                let mut spoke = BezPath::new();
                spoke.move_to(spoke_origin(rect, rotation));
                spoke.line_to(handle.position);
                raster.stroke_path(&spoke, &outline, Affine::IDENTITY);

                let knob = Circle::new(handle.position, ROTATE_HANDLE_RADIUS).to_path(0.1);
                raster.fill_path(&knob, SerializableColor::white(), Affine::IDENTITY);
                raster.stroke_path(&knob, &outline, Affine::IDENTITY);
            }
        }
    }
}
