//! Tolerance-based 4-connected flood fill.

use crate::raster::Raster;
use inkpanel_core::shapes::SerializableColor;
use kurbo::Point;

/// Maximum per-channel RGB difference for a pixel to match the seed color.
pub const COLOR_TOLERANCE: u8 = 10;
/// Maximum alpha difference for a pixel to match the seed color.
pub const ALPHA_TOLERANCE: u8 = 5;
/// Pixels with alpha below this are treated as transparent.
pub const TRANSPARENT_ALPHA: u8 = 10;

fn is_transparent(px: [u8; 4]) -> bool {
    px[3] < TRANSPARENT_ALPHA
}

/// Whether `candidate` belongs to the region seeded with `target`.
pub fn matches_target(target: [u8; 4], candidate: [u8; 4]) -> bool {
    if is_transparent(target) {
        return is_transparent(candidate);
    }
    (0..3).all(|i| target[i].abs_diff(candidate[i]) <= COLOR_TOLERANCE)
        && target[3].abs_diff(candidate[3]) <= ALPHA_TOLERANCE
}

/// Flood fill from `seed`.
///
/// Matching is decided on `reference` (what the user sees, e.g. background
/// plus grid lines) and matching pixels are overwritten in `target` with
/// `color` at full opacity. Both surfaces must have the same size. Returns the
/// number of pixels that changed; a seed outside the surface changes nothing.
pub fn flood_fill(target: &mut Raster, reference: &Raster, seed: Point, color: SerializableColor) -> usize {
    let (width, height) = (reference.width(), reference.height());
    if target.width() != width || target.height() != height {
        log::warn!("Flood fill surfaces differ in size, skipping");
        return 0;
    }
    if !(seed.x >= 0.0 && seed.y >= 0.0) {
        return 0;
    }
    let (sx, sy) = (seed.x.floor() as u32, seed.y.floor() as u32);
    let Some(seed_color) = reference.pixel(sx, sy) else {
        return 0;
    };

    let fill = [color.r, color.g, color.b, 255];
    let mut visited = vec![false; width as usize * height as usize];
    let mut stack = vec![(sx, sy)];
    visited[(sy * width + sx) as usize] = true;
    let mut written = 0;

    while let Some((x, y)) = stack.pop() {
        if target.pixel(x, y) != Some(fill) {
            target.set_pixel(x, y, fill);
            written += 1;
        }

        let neighbors = [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|&nx| nx < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|&ny| ny < height)),
        ];
        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let index = (ny * width + nx) as usize;
            if visited[index] {
                continue;
            }
            let matched = reference.pixel(nx, ny).is_some_and(|px| matches_target(seed_color, px));
            if matched {
                visited[index] = true;
                stack.push((nx, ny));
            }
        }
    }

    log::debug!("Flood fill at ({sx}, {sy}) wrote {written} pixels");
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed_raster() -> Raster {
        // White 20x20 with a black vertical wall at x = 10.
        let mut raster = Raster::white(20, 20).unwrap();
        for y in 0..20 {
            raster.set_pixel(10, y, [0, 0, 0, 255]);
        }
        raster
    }

    #[test]
    fn test_fill_stops_at_wall() {
        let mut target = boxed_raster();
        let reference = target.clone();
        let red = SerializableColor::new(255, 0, 0, 255);
        let written = flood_fill(&mut target, &reference, Point::new(2.0, 2.0), red);
        assert_eq!(written, 10 * 20);
        assert_eq!(target.pixel(9, 19), Some([255, 0, 0, 255]));
        assert_eq!(target.pixel(10, 5), Some([0, 0, 0, 255]));
        assert_eq!(target.pixel(11, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_fill_idempotent() {
        let mut raster = boxed_raster();
        let red = SerializableColor::new(255, 0, 0, 255);
        let reference = raster.clone();
        flood_fill(&mut raster, &reference, Point::new(2.0, 2.0), red);
        let before = raster.to_rgba();
        let reference = raster.clone();
        assert_eq!(flood_fill(&mut raster, &reference, Point::new(2.0, 2.0), red), 0);
        assert_eq!(raster.to_rgba(), before);
    }

    #[test]
    fn test_fill_tolerances() {
        let target = [100, 100, 100, 255];
        assert!(matches_target(target, [110, 90, 100, 255]));
        assert!(!matches_target(target, [111, 100, 100, 255]));
        assert!(matches_target(target, [100, 100, 100, 250]));
        assert!(!matches_target(target, [100, 100, 100, 249]));
        // Any color counts as transparent when alpha is tiny.
        assert!(matches_target([0, 0, 0, 0], [255, 0, 0, 9]));
        assert!(!matches_target([0, 0, 0, 0], [0, 0, 0, 10]));
    }

    #[test]
    fn test_fill_transparent_surface() {
        let mut target = Raster::new(8, 8).unwrap();
        let reference = target.clone();
        let blue = SerializableColor::new(0, 0, 255, 128);
        assert_eq!(flood_fill(&mut target, &reference, Point::new(3.0, 3.0), blue), 64);
        // Written at full opacity.
        assert_eq!(target.pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_fill_out_of_bounds_seed() {
        let mut target = Raster::white(8, 8).unwrap();
        let reference = target.clone();
        let c = SerializableColor::black();
        assert_eq!(flood_fill(&mut target, &reference, Point::new(-1.0, 3.0), c), 0);
        assert_eq!(flood_fill(&mut target, &reference, Point::new(8.0, 3.0), c), 0);
        assert_eq!(flood_fill(&mut target, &reference, Point::new(f64::NAN, 3.0), c), 0);
    }
}
