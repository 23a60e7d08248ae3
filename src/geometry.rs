//! Coordinate arithmetic shared by the locator, the adapter and the annotator.

use crate::types::{NormalizedPoint, NormalizedRect, Origin, PixelPoint, PixelRect, Size};

/// Euclidean distance between two image-space points.
pub fn distance_between(p1: PixelPoint, p2: PixelPoint) -> f32 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

/// Maps a unit-space rectangle into image space (top-left origin).
pub fn normalized_rect_to_pixel<O: Origin>(rect: &NormalizedRect<O>, bounds: Size) -> PixelRect {
    PixelRect::new(
        rect.x * bounds.width,
        O::top_edge(rect.y, rect.max_y()) * bounds.height,
        rect.width * bounds.width,
        rect.height * bounds.height,
    )
}

/// Maps a unit-space point into image space (top-left origin).
pub fn normalized_point_to_pixel<O: Origin>(point: &NormalizedPoint<O>, bounds: Size) -> PixelPoint {
    PixelPoint::new(point.x * bounds.width, O::y_from_top(point.y) * bounds.height)
}

/// Overlap of two rectangles, `None` when they do not share any area.
pub fn intersection(a: &PixelRect, b: &PixelRect) -> Option<PixelRect> {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.max_x().min(b.max_x());
    let y1 = a.max_y().min(b.max_y());
    let rect = PixelRect::new(x0, y0, x1 - x0, y1 - y0);
    if rect.is_empty() {
        None
    } else {
        Some(rect)
    }
}

/// Smallest whole-pixel rectangle containing `rect`: origin floored, far edge ceiled.
///
/// Returned as `(x, y, width, height)` ready for `imageops::crop_imm`.
pub fn integral(rect: &PixelRect) -> (u32, u32, u32, u32) {
    let x0 = rect.x.floor().max(0.0);
    let y0 = rect.y.floor().max(0.0);
    let x1 = rect.max_x().ceil().max(x0);
    let y1 = rect.max_y().ceil().max(y0);
    (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BottomLeft, TopLeft};

    const EPS: f32 = 1e-3;

    #[test]
    fn test_distance_between() {
        let d = distance_between(PixelPoint::new(0.0, 0.0), PixelPoint::new(3.0, 4.0));
        assert!((d - 5.0).abs() < EPS);
        assert_eq!(distance_between(PixelPoint::new(7.0, 7.0), PixelPoint::new(7.0, 7.0)), 0.0);
    }

    #[test]
    fn test_rect_conversion_flips_bottom_left() {
        let rect = NormalizedRect::<BottomLeft>::new(0.2, 0.3, 0.4, 0.2);
        let px = normalized_rect_to_pixel(&rect, Size::new(1000.0, 1000.0));
        assert!((px.x - 200.0).abs() < EPS);
        assert!((px.y - 500.0).abs() < EPS);
        assert!((px.width - 400.0).abs() < EPS);
        assert!((px.height - 200.0).abs() < EPS);
        assert!((px.max_y() - 700.0).abs() < EPS);
    }

    #[test]
    fn test_rect_conversion_keeps_top_left() {
        let rect = NormalizedRect::<TopLeft>::new(0.2, 0.3, 0.4, 0.2);
        let px = normalized_rect_to_pixel(&rect, Size::new(1000.0, 500.0));
        assert!((px.y - 150.0).abs() < EPS);
        assert!((px.height - 100.0).abs() < EPS);
    }

    #[test]
    fn test_rect_conversion_preserves_area_ratio() {
        let bounds = [Size::new(640.0, 480.0), Size::new(1.0, 1.0), Size::new(3024.0, 4032.0)];
        let rects = [
            NormalizedRect::<BottomLeft>::new(0.0, 0.0, 1.0, 1.0),
            NormalizedRect::<BottomLeft>::new(0.1, 0.7, 0.25, 0.05),
            NormalizedRect::<BottomLeft>::new(0.5, 0.5, 0.5, 0.5),
        ];
        for b in bounds {
            for r in &rects {
                let px = normalized_rect_to_pixel(r, b);
                let ratio = px.area() / (b.width * b.height);
                assert!((ratio - r.area()).abs() < 1e-5, "{:?} in {:?}", r, b);
            }
        }
    }

    #[test]
    fn test_bottom_center_maps_to_bottom_edge() {
        let p = NormalizedPoint::<BottomLeft>::new(0.5, 0.0);
        let px = normalized_point_to_pixel(&p, Size::new(800.0, 600.0));
        assert!((px.x - 400.0).abs() < EPS);
        assert!((px.y - 600.0).abs() < EPS);

        let top = NormalizedPoint::<TopLeft>::new(0.5, 0.0);
        assert_eq!(normalized_point_to_pixel(&top, Size::new(800.0, 600.0)).y, 0.0);
    }

    #[test]
    fn test_intersection() {
        let image = PixelRect::new(0.0, 0.0, 100.0, 100.0);
        let inside = intersection(&PixelRect::new(80.0, 90.0, 50.0, 50.0), &image);
        assert_eq!(inside, Some(PixelRect::new(80.0, 90.0, 20.0, 10.0)));

        assert_eq!(intersection(&PixelRect::new(150.0, 0.0, 10.0, 10.0), &image), None);
        // Touching edges share no area.
        assert_eq!(intersection(&PixelRect::new(100.0, 0.0, 10.0, 10.0), &image), None);
    }

    #[test]
    fn test_integral() {
        assert_eq!(integral(&PixelRect::new(10.4, 20.6, 5.2, 5.0)), (10, 20, 6, 6));
        assert_eq!(integral(&PixelRect::new(0.0, 0.0, 4.0, 3.0)), (0, 0, 4, 3));
    }
}
