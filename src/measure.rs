use crate::types::{Measurement, PixelPoint, PixelRect, PupilPair, PupilSide};

/// Gap from `pupil` down to the bottom edge of `frame`.
///
/// Negative when the pupil sits below the frame; the value is not clamped.
pub fn vertical_distance(frame: &PixelRect, pupil: PixelPoint) -> f32 {
    frame.max_y() - pupil.y
}

/// Left and right measurements, in that order.
pub fn measure(frame: &PixelRect, pupils: &PupilPair) -> [Measurement; 2] {
    [PupilSide::Left, PupilSide::Right].map(|side| Measurement {
        side,
        distance: vertical_distance(frame, pupils.get(side)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_bottom(bottom: f32) -> PixelRect {
        PixelRect::new(100.0, bottom - 150.0, 300.0, 150.0)
    }

    #[test]
    fn test_pupil_above_frame_bottom() {
        let d = vertical_distance(&frame_with_bottom(500.0), PixelPoint::new(200.0, 480.0));
        assert!((d - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_pupil_below_frame_bottom_is_negative() {
        let d = vertical_distance(&frame_with_bottom(500.0), PixelPoint::new(200.0, 520.0));
        assert!((d + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_measure_keeps_side_order() {
        let pupils = PupilPair {
            left: PixelPoint::new(150.0, 400.0),
            right: PixelPoint::new(350.0, 410.0),
        };
        let [left, right] = measure(&frame_with_bottom(500.0), &pupils);
        assert_eq!(left.side, PupilSide::Left);
        assert_eq!(right.side, PupilSide::Right);
        assert!((left.distance - 100.0).abs() < 1e-4);
        assert!((right.distance - 90.0).abs() < 1e-4);
    }
}
