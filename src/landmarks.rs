use serde::Deserialize;
use tracing::debug;

use crate::error::{MeasureError, Result};
use crate::geometry::normalized_point_to_pixel;
use crate::types::{NormalizedPoint, NormalizedRect, Origin, PupilPair, PupilSide, Size};

/// Landmark points of one facial feature, relative to the face bounding box.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "")]
pub struct LandmarkRegion<O: Origin> {
    pub points: Vec<NormalizedPoint<O>>,
}

impl<O: Origin> LandmarkRegion<O> {
    pub fn new(points: Vec<NormalizedPoint<O>>) -> Self {
        Self { points }
    }
}

/// Named landmark groups the measurement needs.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(bound = "", default)]
pub struct FaceLandmarks<O: Origin> {
    pub left_pupil: Option<LandmarkRegion<O>>,
    pub right_pupil: Option<LandmarkRegion<O>>,
}

impl<O: Origin> FaceLandmarks<O> {
    pub fn pupil(&self, side: PupilSide) -> Option<&LandmarkRegion<O>> {
        match side {
            PupilSide::Left => self.left_pupil.as_ref(),
            PupilSide::Right => self.right_pupil.as_ref(),
        }
    }
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "")]
pub struct FaceObservation<O: Origin> {
    /// Face region in full-image unit space.
    pub bounding_box: NormalizedRect<O>,
    #[serde(default)]
    pub landmarks: Option<FaceLandmarks<O>>,
}

/// Centroid of a landmark region mapped into full-image unit space.
///
/// Returns `None` for a region without points.
pub fn pupil_center<O: Origin>(
    region: &LandmarkRegion<O>,
    face_box: &NormalizedRect<O>,
) -> Option<NormalizedPoint<O>> {
    if region.points.is_empty() {
        return None;
    }
    let n = region.points.len() as f32;
    let (sx, sy) = region
        .points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (ax, ay) = (sx / n, sy / n);

    Some(NormalizedPoint::new(
        ax * face_box.width + face_box.x,
        ay * face_box.height + face_box.y,
    ))
}

/// Pixel-space pupil centers of the first face that carries both pupil groups.
pub fn locate_pupils<O: Origin>(faces: &[FaceObservation<O>], size: Size) -> Result<PupilPair> {
    if faces.is_empty() {
        return Err(MeasureError::NoFaceDetected);
    }

    let face = faces
        .iter()
        .find(|f| {
            f.landmarks
                .as_ref()
                .is_some_and(|lm| lm.left_pupil.is_some() && lm.right_pupil.is_some())
        })
        .ok_or_else(|| {
            let missing = faces
                .iter()
                .filter_map(|f| f.landmarks.as_ref())
                .find_map(|lm| lm.left_pupil.as_ref().map(|_| PupilSide::Right))
                .unwrap_or(PupilSide::Left);
            MeasureError::NoPupilLandmarks(missing)
        })?;

    let center = |side: PupilSide| {
        face.landmarks
            .as_ref()
            .and_then(|lm| lm.pupil(side))
            .and_then(|region| pupil_center(region, &face.bounding_box))
            .map(|p| normalized_point_to_pixel(&p, size))
            .ok_or(MeasureError::NoPupilLandmarks(side))
    };

    let pair = PupilPair {
        left: center(PupilSide::Left)?,
        right: center(PupilSide::Right)?,
    };
    debug!(
        faces = faces.len(),
        origin = O::NAME,
        left = ?pair.left,
        right = ?pair.right,
        "located pupils"
    );
    Ok(pair)
}
