use anyhow::Context;
use image::RgbImage;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{DetectorError, MeasureError, Result};
use crate::geometry::normalized_rect_to_pixel;
use crate::landmarks::FaceObservation;
use crate::types::{BottomLeft, NormalizedRect, Origin, PixelRect, Size};

/// Finds faces and their pupil landmark groups.
pub trait FaceLandmarkDetector {
    type Origin: Origin;

    fn name(&self) -> String;
    fn detect_faces(
        &mut self,
        image: &RgbImage,
    ) -> std::result::Result<Vec<FaceObservation<Self::Origin>>, DetectorError>;
}

/// Finds eyeglasses frames. Observations come ranked by the detector, best first.
pub trait FrameDetector {
    type Origin: Origin;

    fn name(&self) -> String;
    fn detect_frames(
        &mut self,
        image: &RgbImage,
    ) -> std::result::Result<Vec<FrameObservation<Self::Origin>>, DetectorError>;
}

/// One labelled box from the object detector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "")]
pub struct FrameObservation<O: Origin> {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub confidence: f32,
    pub bounding_box: NormalizedRect<O>,
}

impl<O: Origin> FrameObservation<O> {
    pub fn new(label: &str, confidence: f32, bounding_box: NormalizedRect<O>) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            bounding_box,
        }
    }
}

/// Pixel-space box of the first observation.
///
/// There is no confidence threshold: the detector's own ranking decides.
pub fn select_frame<O: Origin>(observations: &[FrameObservation<O>], size: Size) -> Result<PixelRect> {
    let first = observations.first().ok_or(MeasureError::NoFrameDetected)?;
    let rect = normalized_rect_to_pixel(&first.bounding_box, size);
    debug!(
        candidates = observations.len(),
        label = %first.label,
        confidence = first.confidence,
        ?rect,
        "selected frame"
    );
    Ok(rect)
}

/// Detector results captured ahead of time, replayed for every image.
///
/// Coordinates use a bottom-left origin, the convention of the platform
/// face-landmark and object detectors these records come from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordedDetections {
    pub faces: Vec<FaceObservation<BottomLeft>>,
    pub frames: Vec<FrameObservation<BottomLeft>>,
}

impl RecordedDetections {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read detections from {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl FaceLandmarkDetector for RecordedDetections {
    type Origin = BottomLeft;

    fn name(&self) -> String {
        "Recorded Face Landmarks".to_string()
    }

    fn detect_faces(
        &mut self,
        _image: &RgbImage,
    ) -> std::result::Result<Vec<FaceObservation<BottomLeft>>, DetectorError> {
        Ok(self.faces.clone())
    }
}

impl FrameDetector for RecordedDetections {
    type Origin = BottomLeft;

    fn name(&self) -> String {
        "Recorded Glasses Frames".to_string()
    }

    fn detect_frames(
        &mut self,
        _image: &RgbImage,
    ) -> std::result::Result<Vec<FrameObservation<BottomLeft>>, DetectorError> {
        Ok(self.frames.clone())
    }
}
