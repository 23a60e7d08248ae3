use image::RgbImage;
use std::fmt;
use tracing::{debug, info, warn};

use crate::annotate::{Annotator, Canvas};
use crate::config::AppConfig;
use crate::detector::{select_frame, FaceLandmarkDetector, FrameDetector};
use crate::error::{MeasureError, Result};
use crate::landmarks::locate_pupils;
use crate::measure::measure;
use crate::source::SourceImage;
use crate::types::{Measurement, PixelRect, PupilPair};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct AnnotatedImage {
    /// Annotated photo cropped to the frame.
    pub image: RgbImage,
    /// Region of the source cropped out, in device pixels.
    pub crop: PixelRect,
    /// Left then right.
    pub measurements: [Measurement; 2],
    pub pupils: PupilPair,
    pub frame: PixelRect,
}

/// Stage of a run. A run only moves forward and ends in `Done` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    DetectingLandmarks,
    DetectingFrame,
    Measuring,
    Annotating,
    Cropping,
    Done,
    Failed(String),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::DetectingLandmarks => write!(f, "detecting landmarks"),
            PipelineState::DetectingFrame => write!(f, "detecting frame"),
            PipelineState::Measuring => write!(f, "measuring"),
            PipelineState::Annotating => write!(f, "annotating"),
            PipelineState::Cropping => write!(f, "cropping"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

pub trait Pipeline {
    fn name(&self) -> String;
    fn process(&mut self, source: &SourceImage) -> Result<AnnotatedImage>;

    /// Runs to completion and hands the outcome to `on_complete`, exactly once.
    fn run<F>(&mut self, source: &SourceImage, on_complete: F)
    where
        F: FnOnce(Result<AnnotatedImage>),
        Self: Sized,
    {
        on_complete(self.process(source));
    }
}

/// Face landmarks, then the glasses frame, then measurement, annotation and crop.
pub struct SegmentHeightPipeline<F, G> {
    face_detector: F,
    frame_detector: G,
    annotator: Annotator,
    state: PipelineState,
}

impl<F, G> SegmentHeightPipeline<F, G>
where
    F: FaceLandmarkDetector,
    G: FrameDetector,
{
    pub fn new(face_detector: F, frame_detector: G, annotator: Annotator) -> Self {
        Self {
            face_detector,
            frame_detector,
            annotator,
            state: PipelineState::Idle,
        }
    }

    pub fn from_config(face_detector: F, frame_detector: G, config: &AppConfig) -> Self {
        let annotator = Annotator::from_config(config.annotation.clone(), config.crop.clone());
        Self::new(face_detector, frame_detector, annotator)
    }

    /// State reached by the last run, `Idle` before the first.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    fn enter(&mut self, state: PipelineState) {
        debug!(from = %self.state, to = %state, "pipeline transition");
        self.state = state;
    }

    fn execute(&mut self, source: &SourceImage) -> Result<AnnotatedImage> {
        let size = source.point_size();

        self.enter(PipelineState::DetectingLandmarks);
        let faces = self
            .face_detector
            .detect_faces(source.pixels())
            .map_err(MeasureError::DetectorInvocationFailed)?;
        let pupils = locate_pupils(&faces, size)?;

        self.enter(PipelineState::DetectingFrame);
        let frames = self
            .frame_detector
            .detect_frames(source.pixels())
            .map_err(MeasureError::DetectorInvocationFailed)?;
        let frame = select_frame(&frames, size)?;

        self.enter(PipelineState::Measuring);
        let measurements = measure(&frame, &pupils);

        self.enter(PipelineState::Annotating);
        let canvas = self
            .annotator
            .render(Canvas::from_source(source), &pupils, &frame, &measurements);

        self.enter(PipelineState::Cropping);
        let (image, crop) = self.annotator.crop(&canvas, &frame)?;

        Ok(AnnotatedImage {
            image,
            crop,
            measurements,
            pupils,
            frame,
        })
    }
}

impl<F, G> Pipeline for SegmentHeightPipeline<F, G>
where
    F: FaceLandmarkDetector,
    G: FrameDetector,
{
    fn name(&self) -> String {
        format!(
            "Segment Height ({} + {})",
            self.face_detector.name(),
            self.frame_detector.name()
        )
    }

    fn process(&mut self, source: &SourceImage) -> Result<AnnotatedImage> {
        self.enter(PipelineState::Idle);
        match self.execute(source) {
            Ok(result) => {
                self.enter(PipelineState::Done);
                let [left, right] = result.measurements;
                info!(
                    left = left.distance,
                    right = right.distance,
                    width = result.image.width(),
                    height = result.image.height(),
                    "segment height measured"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(stage = %self.state, "measurement failed: {}", e);
                self.enter(PipelineState::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::LabelFont;
    use crate::config::{AnnotationConfig, CropConfig};
    use crate::detector::{FrameObservation, RecordedDetections};
    use crate::error::DetectorError;
    use crate::landmarks::{FaceLandmarks, FaceObservation, LandmarkRegion};
    use crate::types::{BottomLeft, NormalizedPoint, NormalizedRect};

    struct BrokenDetector;

    impl FrameDetector for BrokenDetector {
        type Origin = BottomLeft;

        fn name(&self) -> String {
            "Broken".to_string()
        }

        fn detect_frames(
            &mut self,
            _image: &RgbImage,
        ) -> std::result::Result<Vec<FrameObservation<BottomLeft>>, DetectorError> {
            Err("model not loaded".into())
        }
    }

    fn recorded(frames: Vec<FrameObservation<BottomLeft>>) -> RecordedDetections {
        let pupil = |x: f32, y: f32| Some(LandmarkRegion::new(vec![NormalizedPoint::new(x, y)]));
        RecordedDetections {
            faces: vec![FaceObservation {
                bounding_box: NormalizedRect::new(0.0, 0.0, 1.0, 1.0),
                landmarks: Some(FaceLandmarks {
                    left_pupil: pupil(0.3, 0.6),
                    right_pupil: pupil(0.5, 0.6),
                }),
            }],
            frames,
        }
    }

    fn annotator() -> Annotator {
        Annotator::new(
            AnnotationConfig::default(),
            CropConfig::default(),
            LabelFont::Bitmap { scale: 2 },
        )
    }

    fn glasses(x: f32, y: f32, w: f32, h: f32) -> FrameObservation<BottomLeft> {
        FrameObservation::new("glasses", 0.9, NormalizedRect::new(x, y, w, h))
    }

    #[test]
    fn test_run_reaches_done() {
        let rec = recorded(vec![glasses(0.2, 0.3, 0.4, 0.2)]);
        let mut pipeline = SegmentHeightPipeline::new(rec.clone(), rec, annotator());
        assert_eq!(pipeline.state(), &PipelineState::Idle);

        let source = SourceImage::upright(RgbImage::new(1000, 1000));
        let result = pipeline.process(&source).unwrap();
        assert_eq!(pipeline.state(), &PipelineState::Done);
        assert!((result.measurements[0].distance - 300.0).abs() < 1e-2);
        assert!((result.measurements[1].distance - 300.0).abs() < 1e-2);
        assert_eq!(result.image.dimensions(), (400, 200));
    }

    #[test]
    fn test_missing_frame_fails() {
        let rec = recorded(Vec::new());
        let mut pipeline = SegmentHeightPipeline::new(rec.clone(), rec, annotator());
        let source = SourceImage::upright(RgbImage::new(100, 100));

        let mut calls = 0;
        pipeline.run(&source, |outcome| {
            calls += 1;
            assert!(matches!(outcome, Err(MeasureError::NoFrameDetected)));
        });
        assert_eq!(calls, 1);
        assert!(pipeline.state().is_terminal());
        assert!(matches!(pipeline.state(), PipelineState::Failed(_)));
    }

    #[test]
    fn test_detector_error_is_surfaced() {
        let rec = recorded(Vec::new());
        let mut pipeline = SegmentHeightPipeline::new(rec, BrokenDetector, annotator());
        let source = SourceImage::upright(RgbImage::new(100, 100));
        match pipeline.process(&source) {
            Err(MeasureError::DetectorInvocationFailed(e)) => assert_eq!(e.to_string(), "model not loaded"),
            other => panic!("unexpected outcome: {:?}", other.map(|r| r.measurements)),
        }
    }

    #[test]
    fn test_frame_outside_image_fails_at_crop() {
        // Box sits below the image in bottom-left space.
        let rec = recorded(vec![glasses(0.2, -0.5, 0.4, 0.2)]);
        let mut pipeline = SegmentHeightPipeline::new(rec.clone(), rec, annotator());
        let source = SourceImage::upright(RgbImage::new(100, 100));
        assert!(matches!(pipeline.process(&source), Err(MeasureError::InvalidCropRegion)));
        assert_eq!(
            pipeline.state(),
            &PipelineState::Failed(MeasureError::InvalidCropRegion.to_string())
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::DetectingFrame.to_string(), "detecting frame");
        assert!(!PipelineState::Cropping.is_terminal());
    }
}
