use thiserror::Error;

use crate::types::PupilSide;

/// Error type returned by detector implementations.
pub type DetectorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every way a measurement run can end without an image.
#[derive(Error, Debug)]
pub enum MeasureError {
    #[error("no face detected in image")]
    NoFaceDetected,

    #[error("no {0} pupil landmarks on the detected face")]
    NoPupilLandmarks(PupilSide),

    #[error("no glasses frame detected in image")]
    NoFrameDetected,

    #[error("crop region does not overlap the image")]
    InvalidCropRegion,

    #[error("detector invocation failed: {0}")]
    DetectorInvocationFailed(#[source] DetectorError),
}

pub type Result<T> = std::result::Result<T, MeasureError>;
