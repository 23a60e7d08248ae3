//! Segment height measurement: the vertical distance from each pupil to the
//! bottom of a worn glasses frame, drawn onto the photo and cropped to the frame.

pub mod annotate;
pub mod config;
pub mod detector;
pub mod error;
pub mod font;
pub mod geometry;
pub mod landmarks;
pub mod measure;
pub mod pipeline;
pub mod source;
pub mod ttf;
pub mod types;

pub use error::{MeasureError, Result};
pub use pipeline::{AnnotatedImage, Pipeline, PipelineState, SegmentHeightPipeline};
pub use source::{Orientation, SourceImage};
