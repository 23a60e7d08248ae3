use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

use crate::types::Size;

/// How the stored pixels must be transformed to appear upright.
///
/// Variants follow the eight EXIF orientation tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl Orientation {
    /// Orientation for an EXIF tag value (1-8).
    pub fn from_exif(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Orientation::Up),
            2 => Some(Orientation::UpMirrored),
            3 => Some(Orientation::Down),
            4 => Some(Orientation::DownMirrored),
            5 => Some(Orientation::LeftMirrored),
            6 => Some(Orientation::Right),
            7 => Some(Orientation::RightMirrored),
            8 => Some(Orientation::Left),
            _ => None,
        }
    }

    fn apply(self, pixels: RgbImage) -> RgbImage {
        match self {
            Orientation::Up => pixels,
            Orientation::UpMirrored => imageops::flip_horizontal(&pixels),
            Orientation::Down => imageops::rotate180(&pixels),
            Orientation::DownMirrored => imageops::flip_vertical(&pixels),
            Orientation::LeftMirrored => imageops::flip_horizontal(&imageops::rotate90(&pixels)),
            Orientation::Right => imageops::rotate90(&pixels),
            Orientation::RightMirrored => imageops::flip_horizontal(&imageops::rotate270(&pixels)),
            Orientation::Left => imageops::rotate270(&pixels),
        }
    }
}

/// A captured photo, upright, with the scale factor it was captured at.
///
/// Geometry is computed in points (`pixels / scale`); drawing and cropping work
/// in device pixels.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbImage,
    orientation: Orientation,
    scale: f32,
}

impl SourceImage {
    /// Largest accepted pixels-per-point factor.
    pub const MAX_SCALE: f32 = 8.0;

    /// Bakes `orientation` into the pixels. Non-positive scales fall back to 1.0;
    /// larger ones are capped at `MAX_SCALE`.
    pub fn new(pixels: RgbImage, orientation: Orientation, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale.min(Self::MAX_SCALE)
        } else {
            1.0
        };
        Self {
            pixels: orientation.apply(pixels),
            orientation,
            scale,
        }
    }

    pub fn upright(pixels: RgbImage) -> Self {
        Self::new(pixels, Orientation::Up, 1.0)
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Orientation the image was captured with; the stored pixels are already upright.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Image size in points.
    pub fn point_size(&self) -> Size {
        Size::new(
            self.pixels.width() as f32 / self.scale,
            self.pixels.height() as f32 / self.scale,
        )
    }
}
