//! Burns pupil markers, calibration lines and distance labels into the photo,
//! then crops it to the glasses frame.
//!
//! Every step takes the canvas by value and hands back the drawn-on result, so
//! steps compose in a fixed order and no drawing surface is shared.

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use tracing::{debug, warn};

use crate::config::{AnnotationConfig, CropConfig};
use crate::error::{MeasureError, Result};
use crate::font;
use crate::geometry::{integral, intersection};
use crate::source::SourceImage;
use crate::ttf::FontRenderer;
use crate::types::{Measurement, PixelPoint, PixelRect, PupilPair, PupilSide};

/// Working image plus the factor from points to its pixels.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub image: RgbImage,
    pub scale: f32,
}

impl Canvas {
    pub fn from_source(source: &SourceImage) -> Self {
        Self {
            image: source.pixels().clone(),
            scale: source.scale(),
        }
    }

    fn bounds(&self) -> PixelRect {
        PixelRect::new(0.0, 0.0, self.image.width() as f32, self.image.height() as f32)
    }

    /// Segment in points; the part outside the image is never walked.
    fn line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgb<u8>) {
        let (a, b) = (from.scaled(self.scale), to.scaled(self.scale));
        if let Some((a, b)) = clip_segment(a, b, &self.bounds()) {
            draw_line_segment_mut(&mut self.image, (a.x, a.y), (b.x, b.y), color);
        }
    }

    fn tick(&mut self, center: PixelPoint, half_width: f32, color: Rgb<u8>) {
        self.line(center.offset(-half_width, 0.0), center.offset(half_width, 0.0), color);
    }
}

/// Liang-Barsky clip of `a`-`b` against `bounds`, in f64 so far-off endpoints keep their precision.
fn clip_segment(a: PixelPoint, b: PixelPoint, bounds: &PixelRect) -> Option<(PixelPoint, PixelPoint)> {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-dx, ax - bounds.x as f64),
        (dx, bounds.max_x() as f64 - ax),
        (-dy, ay - bounds.y as f64),
        (dy, bounds.max_y() as f64 - ay),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| PixelPoint::new((ax + t * dx) as f32, (ay + t * dy) as f32);
    Some((at(t0), at(t1)))
}

/// Font used for distance labels.
pub enum LabelFont {
    TrueType(FontRenderer),
    Bitmap { scale: u32 },
}

impl LabelFont {
    /// Configured font file, then the font family, then the bitmap font.
    pub fn from_config(config: &AnnotationConfig) -> Self {
        let configured = config.font_path.as_deref().and_then(|path| {
            let font = FontRenderer::from_file(path);
            if font.is_none() {
                warn!("Could not load font file '{}'. Trying family '{}'.", path, config.font_family);
            }
            font
        });
        configured
            .or_else(|| FontRenderer::try_load(&config.font_family))
            .map(LabelFont::TrueType)
            .unwrap_or(LabelFont::Bitmap {
                scale: config.bitmap_scale.max(1),
            })
    }

    /// Rendered `(width, height)` in device pixels.
    fn text_size(&self, text: &str, size_px: f32, device_scale: f32) -> (f32, f32) {
        match self {
            LabelFont::TrueType(r) => (r.measure_width(text, size_px), r.measure_height(size_px)),
            LabelFont::Bitmap { scale } => {
                let s = bitmap_scale(*scale, device_scale);
                (
                    font::measure_text_width(text, s) as f32,
                    font::measure_text_height(s) as f32,
                )
            }
        }
    }

    fn draw(&self, image: &mut RgbImage, x: f32, y: f32, text: &str, color: Rgb<u8>, size_px: f32, device_scale: f32) {
        match self {
            LabelFont::TrueType(r) => r.draw_text(image, x, y, text, color, size_px),
            LabelFont::Bitmap { scale } => {
                let s = bitmap_scale(*scale, device_scale);
                font::draw_text_line(image, x.round() as i32, y.round() as i32, text, color, s);
            }
        }
    }
}

fn bitmap_scale(scale: u32, device_scale: f32) -> u32 {
    scale.saturating_mul((device_scale.round() as u32).max(1))
}

pub struct Annotator {
    style: AnnotationConfig,
    crop: CropConfig,
    font: LabelFont,
}

impl Annotator {
    pub fn new(style: AnnotationConfig, crop: CropConfig, font: LabelFont) -> Self {
        Self { style, crop, font }
    }

    pub fn from_config(style: AnnotationConfig, crop: CropConfig) -> Self {
        let font = LabelFont::from_config(&style);
        Self::new(style, crop, font)
    }

    /// Where the marker and line for `side` start.
    ///
    /// The right side sits `pupil_marker_offset` lower, at the bottom of the pupil.
    fn anchor(&self, pupils: &PupilPair, side: PupilSide) -> PixelPoint {
        let p = pupils.get(side);
        match side {
            PupilSide::Left => p,
            PupilSide::Right => p.offset(0.0, self.style.pupil_marker_offset),
        }
    }

    /// A short horizontal tick at each pupil.
    pub fn draw_pupil_markers(&self, mut canvas: Canvas, pupils: &PupilPair) -> Canvas {
        let color = self.style.color();
        for side in [PupilSide::Left, PupilSide::Right] {
            canvas.tick(self.anchor(pupils, side), self.style.tick_half_width, color);
        }
        canvas
    }

    /// Vertical line from `start` to `end` with a tick at `end` and `label` centered on it.
    pub fn draw_calibration_line(&self, mut canvas: Canvas, start: PixelPoint, end: PixelPoint, label: &str) -> Canvas {
        let color = self.style.color();
        canvas.line(start, end, color);
        canvas.tick(end, self.style.tick_half_width, color);

        let mid = PixelPoint::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0).scaled(canvas.scale);
        let size_px = self.style.font_size_pt * canvas.scale;
        let (w, h) = self.font.text_size(label, size_px, canvas.scale);
        self.font.draw(
            &mut canvas.image,
            mid.x - w / 2.0,
            mid.y - h / 2.0,
            label,
            color,
            size_px,
            canvas.scale,
        );
        canvas
    }

    /// Markers plus one labelled calibration line per measurement.
    pub fn render(&self, canvas: Canvas, pupils: &PupilPair, frame: &PixelRect, measurements: &[Measurement]) -> Canvas {
        let canvas = self.draw_pupil_markers(canvas, pupils);
        measurements.iter().fold(canvas, |canvas, m| {
            let start = self.anchor(pupils, m.side);
            let end = PixelPoint::new(pupils.get(m.side).x, frame.max_y());
            let label = self.style.format_distance(m.distance);
            self.draw_calibration_line(canvas, start, end, &label)
        })
    }

    /// Crops to `frame` shifted down by the configured offset.
    ///
    /// Returns the cropped image and the region used, in device pixels.
    pub fn crop(&self, canvas: &Canvas, frame: &PixelRect) -> Result<(RgbImage, PixelRect)> {
        let bounds = canvas.bounds();
        let visible = intersection(&frame.scaled(canvas.scale), &bounds).ok_or(MeasureError::InvalidCropRegion)?;
        let shifted = visible.offset(0.0, self.crop.vertical_offset_px);
        let clipped = intersection(&shifted, &bounds).ok_or(MeasureError::InvalidCropRegion)?;

        let (x, y, w, h) = integral(&clipped);
        if w == 0 || h == 0 {
            return Err(MeasureError::InvalidCropRegion);
        }
        debug!(x, y, w, h, "cropping");
        let cropped = imageops::crop_imm(&canvas.image, x, y, w, h).to_image();
        Ok((cropped, PixelRect::new(x as f32, y as f32, w as f32, h as f32)))
    }
}
