use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub struct FontRenderer {
    font: Font<'static>,
}

impl FontRenderer {
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let data = fs::read(path).ok()?;
        let font = Font::try_from_vec(data)?;
        debug!("Loaded font from {}", path.display());
        Some(Self { font })
    }

    pub fn try_load(family: &str) -> Option<Self> {
        // Common macOS/Linux locations, then the working directory
        let paths = [
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("/usr/share/fonts/TTF/{}.ttf", family),
            format!("{}.ttf", family),
        ];

        let found = paths
            .iter()
            .filter(|p| Path::new(p).exists())
            .find_map(Self::from_file);
        if found.is_none() {
            warn!("Could not find font family '{}'. Falling back to bitmap.", family);
        }
        found
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn draw_text(&self, image: &mut RgbImage, x: f32, y: f32, text: &str, color: Rgb<u8>, size_pt: f32) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let start = point(x, y + v_metrics.ascent);
        let (width, height) = image.dimensions();

        for glyph in self.font.layout(text, scale, start) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    // Skip faint anti-aliasing fringe
                    if v < 0.2 {
                        return;
                    }
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        image.put_pixel(px as u32, py as u32, color);
                    }
                });
            }
        }
    }

    pub fn measure_width(&self, text: &str, size_pt: f32) -> f32 {
        let scale = Scale::uniform(size_pt);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    pub fn measure_height(&self, size_pt: f32) -> f32 {
        let v_metrics = self.font.v_metrics(Scale::uniform(size_pt));
        v_metrics.ascent - v_metrics.descent + v_metrics.line_gap
    }
}
