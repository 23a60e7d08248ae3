//! A tiny 3x5 bitmap font, used when no TrueType font is available.
//! Covers digits, the letters needed for unit labels and basic punctuation;
//! lowercase letters render as uppercase.
use image::{Rgb, RgbImage};

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

pub fn draw_text_line(image: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>, scale: u32) {
    let mut cx = x;
    for c in text.chars() {
        draw_char(image, cx, y, c, color, scale);
        cx += advance(scale) as i32;
    }
}

pub fn measure_text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * advance(scale)
}

pub fn measure_text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}

// glyph width plus one column of spacing
fn advance(scale: u32) -> u32 {
    (GLYPH_WIDTH + 1) * scale
}

fn glyph(c: char) -> [u8; 5] {
    // Each row is 3 bits, column 0 is the highest bit
    match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        'C' => [0x7, 0x4, 0x4, 0x4, 0x7],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'M' => [0x5, 0x7, 0x5, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'P' => [0x7, 0x5, 0x7, 0x4, 0x4],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7], // block
    }
}

fn draw_char(image: &mut RgbImage, x: i32, y: i32, c: char, color: Rgb<u8>, scale: u32) {
    let (width, height) = image.dimensions();
    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + (col * scale + dx) as i32;
                    let py = y + (row as u32 * scale + dy) as i32;
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        image.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}
