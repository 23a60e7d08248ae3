use anyhow::Result;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub annotation: AnnotationConfig,
    pub crop: CropConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub color_hex: String, // e.g. "#FF0000"
    /// Half length of every horizontal tick, in points.
    pub tick_half_width: f32,
    /// The right pupil marker and line start this many points lower.
    pub pupil_marker_offset: f32,
    /// Printed after the distance. Distances are in image points; nothing calibrates them.
    pub unit_label: String,
    pub decimals: usize,
    pub font_family: String,
    pub font_path: Option<String>,
    pub font_size_pt: f32,
    pub bitmap_scale: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Added to the crop origin's y, in device pixels.
    pub vertical_offset_px: f32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            color_hex: "#FF0000".to_string(),
            tick_half_width: 3.0,
            pupil_marker_offset: 8.0,
            unit_label: "mm".to_string(),
            decimals: 2,
            font_family: "Arial".to_string(),
            font_path: None,
            font_size_pt: 12.0,
            bitmap_scale: 2,
        }
    }
}

impl Default for CropConfig {
    fn default() -> Self {
        Self { vertical_offset_px: 12.0 }
    }
}

impl AnnotationConfig {
    pub fn color(&self) -> Rgb<u8> {
        let (r, g, b) = parse_hex(&self.color_hex);
        Rgb([r, g, b])
    }

    pub fn format_distance(&self, distance: f32) -> String {
        format!("{:.*} {}", self.decimals, distance, self.unit_label)
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.json";

    /// Reads `path`, using defaults when the file is missing or malformed.
    /// Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Configuration file {} not found. Using defaults.", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(c) => {
                info!("Loaded configuration from {}", path.display());
                Ok(c)
            }
            Err(e) => {
                warn!("Error parsing config: {}. Loading defaults.", e);
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// `#RRGGBB` to components; anything else is red.
pub fn parse_hex(hex: &str) -> (u8, u8, u8) {
    if hex.len() == 7 && hex.starts_with('#') {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(0);
        (r, g, b)
    } else {
        (255, 0, 0) // Default Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF0000"), (255, 0, 0));
        assert_eq!(parse_hex("#00FF00"), (0, 255, 0));
        assert_eq!(parse_hex("#0000FF"), (0, 0, 255));
        assert_eq!(parse_hex("#FFFFFF"), (255, 255, 255));
        assert_eq!(parse_hex("invalid"), (255, 0, 0)); // Fallback
    }

    #[test]
    fn test_format_distance() {
        let config = AnnotationConfig::default();
        assert_eq!(config.format_distance(23.456), "23.46 mm");
        assert_eq!(config.format_distance(-20.0), "-20.00 mm");

        let px = AnnotationConfig {
            unit_label: "px".to_string(),
            decimals: 0,
            ..AnnotationConfig::default()
        };
        assert_eq!(px.format_distance(299.6), "300 px");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"crop": {"vertical_offset_px": 4.0}}"#).unwrap();
        assert_eq!(config.crop.vertical_offset_px, 4.0);
        assert_eq!(config.annotation, AnnotationConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("segment_height_config_{}.json", std::process::id()));
        let mut config = AppConfig::default();
        config.annotation.color_hex = "#00FF00".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.annotation.color(), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let loaded = AppConfig::load("/nonexistent/segment_height/config.json").unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("segment_height_bad_config_{}.json", std::process::id()));
        fs::write(&path, "{ \"annotation\": [not json").unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, AppConfig::default());
    }
}
