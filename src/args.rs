use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Photo of a face wearing glasses
    #[arg(short, long)]
    pub image: PathBuf,

    /// Recorded face-landmark and frame detections (JSON)
    #[arg(short, long)]
    pub detections: PathBuf,

    /// Where to write the annotated crop (format from extension)
    #[arg(short, long, default_value = "segment_height.png")]
    pub output: PathBuf,

    /// EXIF orientation tag of the photo (1-8)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub orientation: u8,

    /// Device pixels per point
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Write the effective configuration back to --config
    #[arg(long)]
    pub write_config: bool,

    /// Print the measurements as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Log filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
