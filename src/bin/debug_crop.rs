use anyhow::Context;
use image::ImageReader;
use segment_height::annotate::{Annotator, Canvas};
use segment_height::config::AppConfig;
use segment_height::detector::{select_frame, FrameDetector, RecordedDetections};
use segment_height::SourceImage;
use std::env;

fn usage(args: &[String]) -> String {
    let program = args.first().map(String::as_str).unwrap_or("debug_crop");
    format!("usage: {} <image> <detections.json> [crop.png]", program)
}

// Shows where the frame box lands and what the crop keeps, without annotating.
// Usage: debug_crop <image> <detections.json> [crop.png]
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        anyhow::bail!(usage(&args));
    }
    let config = AppConfig::load(AppConfig::DEFAULT_PATH)?;

    println!("Loading {}", args[1]);
    let pixels = ImageReader::open(&args[1])?.decode()?.to_rgb8();
    let source = SourceImage::upright(pixels);
    let size = source.point_size();
    println!("Image: {}x{} points", size.width, size.height);

    let mut detections = RecordedDetections::load(&args[2])?;
    let frames = detections
        .detect_frames(source.pixels())
        .map_err(|e| anyhow::anyhow!(e))?;
    println!("Frame observations: {}", frames.len());

    let frame = select_frame(&frames, size)?;
    println!(
        "Frame box: ({:.1}, {:.1}) {:.1}x{:.1}, bottom edge at {:.1}",
        frame.x,
        frame.y,
        frame.width,
        frame.height,
        frame.max_y()
    );

    let annotator = Annotator::from_config(config.annotation, config.crop);
    let (cropped, region) = annotator.crop(&Canvas::from_source(&source), &frame)?;
    println!(
        "Crop region: ({}, {}) {}x{}",
        region.x, region.y, region.width, region.height
    );

    if let Some(out) = args.get(3) {
        cropped.save(out).with_context(|| format!("Failed to save {}", out))?;
        println!("Saved {}", out);
    }
    Ok(())
}
