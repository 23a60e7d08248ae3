use anyhow::{anyhow, Context};
use clap::Parser;
use colored::*;
use image::ImageReader;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;

use args::Args;
use segment_height::config::AppConfig;
use segment_height::detector::RecordedDetections;
use segment_height::types::{Measurement, PixelRect, PupilPair};
use segment_height::{AnnotatedImage, Orientation, Pipeline, SegmentHeightPipeline, SourceImage};

#[derive(Serialize)]
struct Report<'a> {
    measurements: &'a [Measurement; 2],
    pupils: &'a PupilPair,
    frame: &'a PixelRect,
    crop: &'a PixelRect,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn report(result: &AnnotatedImage, json: bool) -> anyhow::Result<()> {
    if json {
        let report = Report {
            measurements: &result.measurements,
            pupils: &result.pupils,
            frame: &result.frame,
            crop: &result.crop,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for m in &result.measurements {
        println!(
            "{}",
            format!("{:<5} pupil to frame bottom: {:.2}", m.side, m.distance).green()
        );
    }
    println!(
        "Crop: {}x{} at ({}, {})",
        result.crop.width, result.crop.height, result.crop.x, result.crop.y
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    // 0. Load Config
    let config = AppConfig::load(&args.config)?;
    if args.write_config {
        config
            .save(&args.config)
            .with_context(|| format!("Failed to write {}", args.config.display()))?;
    }

    // 1. Load Photo
    let orientation = Orientation::from_exif(args.orientation)
        .ok_or_else(|| anyhow!("Invalid orientation tag {}", args.orientation))?;
    let pixels = ImageReader::open(&args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", args.image.display()))?
        .to_rgb8();
    let source = SourceImage::new(pixels, orientation, args.scale);

    // 2. Setup Detectors
    let detections = RecordedDetections::load(&args.detections)?;
    let mut pipeline = SegmentHeightPipeline::from_config(detections.clone(), detections, &config);
    info!("Active Pipeline: {}", pipeline.name());

    // 3. Measure
    let mut outcome = None;
    pipeline.run(&source, |result| outcome = Some(result));
    let result = outcome
        .ok_or_else(|| anyhow!("Pipeline finished without an outcome"))?
        .map_err(|e| {
            eprintln!("{}", format!("Measurement failed: {}", e).red());
            e
        })?;

    // 4. Output
    report(&result, args.json)?;
    result
        .image
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    info!("Saved {}", args.output.display());

    Ok(())
}
