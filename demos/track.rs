//! Runs the tracking pass over a JSONL file of sampled frames (one
//! `SampledFrame` object per line) and writes the finished tracking
//! record as JSON.
//!
//!     cargo run --example track -- --input frames.jsonl --output record.json --video-id demo

use std::convert::Infallible;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shoptrack::{
    FrameSource, ProcessingStatus, SampledFrame, StaticCatalog, TrackingPipeline,
};

#[derive(Parser, Debug)]
#[command(about = "Link sampled detections into a tracking record")]
struct Args {
    /// JSONL file with one sampled frame per line.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the tracking record JSON.
    #[arg(long)]
    output: PathBuf,

    #[arg(long, default_value = "demo")]
    video_id: String,

    /// Source video frame rate recorded in the artifact.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Source video frame count; defaults to the number of sampled frames.
    #[arg(long)]
    total_frames: Option<u64>,

    /// Product candidates per track.
    #[arg(long, default_value_t = 3)]
    product_limit: usize,
}

struct ParsedSource(std::vec::IntoIter<SampledFrame>);

impl FrameSource for ParsedSource {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<SampledFrame>, Infallible> {
        Ok(self.0.next())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let reader = BufReader::new(
        File::open(&args.input).with_context(|| format!("open {}", args.input.display()))?,
    );
    let mut frames = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: SampledFrame = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", args.input.display(), n + 1))?;
        frames.push(frame);
    }
    let sampled = frames.len() as u64;

    let mut pipeline = TrackingPipeline::new();
    let mut status = ProcessingStatus::new();
    let mut source = ParsedSource(frames.into_iter());
    pipeline.run(&mut source, &mut status, Some(sampled))?;

    let record = pipeline.finish(
        args.video_id,
        args.fps,
        args.total_frames.unwrap_or(sampled),
        &StaticCatalog::with_defaults(),
        args.product_limit,
    );

    fs::write(&args.output, record.to_json_pretty()?)
        .with_context(|| format!("write {}", args.output.display()))?;

    println!(
        "{} frames, {} tracks -> {}",
        sampled,
        record.object_products.len(),
        args.output.display()
    );
    Ok(())
}
