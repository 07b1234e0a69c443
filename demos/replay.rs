//! Replays a tracking record through the overlay engine: renders the
//! overlay surface for chosen timestamps into PNG files and optionally
//! hit-tests a click position at each of them.
//!
//!     cargo run --example replay -- --record record.json --masks-root ./storage \
//!         --display 1280x720 --source 1920x1080 --out-dir ./overlays --click 640,360

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nalgebra::Point2;
use shoptrack::{FileMaskSource, OverlayEngine, RenderOptions, TrackingRecord};

#[derive(Parser, Debug)]
#[command(about = "Render overlay frames from a tracking record")]
struct Args {
    /// Tracking record JSON produced by the track pass.
    #[arg(long)]
    record: PathBuf,

    /// Directory that mask references resolve against.
    #[arg(long)]
    masks_root: PathBuf,

    /// Source content dimensions, e.g. 1920x1080.
    #[arg(long, value_parser = parse_dims)]
    source: (u32, u32),

    /// Display surface dimensions, e.g. 1280x720.
    #[arg(long, value_parser = parse_dims)]
    display: (u32, u32),

    /// Where the rendered overlay PNGs go.
    #[arg(long)]
    out_dir: PathBuf,

    /// Playback timestamps to render, in ms. Defaults to every stored
    /// frame.
    #[arg(long = "at")]
    at: Vec<u64>,

    /// Optional display-space click to hit-test at every rendered
    /// timestamp, e.g. 640,360.
    #[arg(long, value_parser = parse_point)]
    click: Option<(f32, f32)>,
}

fn parse_dims(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s.split_once('x').ok_or_else(|| format!("expected WxH, got {s}"))?;
    Ok((
        w.parse().map_err(|e| format!("{s}: {e}"))?,
        h.parse().map_err(|e| format!("{s}: {e}"))?,
    ))
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got {s}"))?;
    Ok((
        x.parse().map_err(|e| format!("{s}: {e}"))?,
        y.parse().map_err(|e| format!("{s}: {e}"))?,
    ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let record = TrackingRecord::from_reader(
        File::open(&args.record).with_context(|| format!("open {}", args.record.display()))?,
    )?;

    let timestamps: Vec<u64> = if args.at.is_empty() {
        record.tracks_by_frame.iter().map(|(t, _)| t).collect()
    } else {
        args.at.clone()
    };
    if timestamps.is_empty() {
        bail!("record has no frames and no --at timestamps were given");
    }

    let mut engine = OverlayEngine::new(
        record,
        args.source.0,
        args.source.1,
        args.display.0,
        args.display.1,
        FileMaskSource::new(&args.masks_root),
        RenderOptions::default(),
    )?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create {}", args.out_dir.display()))?;

    for ts in timestamps {
        // first pass queues any missing masks; settle and render again so
        // the written frame carries the fills
        engine.render(ts)?;
        let stats = engine.settle_masks();
        if stats.failed > 0 {
            eprintln!("{ts}ms: {} mask(s) unavailable, boxes only", stats.failed);
        }
        let surface = engine.render(ts)?;

        let path = args.out_dir.join(format!("overlay_{ts}.png"));
        surface.save(&path).with_context(|| format!("write {}", path.display()))?;

        match args.click {
            Some((x, y)) => {
                let hit = engine.hit_test(Point2::new(x, y));
                println!("{ts}ms -> {} (click {x},{y}: {:?})", path.display(), hit);
            }
            None => println!("{ts}ms -> {}", path.display()),
        }
    }

    Ok(())
}
