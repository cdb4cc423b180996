//! Headless preview runner.
//!
//! Builds a frame sequence from image files (or a JSON sequence file),
//! resolves it through the frame store and plays it on a software surface
//! at a virtual 60 Hz scheduler cadence. Displayed frames can be dumped as
//! PNGs for inspection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;

use spriteplay::cli::Args;
use spriteplay::{
    probe_dimensions, DrawOptions, ManualScheduler, PixelSurface, Player, SheetLibrary,
    SourceRect, SpriteFrame, Surface,
};

/// Scheduler callback spacing for the headless run (virtual 60 Hz).
const TICK_MS: f64 = 1000.0 / 60.0;

/// One entry of a JSON sequence file.
#[derive(Debug, Deserialize)]
struct SequenceEntry {
    file: PathBuf,
    #[serde(default)]
    flip_x: bool,
    #[serde(default)]
    flip_y: bool,
    #[serde(default)]
    new_width: Option<f32>,
    #[serde(default)]
    new_height: Option<f32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let entries = load_entries(&args)?;
    if entries.is_empty() {
        bail!("No input frames; pass image files or --sequence <file>");
    }

    // Register assets and build descriptors, front-loading dimension probes
    let mut library = SheetLibrary::new();
    let mut descriptors = Vec::new();
    let mut max_w = 0.0f32;
    let mut max_h = 0.0f32;
    for entry in &entries {
        let bytes = fs::read(&entry.file)
            .with_context(|| format!("Reading {}", entry.file.display()))?;
        let (w, h) = probe_dimensions(&bytes)
            .with_context(|| format!("Probing {}", entry.file.display()))?;
        debug!("{}: {}x{}", entry.file.display(), w, h);

        let mut frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, w as f32, h as f32))
            .with_flips(entry.flip_x || args.flip_x, entry.flip_y || args.flip_y);
        if let (Some(nw), Some(nh)) = (entry.new_width, entry.new_height) {
            frame = frame.with_dest_size(nw, nh);
            frame.frame_bounds.frame_width = nw;
            frame.frame_bounds.frame_height = nh;
        }

        let (dw, dh) = frame.dest_size();
        max_w = max_w.max(dw * args.scale);
        max_h = max_h.max(dh * args.scale);

        library.add_image(frame.id, bytes);
        descriptors.push(frame);
    }

    let (surface_w, surface_h) = match args.surface.as_deref() {
        Some([w, h]) => (*w as usize, *h as usize),
        _ => (max_w.ceil() as usize, max_h.ceil() as usize),
    };
    if surface_w == 0 || surface_h == 0 {
        bail!("Surface size is zero; check --surface and --scale");
    }
    info!(
        "Previewing {} frames on a {}x{} surface at {} fps",
        descriptors.len(),
        surface_w,
        surface_h,
        args.fps
    );

    let mut surface = PixelSurface::new(surface_w, surface_h);
    let mut scheduler = ManualScheduler::new();
    let mut player = Player::new();
    player.set_fps(args.fps)?;
    player.set_global_scale(args.scale);
    player.set_draw_options(DrawOptions {
        with_bounding_box: args.bounding_box,
        with_clipping: !args.no_clip,
    });

    player.init_frames(&library, &descriptors, &mut scheduler);
    player.play(&mut scheduler)?;

    // Drive the tick chain: one callback per virtual frame period
    let mut now_ms = 0.0;
    let mut last_displayed = None;
    let mut dumped = 0u32;
    for _ in 0..args.ticks {
        if scheduler.take_next().is_none() {
            break;
        }
        player.tick(now_ms, &mut surface, &mut scheduler);

        if player.displayed_frame() != last_displayed {
            last_displayed = player.displayed_frame();
            if let (Some(dir), Some(index)) = (&args.dump_dir, last_displayed) {
                dump_frame(dir, dumped, index, &surface)?;
                dumped += 1;
            }
        }
        now_ms += TICK_MS;
    }

    player.stop(&mut scheduler);
    info!(
        "Done: {:.1} ms simulated, {} frame dump(s)",
        now_ms, dumped
    );
    Ok(())
}

fn load_entries(args: &Args) -> Result<Vec<SequenceEntry>> {
    if let Some(path) = &args.sequence {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Reading sequence {}", path.display()))?;
        let entries: Vec<SequenceEntry> = serde_json::from_str(&data)
            .with_context(|| format!("Parsing sequence {}", path.display()))?;
        Ok(entries)
    } else {
        Ok(args
            .files
            .iter()
            .map(|file| SequenceEntry {
                file: file.clone(),
                flip_x: false,
                flip_y: false,
                new_width: None,
                new_height: None,
            })
            .collect())
    }
}

/// Write the surface as `frame_NNNN.png` under `dir`.
fn dump_frame(dir: &Path, ordinal: u32, index: usize, surface: &PixelSurface) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Creating {}", dir.display()))?;

    let img = image::RgbaImage::from_raw(
        surface.width() as u32,
        surface.height() as u32,
        surface.pixels().to_vec(),
    )
    .context("Surface buffer size mismatch")?;

    let path = dir.join(format!("frame_{:04}.png", ordinal));
    img.save(&path)
        .with_context(|| format!("Writing {}", path.display()))?;
    debug!("Dumped frame {} -> {}", index, path.display());
    Ok(())
}
