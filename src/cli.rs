use clap::Parser;
use std::path::PathBuf;

/// Sprite-sheet animation previewer (headless)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image files forming the frame sequence, in playback order (PNG, JPEG)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Load the frame sequence from a JSON file instead
    #[arg(short = 's', long = "sequence", value_name = "SEQUENCE")]
    pub sequence: Option<PathBuf>,

    /// Playback frame rate
    #[arg(long = "fps", value_name = "FPS", default_value = "24")]
    pub fps: f32,

    /// Global playback scale (zoom)
    #[arg(long = "scale", value_name = "S", default_value = "1")]
    pub scale: f32,

    /// Surface size in pixels (defaults to the largest scaled frame)
    #[arg(long = "surface", value_names = ["W", "H"], num_args = 2)]
    pub surface: Option<Vec<u32>>,

    /// Number of scheduler callbacks to run (at a ~60 Hz virtual cadence)
    #[arg(short = 'n', long = "ticks", value_name = "N", default_value = "240")]
    pub ticks: u32,

    /// Mirror all frames horizontally
    #[arg(long = "flip-x")]
    pub flip_x: bool,

    /// Mirror all frames vertically
    #[arg(long = "flip-y")]
    pub flip_y: bool,

    /// Stroke each frame's logical bounds (debug)
    #[arg(long = "bbox")]
    pub bounding_box: bool,

    /// Disable clipping to the frame bounds
    #[arg(long = "no-clip")]
    pub no_clip: bool,

    /// Dump each displayed frame as PNG into this directory
    #[arg(short = 'd', long = "dump", value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
