use clap::Parser;
use fluxbeat::config::{
    DEFAULT_THRESHOLD_MULTIPLIER, DEFAULT_THRESHOLD_WINDOW_SIZE, DEFAULT_WINDOW_SIZE,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fluxbeat", about = "Spectral-flux onset detector for rhythm game maps")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Output JSON file, or "-" for stdout
    #[arg(short, long, default_value = "onsets.json")]
    pub output: PathBuf,

    /// Config file (defaults to fluxbeat.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Samples per analysis window (FFT size and hop)
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window_size: usize,

    /// Number of windows averaged into each local threshold
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_WINDOW_SIZE)]
    pub threshold_window: usize,

    /// Threshold sensitivity multiplier
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_MULTIPLIER)]
    pub multiplier: f32,

    /// Only write records flagged as peaks
    #[arg(long)]
    pub peaks_only: bool,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
