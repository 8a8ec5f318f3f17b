use clap::Parser;
use std::path::PathBuf;

use wavestrip::{MergePolicy, Style};

#[derive(Parser, Debug)]
#[command(name = "wavestrip", about = "Render a waveform image (SVG or PNG) from a PCM audio file")]
pub struct Cli {
    /// Input audio file (WAV)
    pub input: PathBuf,

    /// Output image; the extension (.svg or .png) picks the renderer
    #[arg(short, long, default_value = "waveform.png")]
    pub output: PathBuf,

    /// Waveform style
    #[arg(long, value_enum)]
    pub style: Option<Style>,

    /// Channel merge policy (defaults to the style's policy)
    #[arg(long, value_enum)]
    pub merge: Option<MergePolicy>,

    /// Columns per second for recordings under four seconds
    #[arg(long)]
    pub density: Option<u32>,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print stream metadata as JSON and exit
    #[arg(long)]
    pub info: bool,
}
