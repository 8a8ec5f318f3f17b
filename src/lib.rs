pub mod audio;
pub mod config;
pub mod error;
pub mod render;
pub mod waveform;

pub use audio::info::{AudioStreamInfo, FormatTag};
pub use audio::merge::MergePolicy;
pub use audio::decode::SymphoniaSource;
pub use audio::source::{InterleavedSource, SampleSource};
pub use config::{Style, WaveformConfig};
pub use error::{Result, WaveformError};
pub use waveform::{ColumnValue, ReductionMode, Waveform};
