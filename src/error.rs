use thiserror::Error;

pub type Result<T> = std::result::Result<T, WaveformError>;

#[derive(Debug, Error)]
pub enum WaveformError {
    #[error("failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("unknown sample rate")]
    UnknownSampleRate,

    #[error("stream duration is unavailable")]
    DurationUnavailable,

    #[error("unsupported output format: {0} (expected .svg or .png)")]
    UnsupportedOutput(String),

    #[error("plot backend error: {0}")]
    Plot(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
