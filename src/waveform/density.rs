//! Column density and decimation arithmetic.

use super::ReductionMode;

/// Columns per second for a recording of the given length. Longer files get
/// sparser columns: `base / floor(log2(seconds))`, never below one.
pub fn columns_per_second(duration_millis: u64, base_density: u32) -> u32 {
    let seconds = (duration_millis / 1000).max(1);
    let di = seconds.ilog2().max(1);
    (base_density / di).max(1)
}

/// Frames between two columns: `max(1, round(sample_rate / columns_per_second))`.
pub fn column_stride(sample_rate: u32, columns_per_second: u32) -> usize {
    let cps = columns_per_second.max(1) as f64;
    ((sample_rate as f64 / cps).round() as usize).max(1)
}

/// Read buffer size in frames: a whole number of strides, floored at
/// `min_frames` unless a single stride is already larger.
pub fn chunk_frames(stride: usize, min_frames: usize) -> usize {
    let stride = stride.max(1);
    if stride < min_frames {
        min_frames / stride * stride
    } else {
        stride
    }
}

/// How the engine walks the frame stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decimation {
    /// Frames between two columns.
    pub column_stride: usize,
    /// Frames between two retained frames. Equals `column_stride` in direct
    /// mode; in windowed mode it is the sampling step inside one window, so a
    /// window of `merge_size` retained frames still spans `column_stride`.
    pub frame_stride: usize,
    /// Retained frames folded into one column.
    pub merge_size: usize,
    /// Frames requested per read.
    pub chunk_frames: usize,
}

impl Decimation {
    pub fn new(
        sample_rate: u32,
        columns_per_second: u32,
        mode: ReductionMode,
        envelope_resolution: usize,
        min_chunk_frames: usize,
    ) -> Self {
        let column_stride = column_stride(sample_rate, columns_per_second);
        let (frame_stride, merge_size) = match mode {
            ReductionMode::Direct => (column_stride, 1),
            ReductionMode::Windowed => {
                let resolution = envelope_resolution.max(1) as f64;
                let frame_stride = ((column_stride as f64 / resolution).round() as usize).max(1);
                let merge_size =
                    ((column_stride as f64 / frame_stride as f64).round() as usize).max(1);
                (frame_stride, merge_size)
            }
        };
        Self {
            column_stride,
            frame_stride,
            merge_size,
            chunk_frames: chunk_frames(frame_stride, min_chunk_frames),
        }
    }
}
