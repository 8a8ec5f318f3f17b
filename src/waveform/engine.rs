use super::density::Decimation;
use super::{ColumnSink, ColumnValue, ReductionMode};
use crate::audio::merge::MergePolicy;
use crate::audio::source::SampleSource;
use crate::error::Result;

/// Zero amplitude is lifted to this before the log so silence keeps a
/// finite height.
pub const SILENCE_SENTINEL: f64 = 1.1;

/// Column height for a merged scalar in direct mode.
pub fn log_height(value: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude == 0.0 {
        SILENCE_SENTINEL.log2()
    } else {
        magnitude.log2()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReducerParams {
    pub columns_per_second: u32,
    pub mode: ReductionMode,
    pub policy: MergePolicy,
    pub envelope_resolution: usize,
    pub min_chunk_frames: usize,
}

/// Result of one pass over the stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReductionSummary {
    pub decimation: Decimation,
    pub columns: u64,
    pub frames_read: u64,
    /// Smallest column value seen, never above zero.
    pub lower: f64,
    /// Largest column value seen, never below zero.
    pub upper: f64,
}

impl ReductionSummary {
    fn observe(&mut self, low: f64, high: f64) {
        self.lower = self.lower.min(low);
        self.upper = self.upper.max(high);
    }
}

struct Window {
    min: f64,
    max: f64,
    len: usize,
}

impl Window {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            len: 0,
        }
    }

    fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.len += 1;
    }

    fn close(self) -> ColumnValue {
        let max = if self.min == self.max { self.min + 1.0 } else { self.max };
        ColumnValue::Range { min: self.min, max }
    }
}

/// Single-pass streaming reducer from frames to columns.
pub struct Reducer {
    params: ReducerParams,
}

impl Reducer {
    pub fn new(params: ReducerParams) -> Self {
        Self { params }
    }

    pub fn decimation_for(&self, sample_rate: u32) -> Decimation {
        Decimation::new(
            sample_rate,
            self.params.columns_per_second,
            self.params.mode,
            self.params.envelope_resolution,
            self.params.min_chunk_frames,
        )
    }

    /// Stream the whole source once, pushing each finished column into
    /// `sink` in order.
    pub fn run<S, C>(&self, source: &mut S, sink: &mut C) -> Result<ReductionSummary>
    where
        S: SampleSource + ?Sized,
        C: ColumnSink + ?Sized,
    {
        let channels = source.info().channel_count.max(1) as usize;
        let decimation = self.decimation_for(source.info().sample_rate);
        let stride = decimation.frame_stride;

        log::info!(
            "Reducing at {} column(s)/s: stride {} frame(s), {} per column, chunk {} frame(s)",
            self.params.columns_per_second,
            stride,
            decimation.merge_size,
            decimation.chunk_frames
        );

        let mut summary = ReductionSummary {
            decimation,
            columns: 0,
            frames_read: 0,
            lower: 0.0,
            upper: 0.0,
        };
        let mut buf = Vec::with_capacity(decimation.chunk_frames * channels);
        let mut window: Option<Window> = None;
        // offset of the next retained frame within the upcoming chunk
        let mut offset = 0usize;

        loop {
            let frames = source.next_chunk(&mut buf, decimation.chunk_frames)?;
            if frames == 0 {
                break;
            }
            summary.frames_read += frames as u64;

            let mut i = offset;
            while i < frames {
                let frame = &buf[i * channels..(i + 1) * channels];
                let value = self.params.policy.merge(frame);
                self.retain(value, &mut window, &mut summary, sink);
                i += stride;
            }
            offset = i - frames;
        }

        // trailing partial window
        if let Some(open) = window.take() {
            Self::emit(open.close(), &mut summary, sink);
        }

        log::info!(
            "Reduced {} frame(s) to {} column(s), range [{:.3}, {:.3}]",
            summary.frames_read,
            summary.columns,
            summary.lower,
            summary.upper
        );
        Ok(summary)
    }

    fn retain<C: ColumnSink + ?Sized>(
        &self,
        value: f64,
        window: &mut Option<Window>,
        summary: &mut ReductionSummary,
        sink: &mut C,
    ) {
        match self.params.mode {
            ReductionMode::Direct => {
                Self::emit(ColumnValue::Height(log_height(value)), summary, sink);
            }
            ReductionMode::Windowed => {
                let open = window.get_or_insert_with(Window::new);
                open.add(value);
                if open.len >= summary.decimation.merge_size {
                    if let Some(full) = window.take() {
                        Self::emit(full.close(), summary, sink);
                    }
                }
            }
        }
    }

    fn emit<C: ColumnSink + ?Sized>(value: ColumnValue, summary: &mut ReductionSummary, sink: &mut C) {
        let (low, high) = value.extent();
        summary.observe(low, high);
        summary.columns += 1;
        sink.push_column(value);
    }
}
