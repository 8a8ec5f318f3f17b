use super::info::{AudioStreamInfo, FormatTag};
use crate::error::Result;

/// Pull-based supplier of interleaved integer frames.
pub trait SampleSource {
    fn info(&self) -> &AudioStreamInfo;

    /// Replace the contents of `buf` with up to `max_frames` interleaved
    /// frames and return how many were written. Fewer frames than requested
    /// only happens at end of stream; `Ok(0)` means the stream is exhausted.
    fn next_chunk(&mut self, buf: &mut Vec<i32>, max_frames: usize) -> Result<usize>;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn info(&self) -> &AudioStreamInfo {
        (**self).info()
    }

    fn next_chunk(&mut self, buf: &mut Vec<i32>, max_frames: usize) -> Result<usize> {
        (**self).next_chunk(buf, max_frames)
    }
}

/// In-memory source over already-interleaved samples.
pub struct InterleavedSource {
    info: AudioStreamInfo,
    samples: Vec<i32>,
    position: usize,
}

impl InterleavedSource {
    pub fn new(channel_count: u32, sample_rate: u32, bits_per_sample: u32, samples: Vec<i32>) -> Self {
        let channels = channel_count.max(1) as u64;
        let frames = samples.len() as u64 / channels;
        let duration_millis = if sample_rate == 0 {
            None
        } else {
            Some(frames * 1000 / sample_rate as u64)
        };
        Self {
            info: AudioStreamInfo {
                format_tag: FormatTag::Pcm,
                channel_count,
                sample_rate,
                duration_millis,
                bits_per_sample,
            },
            samples,
            position: 0,
        }
    }

    /// Override the duration reported by the header, e.g. to simulate a
    /// stream that cannot be measured.
    pub fn with_duration(mut self, duration_millis: Option<u64>) -> Self {
        self.info.duration_millis = duration_millis;
        self
    }
}

impl SampleSource for InterleavedSource {
    fn info(&self) -> &AudioStreamInfo {
        &self.info
    }

    fn next_chunk(&mut self, buf: &mut Vec<i32>, max_frames: usize) -> Result<usize> {
        buf.clear();
        let channels = self.info.channel_count.max(1) as usize;
        let remaining = (self.samples.len() - self.position) / channels;
        let frames = remaining.min(max_frames);
        let end = self.position + frames * channels;
        buf.extend_from_slice(&self.samples[self.position..end]);
        self.position = end;
        Ok(frames)
    }
}
