use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::info::{AudioStreamInfo, FormatTag};
use super::source::SampleSource;
use crate::error::{Result, WaveformError};

/// Streaming PCM reader backed by symphonia. Samples come out in the
/// container's native integer range (a 16-bit file yields values in ±32768).
pub struct SymphoniaSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    info: AudioStreamInfo,
    pending: VecDeque<i32>,
    finished: bool,
}

impl SymphoniaSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        Self::from_media_source(Box::new(file), hint)
    }

    pub fn from_media_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<Self> {
        let mss = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(WaveformError::NoAudioTrack)?;

        let track_id = track.id;
        let params = track.codec_params.clone();
        let sample_rate = params.sample_rate.ok_or(WaveformError::UnknownSampleRate)?;
        let channel_count = params.channels.map_or(1, |c| c.count()) as u32;
        let duration_millis = params.n_frames.map(|n| n * 1000 / sample_rate as u64);
        let bits_per_sample = params
            .bits_per_sample
            .or(params.bits_per_coded_sample)
            .unwrap_or(0);

        let decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

        let info = AudioStreamInfo {
            format_tag: FormatTag::from_codec(params.codec),
            channel_count,
            sample_rate,
            duration_millis,
            bits_per_sample,
        };

        log::info!(
            "Opened stream: {} channel(s), {}Hz, {} bit, duration {:?}ms",
            info.channel_count,
            info.sample_rate,
            info.bits_per_sample,
            info.duration_millis
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            info,
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// Decode one packet into the pending queue.
    fn decode_packet(&mut self) -> Result<()> {
        let packet = match self.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finished = true;
                return Ok(());
            }
            Err(SymphoniaError::ResetRequired) => {
                self.finished = true;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != self.track_id {
            return Ok(());
        }

        let decoded = match self.decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping undecodable packet: {}", msg);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let shift = native_shift(&decoded);
        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<i32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        self.pending
            .extend(sample_buf.samples().iter().map(|&s| s >> shift));
        Ok(())
    }
}

/// symphonia widens integer samples to i32 by left-shifting; undo it so the
/// values keep their on-disk magnitude.
fn native_shift(buf: &AudioBufferRef<'_>) -> u32 {
    match buf {
        AudioBufferRef::U8(_) | AudioBufferRef::S8(_) => 24,
        AudioBufferRef::U16(_) | AudioBufferRef::S16(_) => 16,
        AudioBufferRef::U24(_) | AudioBufferRef::S24(_) => 8,
        _ => 0,
    }
}

impl SampleSource for SymphoniaSource {
    fn info(&self) -> &AudioStreamInfo {
        &self.info
    }

    fn next_chunk(&mut self, buf: &mut Vec<i32>, max_frames: usize) -> Result<usize> {
        buf.clear();
        let channels = self.info.channel_count.max(1) as usize;
        let wanted = max_frames * channels;

        while self.pending.len() < wanted && !self.finished {
            self.decode_packet()?;
        }

        let available = wanted.min(self.pending.len());
        let take = available - available % channels;
        buf.extend(self.pending.drain(..take));
        log::debug!("Read chunk of {} frame(s)", take / channels);
        Ok(take / channels)
    }
}
