use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use symphonia::core::codecs::{
    CodecType, CODEC_TYPE_PCM_ALAW, CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE, CODEC_TYPE_PCM_MULAW, CODEC_TYPE_PCM_S16BE,
    CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24BE, CODEC_TYPE_PCM_S24LE, CODEC_TYPE_PCM_S32BE,
    CODEC_TYPE_PCM_S32LE, CODEC_TYPE_PCM_S8, CODEC_TYPE_PCM_U8,
};

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
pub const WAVE_FORMAT_ALAW: u16 = 0x0006;
pub const WAVE_FORMAT_MULAW: u16 = 0x0007;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

const INTEGER_PCM: &[CodecType] = &[
    CODEC_TYPE_PCM_U8,
    CODEC_TYPE_PCM_S8,
    CODEC_TYPE_PCM_S16LE,
    CODEC_TYPE_PCM_S16BE,
    CODEC_TYPE_PCM_S24LE,
    CODEC_TYPE_PCM_S24BE,
    CODEC_TYPE_PCM_S32LE,
    CODEC_TYPE_PCM_S32BE,
];

const FLOAT_PCM: &[CodecType] = &[
    CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_F32BE,
    CODEC_TYPE_PCM_F64LE,
    CODEC_TYPE_PCM_F64BE,
];

/// WAVE format tag as stored in the container's `fmt ` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatTag {
    Pcm,
    IeeeFloat,
    ALaw,
    MuLaw,
    Extensible,
    Other(u16),
}

impl FormatTag {
    pub fn code(self) -> u16 {
        match self {
            FormatTag::Pcm => WAVE_FORMAT_PCM,
            FormatTag::IeeeFloat => WAVE_FORMAT_IEEE_FLOAT,
            FormatTag::ALaw => WAVE_FORMAT_ALAW,
            FormatTag::MuLaw => WAVE_FORMAT_MULAW,
            FormatTag::Extensible => WAVE_FORMAT_EXTENSIBLE,
            FormatTag::Other(code) => code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            WAVE_FORMAT_PCM => FormatTag::Pcm,
            WAVE_FORMAT_IEEE_FLOAT => FormatTag::IeeeFloat,
            WAVE_FORMAT_ALAW => FormatTag::ALaw,
            WAVE_FORMAT_MULAW => FormatTag::MuLaw,
            WAVE_FORMAT_EXTENSIBLE => FormatTag::Extensible,
            other => FormatTag::Other(other),
        }
    }

    /// Recover the tag from the codec the decoder picked. The decoder folds
    /// extensible headers into their sub-format, so `Extensible` never comes
    /// out of here.
    pub fn from_codec(codec: CodecType) -> Self {
        if INTEGER_PCM.contains(&codec) {
            FormatTag::Pcm
        } else if FLOAT_PCM.contains(&codec) {
            FormatTag::IeeeFloat
        } else if codec == CODEC_TYPE_PCM_ALAW {
            FormatTag::ALaw
        } else if codec == CODEC_TYPE_PCM_MULAW {
            FormatTag::MuLaw
        } else {
            FormatTag::Other(0)
        }
    }
}

impl Serialize for FormatTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

/// A missing duration reads as 0, matching `to_map`.
fn serialize_duration<S: Serializer>(duration: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.unwrap_or(0))
}

/// Stream metadata read once from the container header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AudioStreamInfo {
    #[serde(rename = "AudioFormat")]
    pub format_tag: FormatTag,
    #[serde(rename = "NumChannels")]
    pub channel_count: u32,
    #[serde(rename = "SampleRate")]
    pub sample_rate: u32,
    /// Milliseconds; `None` when the header does not declare a frame count.
    #[serde(rename = "Duration", serialize_with = "serialize_duration")]
    pub duration_millis: Option<u64>,
    #[serde(rename = "BitsPerSample")]
    pub bits_per_sample: u32,
}

impl AudioStreamInfo {
    /// Whole seconds of audio, never less than one.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.duration_millis.map(|ms| (ms / 1000).max(1))
    }

    /// Approximate frame count derived from the duration.
    pub fn approx_frames(&self) -> Option<u64> {
        self.duration_millis
            .map(|ms| ms * self.sample_rate as u64 / 1000)
    }

    /// The metadata mapping exposed to callers. A missing duration reads as 0.
    pub fn to_map(&self) -> BTreeMap<&'static str, u64> {
        let mut map = BTreeMap::new();
        map.insert("AudioFormat", self.format_tag.code() as u64);
        map.insert("NumChannels", self.channel_count as u64);
        map.insert("SampleRate", self.sample_rate as u64);
        map.insert("Duration", self.duration_millis.unwrap_or(0));
        map.insert("BitsPerSample", self.bits_per_sample as u64);
        map
    }
}
