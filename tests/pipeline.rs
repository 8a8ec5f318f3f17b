use std::path::{Path, PathBuf};

use wavestrip::render::svg::SvgRenderer;
use wavestrip::waveform::geometry::LinePrimitive;
use wavestrip::{
    AudioStreamInfo, FormatTag, InterleavedSource, SampleSource, Style, Waveform, WaveformConfig,
    WaveformError,
};

fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize, sample: impl Fn(usize) -> i16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        for _ in 0..channels {
            writer.write_sample(sample(i)).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn constant_stereo(dir: &Path) -> PathBuf {
    let input = dir.join("constant.wav");
    write_wav(&input, 2, 8000, 8000, |_| 1000);
    input
}

#[test]
fn reads_header_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let input = constant_stereo(dir.path());

    let waveform = Waveform::open(&input).unwrap();
    let info = waveform.info();
    assert_eq!(info.format_tag, FormatTag::Pcm);
    assert_eq!(info.channel_count, 2);
    assert_eq!(info.sample_rate, 8000);
    assert_eq!(info.bits_per_sample, 16);
    assert_eq!(info.duration_millis, Some(1000));

    let map = info.to_map();
    assert_eq!(map["AudioFormat"], 1);
    assert_eq!(map["Duration"], 1000);
}

#[test]
fn decoded_samples_keep_native_scale() {
    let dir = tempfile::tempdir().unwrap();
    let input = constant_stereo(dir.path());

    let mut waveform = Waveform::open(&input).unwrap();
    let mut lines: Vec<LinePrimitive> = Vec::new();
    let report = waveform.stream_lines(&WaveformConfig::default(), &mut lines).unwrap();

    // 1s at 30 columns/s -> stride 267 -> 30 retained frames
    assert_eq!(report.summary.frames_read, 8000);
    assert_eq!(lines.len(), 30);
    let expected = 1000f64.log2() * 10.0;
    for line in &lines {
        assert!((line.y1 - expected).abs() < 1e-9, "y1 = {}", line.y1);
        assert_eq!(line.y2, 0.0);
    }
    for pair in lines.windows(2) {
        assert_eq!(pair[1].x1 - pair[0].x1, report.plan.layout.pitch());
    }
}

#[test]
fn renders_svg_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = constant_stereo(dir.path());
    let output = dir.path().join("wave.svg");

    let mut waveform = Waveform::open(&input).unwrap();
    let report = waveform.render(&output, &WaveformConfig::default()).unwrap();
    assert_eq!(report.summary.columns, 30);

    let doc = std::fs::read_to_string(&output).unwrap();
    assert!(doc.starts_with("<?xml"));
    assert!(doc.contains("<svg "));
    assert!(doc.contains("scale(1, -1)"));
    assert_eq!(doc.matches("<line ").count(), 30);
    // 29 pitches of 60 plus the last 30-wide stroke
    assert!(doc.contains(r#"width="1770""#));
}

#[test]
fn renders_envelope_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sine.wav");
    write_wav(&input, 1, 8000, 16000, |i| {
        ((i as f64 / 8000.0 * 220.0 * std::f64::consts::TAU).sin() * 12000.0) as i16
    });
    let output = dir.path().join("wave.png");

    let config = WaveformConfig {
        style: Style::Envelope,
        ..WaveformConfig::default()
    };
    let mut waveform = Waveform::open(&input).unwrap();
    let report = waveform.render(&output, &config).unwrap();

    assert!(report.summary.columns > 0);
    assert!(report.bounds.lower < -10000.0);
    assert!(report.bounds.upper > 10000.0);
    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn empty_stream_renders_minimal_svg() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.wav");
    write_wav(&input, 2, 8000, 0, |_| 0);

    let mut waveform = Waveform::open(&input).unwrap();
    let mut svg = SvgRenderer::new();
    let report = waveform.stream_lines(&WaveformConfig::default(), &mut svg).unwrap();

    assert_eq!(report.summary.columns, 0);
    assert_eq!(svg.line_count(), 0);
    assert_eq!(svg.canvas_size(), (0.0, 0.0));
}

#[test]
fn unsupported_output_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = constant_stereo(dir.path());
    let output = dir.path().join("wave.gif");

    let mut waveform = Waveform::open(&input).unwrap();
    let err = waveform.render(&output, &WaveformConfig::default()).unwrap_err();
    assert!(matches!(err, WaveformError::UnsupportedOutput(_)));
    assert!(!output.exists());
}

#[test]
fn garbage_input_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("noise.wav");
    std::fs::write(&input, b"this is not a riff file at all").unwrap();

    match Waveform::open(&input) {
        Err(WaveformError::Decode(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("garbage decoded"),
    }
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Waveform::open(&dir.path().join("absent.wav"));
    assert!(matches!(result, Err(WaveformError::Io(_))));
}

/// Serves one chunk of audio, then fails like a decoder hitting a bad read.
struct BreaksAfterFirstChunk {
    inner: InterleavedSource,
    served: bool,
}

impl SampleSource for BreaksAfterFirstChunk {
    fn info(&self) -> &AudioStreamInfo {
        self.inner.info()
    }

    fn next_chunk(&mut self, buf: &mut Vec<i32>, max_frames: usize) -> wavestrip::Result<usize> {
        if self.served {
            return Err(WaveformError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "read failed mid-stream",
            )));
        }
        self.served = true;
        self.inner.next_chunk(buf, max_frames.min(100))
    }
}

#[test]
fn mid_stream_failure_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["wave.svg", "wave.png"] {
        let output = dir.path().join(name);
        let mut waveform = Waveform::new(BreaksAfterFirstChunk {
            inner: InterleavedSource::new(2, 8000, 16, vec![1000; 8000 * 2]),
            served: false,
        });

        let result = waveform.render(&output, &WaveformConfig::default());
        assert!(matches!(result, Err(WaveformError::Io(_))), "{}: {:?}", name, result.err());
        assert!(!output.exists(), "{} was written", name);
    }
}
