pub mod density;
pub mod engine;
pub mod geometry;

use std::path::Path;

use crate::audio::decode::SymphoniaSource;
use crate::audio::info::AudioStreamInfo;
use crate::audio::source::SampleSource;
use crate::config::WaveformConfig;
use crate::error::{Result, WaveformError};
use crate::render::{self, LineSink, OutputFormat, PlotBounds};
use engine::{Reducer, ReducerParams, ReductionSummary};
use geometry::{ColumnMapper, Gradient, Layout, LinePlotter};

/// Column strategy of the reduction engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReductionMode {
    /// Every retained frame becomes a log-magnitude column.
    Direct,
    /// Retained frames are folded into (min, max) windows.
    Windowed,
}

/// Aggregate amplitude of one output column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnValue {
    Height(f64),
    Range { min: f64, max: f64 },
}

impl ColumnValue {
    /// (lowest, highest) value the column covers.
    pub fn extent(self) -> (f64, f64) {
        match self {
            ColumnValue::Height(h) => (h, h),
            ColumnValue::Range { min, max } => (min, max),
        }
    }
}

/// Receives finished columns in order.
pub trait ColumnSink {
    fn push_column(&mut self, value: ColumnValue);
}

impl ColumnSink for Vec<ColumnValue> {
    fn push_column(&mut self, value: ColumnValue) {
        self.push(value);
    }
}

/// Everything fixed before the pass starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPlan {
    pub columns_per_second: u32,
    pub expected_columns: u64,
    pub mode: ReductionMode,
    pub layout: Layout,
    pub gradient: Gradient,
    pub reducer: ReducerParams,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderReport {
    pub plan: RenderPlan,
    pub summary: ReductionSummary,
    /// Column range in drawing units.
    pub bounds: PlotBounds,
}

/// Owns an audio stream and turns it into a waveform image.
pub struct Waveform<S> {
    source: S,
}

impl Waveform<SymphoniaSource> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(SymphoniaSource::open(path)?))
    }
}

impl<S: SampleSource> Waveform<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn info(&self) -> &AudioStreamInfo {
        self.source.info()
    }

    /// Work out density, spacing and palette from the stream header.
    pub fn plan(&self, config: &WaveformConfig) -> Result<RenderPlan> {
        let info = self.source.info();
        let duration_millis = info.duration_millis.ok_or(WaveformError::DurationUnavailable)?;
        let seconds = info.duration_seconds().unwrap_or(1);

        let columns_per_second = density::columns_per_second(duration_millis, config.base_density);
        let expected_columns = columns_per_second as u64 * seconds;
        let mode = config.mode();

        Ok(RenderPlan {
            columns_per_second,
            expected_columns,
            mode,
            layout: config.layout(columns_per_second),
            gradient: Gradient::new(config.start_color.into(), config.end_color.into(), expected_columns),
            reducer: ReducerParams {
                columns_per_second,
                mode,
                policy: config.merge_policy(),
                envelope_resolution: config.envelope_resolution,
                min_chunk_frames: config.min_chunk_frames,
            },
        })
    }

    /// Stream the whole file once, pushing one line per column into `sink`.
    pub fn stream_lines<L: LineSink + ?Sized>(
        &mut self,
        config: &WaveformConfig,
        sink: &mut L,
    ) -> Result<RenderReport> {
        let plan = self.plan(config)?;
        self.execute(plan, sink)
    }

    /// Render to `output`; the extension picks SVG or PNG.
    pub fn render(&mut self, output: &Path, config: &WaveformConfig) -> Result<RenderReport> {
        let format = OutputFormat::from_path(output)?;
        let plan = self.plan(config)?;

        log::info!(
            "Rendering {:?} at {} column(s)/s (~{} columns), pitch {}",
            format,
            plan.columns_per_second,
            plan.expected_columns,
            plan.layout.pitch()
        );

        let mut renderer = render::create_renderer(format, config, &plan);
        let report = self.execute(plan, renderer.as_mut())?;
        renderer.finish(&report.bounds, output)?;

        log::info!(
            "Wrote {} column(s) to {}",
            report.summary.columns,
            output.display()
        );
        Ok(report)
    }

    fn execute<L: LineSink + ?Sized>(&mut self, plan: RenderPlan, sink: &mut L) -> Result<RenderReport> {
        let mapper = ColumnMapper::new(plan.layout, plan.gradient);
        let mut plotter = LinePlotter::new(mapper, sink);
        let summary = Reducer::new(plan.reducer).run(&mut self.source, &mut plotter)?;
        let bounds = plan.layout.scale_bounds(plan.mode, summary.lower, summary.upper);

        if summary.columns != plan.expected_columns {
            log::debug!(
                "Column count {} differs from gradient estimate {}",
                summary.columns,
                plan.expected_columns
            );
        }

        Ok(RenderReport {
            plan,
            summary,
            bounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::InterleavedSource;
    use crate::config::Style;
    use crate::render::svg::SvgRenderer;
    use geometry::LinePrimitive;

    #[test]
    fn plan_follows_duration() {
        let waveform = Waveform::new(InterleavedSource::new(1, 8000, 16, vec![0; 8000 * 10]));
        let plan = waveform.plan(&WaveformConfig::default()).unwrap();

        // 10s -> floor(log2(10)) = 3 -> 30 / 3
        assert_eq!(plan.columns_per_second, 10);
        assert_eq!(plan.expected_columns, 100);
        assert_eq!(plan.layout.stroke_width, 10.0);
        assert_eq!(plan.layout.pitch(), 20.0);
        assert_eq!(plan.mode, ReductionMode::Direct);
    }

    #[test]
    fn missing_duration_aborts_before_reading() {
        let source = InterleavedSource::new(2, 8000, 16, vec![5; 200]).with_duration(None);
        let mut waveform = Waveform::new(source);
        let mut lines: Vec<LinePrimitive> = Vec::new();

        let err = waveform.stream_lines(&WaveformConfig::default(), &mut lines).unwrap_err();
        assert!(matches!(err, WaveformError::DurationUnavailable));
        assert!(lines.is_empty());
    }

    #[test]
    fn envelope_style_streams_signed_ranges() {
        let samples: Vec<i32> = (0..8000).map(|i| if i % 2 == 0 { 400 } else { -400 }).collect();
        let mut waveform = Waveform::new(InterleavedSource::new(1, 8000, 16, samples));
        let config = WaveformConfig {
            style: Style::Envelope,
            envelope_resolution: 8,
            ..WaveformConfig::default()
        };
        let mut lines: Vec<LinePrimitive> = Vec::new();
        let report = waveform.stream_lines(&config, &mut lines).unwrap();

        assert_eq!(report.plan.mode, ReductionMode::Windowed);
        assert!(!lines.is_empty());
        assert_eq!(lines.len() as u64, report.summary.columns);
        assert!(lines.iter().all(|l| l.y1 < 0.0 && l.y2 > 0.0));
        assert_eq!((report.bounds.lower, report.bounds.upper), (-400.0, 400.0));
    }

    #[test]
    fn lines_feed_the_vector_renderer() {
        let mut waveform = Waveform::new(InterleavedSource::new(2, 8000, 16, vec![1000; 16000]));
        let mut svg = SvgRenderer::new();
        let report = waveform.stream_lines(&WaveformConfig::default(), &mut svg).unwrap();

        assert_eq!(report.summary.columns, 30);
        let mut out = Vec::new();
        svg.write_document(&mut out).unwrap();
        let doc = String::from_utf8(out).unwrap();
        assert_eq!(doc.matches("<line ").count(), 30);
    }
}
