pub mod raster;
pub mod svg;

use std::path::Path;

use crate::config::WaveformConfig;
use crate::error::{Result, WaveformError};
use crate::waveform::geometry::LinePrimitive;
use crate::waveform::RenderPlan;

/// Accepts finished strokes in increasing x order.
pub trait LineSink {
    fn push_line(&mut self, line: LinePrimitive);
}

impl LineSink for Vec<LinePrimitive> {
    fn push_line(&mut self, line: LinePrimitive) {
        self.push(line);
    }
}

/// Vertical range of all columns, in drawing units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlotBounds {
    pub lower: f64,
    pub upper: f64,
}

/// A line sink that writes an image file once the stream is done.
pub trait Renderer: LineSink {
    fn finish(&mut self, bounds: &PlotBounds, path: &Path) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(WaveformError::UnsupportedOutput(path.display().to_string())),
        }
    }
}

pub fn create_renderer(format: OutputFormat, config: &WaveformConfig, plan: &RenderPlan) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Svg => Box::new(svg::SvgRenderer::new()),
        OutputFormat::Png => Box::new(raster::RasterRenderer::new(
            plan.layout.pitch(),
            plan.mode,
            config.canvas_height,
            config.pixels_per_column,
            config.envelope_margin,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.svg")).unwrap(), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("wave.PNG")).unwrap(), OutputFormat::Png);
        assert!(matches!(
            OutputFormat::from_path(Path::new("wave.jpg")),
            Err(WaveformError::UnsupportedOutput(_))
        ));
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }
}
