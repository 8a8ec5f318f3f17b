use std::path::Path;

use plotters::prelude::*;

use super::{LineSink, PlotBounds, Renderer};
use crate::error::{Result, WaveformError};
use crate::waveform::geometry::LinePrimitive;
use crate::waveform::ReductionMode;

/// Rasterizes columns to a PNG through plotters' bitmap backend.
pub struct RasterRenderer {
    lines: Vec<LinePrimitive>,
    pitch: f64,
    mode: ReductionMode,
    canvas_height: u32,
    pixels_per_column: u32,
    envelope_margin: f64,
}

fn plot_err<E: std::fmt::Display>(err: E) -> WaveformError {
    WaveformError::Plot(err.to_string())
}

impl RasterRenderer {
    pub fn new(
        pitch: f64,
        mode: ReductionMode,
        canvas_height: u32,
        pixels_per_column: u32,
        envelope_margin: f64,
    ) -> Self {
        Self {
            lines: Vec::new(),
            pitch: if pitch > 0.0 { pitch } else { 1.0 },
            mode,
            canvas_height: canvas_height.max(1),
            pixels_per_column: pixels_per_column.max(1),
            envelope_margin,
        }
    }

    /// Image size in pixels; never zero wide.
    pub fn image_size(&self) -> (u32, u32) {
        let width = (self.pixels_per_column as usize * self.lines.len()).max(1);
        (width.min(u32::MAX as usize) as u32, self.canvas_height)
    }

    /// Visible x range in column units.
    pub fn horizontal_range(&self) -> (f64, f64) {
        (0.0, self.lines.len().max(1) as f64)
    }

    /// Visible y range for the observed column bounds.
    pub fn vertical_range(&self, bounds: &PlotBounds) -> (f64, f64) {
        let (lo, hi) = match self.mode {
            ReductionMode::Direct => (bounds.lower.min(0.0), bounds.upper),
            ReductionMode::Windowed => (
                bounds.lower * self.envelope_margin,
                bounds.upper * self.envelope_margin,
            ),
        };
        if hi - lo > 0.0 {
            (lo, hi)
        } else {
            (lo, lo + 1.0)
        }
    }

    fn stroke_pixels(&self, line: &LinePrimitive) -> u32 {
        let px = self.pixels_per_column as f64 * line.stroke_width / self.pitch;
        (px.round() as u32).max(1)
    }
}

impl LineSink for RasterRenderer {
    fn push_line(&mut self, line: LinePrimitive) {
        self.lines.push(line);
    }
}

impl Renderer for RasterRenderer {
    fn finish(&mut self, bounds: &PlotBounds, path: &Path) -> Result<()> {
        let (width, height) = self.image_size();
        let (x_min, x_max) = self.horizontal_range();
        let (y_min, y_max) = self.vertical_range(bounds);

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(0)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(plot_err)?;

        let mut skipped = 0usize;
        for line in &self.lines {
            let c = line.color;
            let style = ShapeStyle {
                color: RGBAColor(c.r, c.g, c.b, c.a as f64 / 255.0),
                filled: false,
                stroke_width: self.stroke_pixels(line),
            };
            // centre of the column's slot
            let x = line.x1 / self.pitch + 0.5;
            let segment = PathElement::new(vec![(x, line.y1), (x, line.y2)], style);
            if let Err(err) = chart.draw_series(std::iter::once(segment)) {
                log::warn!("Skipping column at x={}: {}", line.x1, err);
                skipped += 1;
            }
        }

        root.present().map_err(plot_err)?;
        log::info!(
            "PNG {}x{} with {} line(s), {} skipped",
            width,
            height,
            self.lines.len() - skipped,
            skipped
        );
        Ok(())
    }
}
