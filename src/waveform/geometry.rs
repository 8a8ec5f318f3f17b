use super::{ColumnSink, ColumnValue, ReductionMode};
use crate::render::{LineSink, PlotBounds};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Linear two-point gradient stepped once per column.
///
/// The step is sized for an estimated column count. When the real count
/// differs the last column lands short of (or past) the end color; channels
/// are clamped to `[0, 255]` either way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    start: [f64; 4],
    step: [f64; 4],
}

impl Gradient {
    pub fn new(start: Rgba, end: Rgba, expected_columns: u64) -> Self {
        let n = expected_columns.max(1) as f64;
        let s = [start.r, start.g, start.b, start.a].map(f64::from);
        let e = [end.r, end.g, end.b, end.a].map(f64::from);
        Self {
            start: s,
            step: [
                (e[0] - s[0]) / n,
                (e[1] - s[1]) / n,
                (e[2] - s[2]) / n,
                (e[3] - s[3]) / n,
            ],
        }
    }

    /// Color of the `count`-th column, counting from 1.
    pub fn color_at(&self, count: u64) -> Rgba {
        let channel = |i: usize| {
            (self.start[i] + self.step[i] * count as f64).round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: channel(0),
            g: channel(1),
            b: channel(2),
            a: channel(3),
        }
    }
}

/// One vertical stroke per column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Rgba,
}

/// Horizontal spacing and vertical scaling of columns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub stroke_width: f64,
    pub space: f64,
    /// Drawing units per log2 unit (direct mode).
    pub log_scale: f64,
    /// Drawing units per sample unit (windowed mode).
    pub envelope_scale: f64,
}

impl Layout {
    pub fn pitch(&self) -> f64 {
        self.space + self.stroke_width
    }

    /// (y1, y2) of a column in drawing units.
    pub fn extent(&self, value: ColumnValue) -> (f64, f64) {
        match value {
            ColumnValue::Height(h) => (h * self.log_scale, 0.0),
            ColumnValue::Range { min, max } => (min * self.envelope_scale, max * self.envelope_scale),
        }
    }

    /// Convert the engine's running column range into drawing units.
    pub fn scale_bounds(&self, mode: ReductionMode, lower: f64, upper: f64) -> PlotBounds {
        let scale = match mode {
            ReductionMode::Direct => self.log_scale,
            ReductionMode::Windowed => self.envelope_scale,
        };
        let (a, b) = (lower * scale, upper * scale);
        PlotBounds {
            lower: a.min(b),
            upper: a.max(b),
        }
    }
}

pub struct ColumnMapper {
    layout: Layout,
    gradient: Gradient,
}

impl ColumnMapper {
    pub fn new(layout: Layout, gradient: Gradient) -> Self {
        Self { layout, gradient }
    }

    /// Map the column at zero-based `index` to its stroke.
    pub fn map_column(&self, value: ColumnValue, index: u64) -> LinePrimitive {
        let x = index as f64 * self.layout.pitch();
        let (y1, y2) = self.layout.extent(value);
        LinePrimitive {
            x1: x,
            y1,
            x2: x,
            y2,
            stroke_width: self.layout.stroke_width,
            color: self.gradient.color_at(index + 1),
        }
    }
}

/// Adapts the engine's column stream to a line sink, numbering columns as
/// they arrive.
pub struct LinePlotter<'a, L: LineSink + ?Sized> {
    mapper: ColumnMapper,
    sink: &'a mut L,
    next_index: u64,
}

impl<'a, L: LineSink + ?Sized> LinePlotter<'a, L> {
    pub fn new(mapper: ColumnMapper, sink: &'a mut L) -> Self {
        Self {
            mapper,
            sink,
            next_index: 0,
        }
    }

    pub fn lines_emitted(&self) -> u64 {
        self.next_index
    }
}

impl<L: LineSink + ?Sized> ColumnSink for LinePlotter<'_, L> {
    fn push_column(&mut self, value: ColumnValue) {
        let line = self.mapper.map_column(value, self.next_index);
        self.next_index += 1;
        self.sink.push_line(line);
    }
}
