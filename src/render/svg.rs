use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::{LineSink, PlotBounds, Renderer};
use crate::error::Result;
use crate::waveform::geometry::LinePrimitive;

/// Running extent of everything drawn so far. Starts at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct BoundingBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BoundingBox {
    fn include(&mut self, line: &LinePrimitive) {
        for x in [line.x1, line.x2] {
            self.min_x = self.min_x.min(x);
            self.max_x = self.max_x.max(x);
        }
        for y in [line.y1, line.y2] {
            self.min_y = self.min_y.min(y);
            self.max_y = self.max_y.max(y);
        }
    }
}

/// Builds an SVG document with one `<line>` per column.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    body: String,
    bounds: BoundingBox,
    last_width: f64,
    lines: usize,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Declared canvas (width, height). The width is padded by the last
    /// stroke so the final line is not clipped.
    pub fn canvas_size(&self) -> (f64, f64) {
        let b = &self.bounds;
        (b.max_x - b.min_x + self.last_width, b.max_y - b.min_y)
    }

    pub fn write_document<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let (width, height) = self.canvas_size();
        // flip y so amplitude grows upward, shift x by half a stroke
        let tx = self.last_width / 2.0 - self.bounds.min_x;
        let ty = self.bounds.max_y;

        writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            w,
            r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
            num(width),
            num(height)
        )?;
        writeln!(w, r#"<g transform="scale(1, -1) translate({}, {})">"#, num(tx), num(-ty))?;
        w.write_all(self.body.as_bytes())?;
        writeln!(w, "</g>")?;
        writeln!(w, "</svg>")?;
        Ok(())
    }
}

impl LineSink for SvgRenderer {
    fn push_line(&mut self, line: LinePrimitive) {
        let c = line.color;
        // writing to a String cannot fail
        let _ = writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" style="stroke:rgba({},{},{},{});stroke-width:{}"/>"#,
            num(line.x1),
            num(line.y1),
            num(line.x2),
            num(line.y2),
            c.r,
            c.g,
            c.b,
            num(c.a as f64 / 255.0),
            num(line.stroke_width)
        );
        self.bounds.include(&line);
        self.last_width = line.stroke_width;
        self.lines += 1;
    }
}

impl Renderer for SvgRenderer {
    fn finish(&mut self, _bounds: &PlotBounds, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_document(&mut out)?;
        out.flush()?;
        log::info!(
            "SVG canvas {}x{} with {} line(s)",
            num(self.canvas_size().0),
            num(self.canvas_size().1),
            self.lines
        );
        Ok(())
    }
}

/// Integers print bare, everything else with at most three decimals.
fn num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.3}", v);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" { "0".to_string() } else { s.to_string() }
    }
}
