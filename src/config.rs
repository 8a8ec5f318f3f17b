use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::merge::MergePolicy;
use crate::error::{Result, WaveformError};
use crate::waveform::geometry::Layout;
use crate::waveform::ReductionMode;

/// Look of the waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// One-sided log-magnitude bars.
    #[default]
    Bars,
    /// Symmetric min/max outline.
    Envelope,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub waveform: WaveformConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WaveformConfig {
    #[serde(default = "default_start_color")]
    pub start_color: [u8; 4],
    #[serde(default = "default_end_color")]
    pub end_color: [u8; 4],
    /// Columns per second for recordings shorter than four seconds.
    #[serde(default = "default_base_density")]
    pub base_density: u32,
    /// Stroke width; defaults to the column density.
    #[serde(default)]
    pub stroke_width: Option<f64>,
    /// Gap between strokes; defaults to the column density.
    #[serde(default)]
    pub space: Option<f64>,
    #[serde(default = "default_log_scale")]
    pub log_scale: f64,
    #[serde(default = "default_envelope_scale")]
    pub envelope_scale: f64,
    /// Retained frames per envelope column.
    #[serde(default = "default_envelope_resolution")]
    pub envelope_resolution: usize,
    #[serde(default = "default_min_chunk_frames")]
    pub min_chunk_frames: usize,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_pixels_per_column")]
    pub pixels_per_column: u32,
    #[serde(default = "default_envelope_margin")]
    pub envelope_margin: f64,
    #[serde(default)]
    pub style: Style,
    /// Overrides the merge policy implied by `style`.
    #[serde(default)]
    pub merge: Option<MergePolicy>,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            start_color: default_start_color(),
            end_color: default_end_color(),
            base_density: default_base_density(),
            stroke_width: None,
            space: None,
            log_scale: default_log_scale(),
            envelope_scale: default_envelope_scale(),
            envelope_resolution: default_envelope_resolution(),
            min_chunk_frames: default_min_chunk_frames(),
            canvas_height: default_canvas_height(),
            pixels_per_column: default_pixels_per_column(),
            envelope_margin: default_envelope_margin(),
            style: Style::default(),
            merge: None,
        }
    }
}

fn default_start_color() -> [u8; 4] { [172, 185, 255, 255] }
fn default_end_color() -> [u8; 4] { [109, 129, 255, 255] }
fn default_base_density() -> u32 { 30 }
fn default_log_scale() -> f64 { 10.0 }
fn default_envelope_scale() -> f64 { 1.0 }
fn default_envelope_resolution() -> usize { 64 }
fn default_min_chunk_frames() -> usize { 4096 }
fn default_canvas_height() -> u32 { 540 }
fn default_pixels_per_column() -> u32 { 4 }
fn default_envelope_margin() -> f64 { 1.1 }

impl WaveformConfig {
    pub fn mode(&self) -> ReductionMode {
        match self.style {
            Style::Bars => ReductionMode::Direct,
            Style::Envelope => ReductionMode::Windowed,
        }
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge.unwrap_or(match self.style {
            Style::Bars => MergePolicy::AverageAbs,
            Style::Envelope => MergePolicy::MaxMagnitude,
        })
    }

    pub fn layout(&self, columns_per_second: u32) -> Layout {
        let derived = columns_per_second.max(1) as f64;
        Layout {
            stroke_width: self.stroke_width.unwrap_or(derived),
            space: self.space.unwrap_or(derived),
            log_scale: self.log_scale,
            envelope_scale: self.envelope_scale,
        }
    }
}

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| WaveformError::Config(e.to_string()))
}

/// Explicit path, else `wavestrip.toml` in the working directory, else the
/// per-user config file.
pub fn find_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let local = PathBuf::from("wavestrip.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("wavestrip").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("wavestrip").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        let cfg = file.waveform;
        assert_eq!(cfg.start_color, [172, 185, 255, 255]);
        assert_eq!(cfg.end_color, [109, 129, 255, 255]);
        assert_eq!(cfg.base_density, 30);
        assert_eq!(cfg.canvas_height, 540);
        assert_eq!(cfg.pixels_per_column, 4);
        assert_eq!(cfg.style, Style::Bars);
        assert_eq!(cfg.mode(), ReductionMode::Direct);
        assert_eq!(cfg.merge_policy(), MergePolicy::AverageAbs);
    }

    #[test]
    fn partial_table_overrides_only_named_fields() {
        let file: ConfigFile = toml::from_str(
            r#"
            [waveform]
            style = "envelope"
            end_color = [0, 0, 0, 255]
            stroke_width = 1.5
            "#,
        )
        .unwrap();
        let cfg = file.waveform;
        assert_eq!(cfg.end_color, [0, 0, 0, 255]);
        assert_eq!(cfg.start_color, [172, 185, 255, 255]);
        assert_eq!(cfg.mode(), ReductionMode::Windowed);
        assert_eq!(cfg.merge_policy(), MergePolicy::MaxMagnitude);

        let layout = cfg.layout(15);
        assert_eq!(layout.stroke_width, 1.5);
        assert_eq!(layout.space, 15.0);
        assert_eq!(layout.pitch(), 16.5);
    }

    #[test]
    fn merge_override_beats_style() {
        let file: ConfigFile = toml::from_str("[waveform]\nstyle = \"envelope\"\nmerge = \"average\"\n").unwrap();
        assert_eq!(file.waveform.merge_policy(), MergePolicy::AverageAbs);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[waveform]\nbase_density = \"lots\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(WaveformError::Config(_))));
    }

    #[test]
    fn explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/somewhere.toml");
        assert_eq!(find_config(Some(explicit.clone())), Some(explicit));
    }
}
