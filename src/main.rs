mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use wavestrip::config::{self, WaveformConfig};
use wavestrip::{AudioStreamInfo, SampleSource, SymphoniaSource, Waveform};

/// Ticks a progress bar as frames are pulled from the decoder.
struct ProgressSource<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: SampleSource> SampleSource for ProgressSource<S> {
    fn info(&self) -> &AudioStreamInfo {
        self.inner.info()
    }

    fn next_chunk(&mut self, buf: &mut Vec<i32>, max_frames: usize) -> wavestrip::Result<usize> {
        let frames = self.inner.next_chunk(buf, max_frames)?;
        self.bar.inc(frames as u64);
        Ok(frames)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut cfg = match config::find_config(cli.config.clone()) {
        Some(path) => match config::load_config(&path) {
            Ok(file) => {
                log::info!("Loaded config from {}", path.display());
                file.waveform
            }
            Err(err) => {
                log::warn!("Failed to load config from {}: {}", path.display(), err);
                WaveformConfig::default()
            }
        },
        None => WaveformConfig::default(),
    };
    if let Some(style) = cli.style {
        cfg.style = style;
    }
    if cli.merge.is_some() {
        cfg.merge = cli.merge;
    }
    if let Some(density) = cli.density {
        cfg.base_density = density;
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    let source = SymphoniaSource::open(&cli.input)
        .with_context(|| format!("Failed to open audio file: {}", cli.input.display()))?;

    if cli.info {
        println!("{}", serde_json::to_string_pretty(source.info())?);
        return Ok(());
    }

    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Style: {:?}, merge: {:?}", cfg.style, cfg.merge_policy());

    let pb = ProgressBar::new(source.info().approx_frames().unwrap_or(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut waveform = Waveform::new(ProgressSource {
        inner: source,
        bar: pb.clone(),
    });
    let report = waveform
        .render(&cli.output, &cfg)
        .with_context(|| format!("Failed to render {}", cli.output.display()))?;

    pb.finish_and_clear();
    log::info!(
        "Done! {} column(s) from {} frame(s). Output: {}",
        report.summary.columns,
        report.summary.frames_read,
        cli.output.display()
    );
    Ok(())
}
