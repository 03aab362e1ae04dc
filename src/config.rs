use crate::render::Rgb;
use crate::snow::SnowConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "snowfall", version, about = "Layered falling-snow animation for the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Flake count for a 1920x1080 viewport; scales with area up to 1.5x.
    #[arg(long, default_value_t = 5000)]
    pub flakes: usize,

    /// Device pixels per logical pixel (capped at 2).
    #[arg(long, default_value_t = 1.0)]
    pub device_scale: f32,

    /// Logical pixels per terminal cell, used when the terminal does not
    /// report its window size in pixels.
    #[arg(long, default_value_t = 8.0)]
    pub cell_width: f32,

    #[arg(long, default_value_t = 16.0)]
    pub cell_height: f32,

    #[arg(long, default_value_t = 150)]
    pub resize_debounce_ms: u64,

    #[arg(long, default_value = "0b1020")]
    pub background: Rgb,

    /// Override the stored on/off preference for this run.
    #[arg(long, action = clap::ArgAction::Set)]
    pub snow: Option<bool>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long)]
    pub prefs_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl RendererMode {
    /// Renderer dots per terminal cell (columns, rows).
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            Self::Ascii => (1, 1),
            Self::HalfBlock => (1, 2),
            Self::Braille => (2, 4),
        }
    }
}

impl Config {
    pub fn snow_config(&self) -> SnowConfig {
        SnowConfig {
            base_count: self.flakes,
            resize_debounce: Duration::from_millis(self.resize_debounce_ms),
            seed: self.seed,
            ..SnowConfig::default()
        }
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps.max(1)))
    }
}
