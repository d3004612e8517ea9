//! Encoder configuration
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, an optional TOML preset (`--config`), then explicit
//! command-line flags.
//!
//! ```toml
//! # oled-32.toml
//! width = 128
//! height = 32
//! fps = 12.5
//! serpentine = false
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::writer::fps_to_milli;

/// Default panel width in pixels
pub const DEFAULT_WIDTH: u32 = 128;

/// Default panel height in pixels
pub const DEFAULT_HEIGHT: u32 = 64;

/// Source frame rate assumed when the input does not declare one
pub const DEFAULT_SOURCE_FPS: f64 = 30.0;

/// Monoreel encoder
///
/// Converts an animated GIF, a directory of images or a single image into
/// a dithered 1-bit stream for SSD1306 panels.
#[derive(Debug, Parser)]
#[command(name = "monoreel-encode")]
#[command(version)]
#[command(about = "Convert animations into SSD1306 movie streams")]
pub struct Args {
    /// Animated GIF, directory of images, or a single image
    pub input: PathBuf,

    /// Output stream file
    pub output: PathBuf,

    /// Panel width in pixels [default: 128]
    #[arg(long)]
    pub width: Option<u32>,

    /// Panel height in pixels, a multiple of 8 [default: 64]
    #[arg(long)]
    pub height: Option<u32>,

    /// Target frame rate (defaults to the source rate)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Frame rate of the input when it does not carry one [default: 30]
    #[arg(long)]
    pub source_fps: Option<f64>,

    /// Invert pixels after dithering and flag the stream as inverted
    #[arg(long)]
    pub invert: bool,

    /// Scan every row left to right during dithering
    #[arg(long)]
    pub no_serpentine: bool,

    /// Write preview PNGs (preview_00000.png, ...) into this directory
    #[arg(long, value_name = "DIR")]
    pub preview: Option<PathBuf>,

    /// Write frames only, with no header
    #[arg(long)]
    pub raw: bool,

    /// TOML preset with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Settings loaded from a preset file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub source_fps: Option<f64>,
    pub invert: Option<bool>,
    pub serpentine: Option<bool>,
    pub raw: Option<bool>,
    pub preview: Option<PathBuf>,
}

impl Preset {
    /// Load a preset from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a preset from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Resolved encoder settings
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSettings {
    pub width: u32,
    pub height: u32,
    /// Target frame rate; `None` keeps the source rate
    pub fps: Option<f64>,
    /// Source frame rate override
    pub source_fps: Option<f64>,
    pub invert: bool,
    pub serpentine: bool,
    pub raw: bool,
    pub preview: Option<PathBuf>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: None,
            source_fps: None,
            invert: false,
            serpentine: true,
            raw: false,
            preview: None,
        }
    }
}

impl EncodeSettings {
    /// Resolve settings from command-line arguments and their preset
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let preset = match &args.config {
            Some(path) => Preset::load(path)?,
            None => Preset::default(),
        };
        let settings = Self::default().with_preset(&preset).with_args(args);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply the values a preset sets
    pub fn with_preset(mut self, preset: &Preset) -> Self {
        self.width = preset.width.unwrap_or(self.width);
        self.height = preset.height.unwrap_or(self.height);
        self.fps = preset.fps.or(self.fps);
        self.source_fps = preset.source_fps.or(self.source_fps);
        self.invert = preset.invert.unwrap_or(self.invert);
        self.serpentine = preset.serpentine.unwrap_or(self.serpentine);
        self.raw = preset.raw.unwrap_or(self.raw);
        self.preview = preset.preview.clone().or(self.preview);
        self
    }

    /// Apply explicit command-line flags
    ///
    /// Boolean flags can only switch a behavior on, so an unset flag keeps
    /// the preset's value.
    pub fn with_args(mut self, args: &Args) -> Self {
        self.width = args.width.unwrap_or(self.width);
        self.height = args.height.unwrap_or(self.height);
        self.fps = args.fps.or(self.fps);
        self.source_fps = args.source_fps.or(self.source_fps);
        self.invert |= args.invert;
        self.serpentine &= !args.no_serpentine;
        self.raw |= args.raw;
        self.preview = args.preview.clone().or(self.preview);
        self
    }

    /// Check settings before any encoding work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.height % 8 != 0 {
            return Err(ConfigError::HeightNotPageAligned(self.height));
        }
        for dim in [self.width, self.height] {
            if dim > u16::MAX as u32 {
                return Err(ConfigError::DimensionTooLarge(dim));
            }
        }
        for (name, value) in [("fps", self.fps), ("source fps", self.source_fps)] {
            if let Some(value) = value {
                // The header stores thousandths; a rate that rounds to zero
                // would play at the device default instead
                if !value.is_finite() || fps_to_milli(value) == 0 {
                    return Err(ConfigError::InvalidFps { name, value });
                }
            }
        }
        Ok(())
    }
}
