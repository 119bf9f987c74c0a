//! Render options and application configuration.
//!
//! This module provides:
//! - [`RenderOptions`]: the raw option bag, every field optional
//! - [`RenderConfig`]: the validated form, always complete
//! - [`AppConfig`]: TOML configuration loaded from `~/.ansiplay/config.toml`
//!
//! # Configuration File
//!
//! ```toml
//! # Default playback rate in bits per second
//! baud = 14400
//!
//! [render]
//! icecolors = 1
//! bits = "9"
//! font = "80x25"
//! rows = 26
//! "2J" = 1
//! ```
//!
//! Validation never fails. Any field that is missing or out of range takes
//! its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::font::DEFAULT_PRESET;

/// Columns used without metadata or override
pub const STREAM_COLUMNS: usize = 80;
/// Columns implied by the CED editor mode
pub const CED_COLUMNS: usize = 78;
/// Default surface height in rows
pub const DEFAULT_ROWS: usize = 26;
/// Largest accepted column count, from options or metadata
pub const MAX_COLUMNS: usize = 512;
/// Largest accepted row count
pub const MAX_ROWS: usize = 256;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Color depth / palette selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bits {
    #[default]
    Eight,
    Nine,
    Ced,
    Workbench,
}

impl Bits {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "8" => Some(Bits::Eight),
            "9" => Some(Bits::Nine),
            "ced" => Some(Bits::Ced),
            "workbench" => Some(Bits::Workbench),
            _ => None,
        }
    }
}

/// Raw render options as supplied by a caller or config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub icecolors: Option<i64>,
    pub bits: Option<String>,
    pub columns: Option<i64>,
    pub font: Option<String>,
    pub thumbnail: Option<i64>,
    #[serde(rename = "2x")]
    pub double: Option<i64>,
    pub imagedata: Option<i64>,
    pub rows: Option<i64>,
    #[serde(rename = "2J")]
    pub clear_screen: Option<i64>,
    pub filetype: Option<String>,
    pub mode: Option<String>,
}

impl RenderOptions {
    /// Fill every unset field of `self` from `base`
    pub fn or(self, base: &RenderOptions) -> RenderOptions {
        RenderOptions {
            icecolors: self.icecolors.or(base.icecolors),
            bits: self.bits.or_else(|| base.bits.clone()),
            columns: self.columns.or(base.columns),
            font: self.font.or_else(|| base.font.clone()),
            thumbnail: self.thumbnail.or(base.thumbnail),
            double: self.double.or(base.double),
            imagedata: self.imagedata.or(base.imagedata),
            rows: self.rows.or(base.rows),
            clear_screen: self.clear_screen.or(base.clear_screen),
            filetype: self.filetype.or_else(|| base.filetype.clone()),
            mode: self.mode.or_else(|| base.mode.clone()),
        }
    }
}

/// Validated render configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Blink degrades to bright backgrounds
    pub icecolors: bool,
    pub bits: Bits,
    /// Explicit column override; `None` lets the caller decide
    pub columns: Option<usize>,
    pub font: String,
    /// Thumbnail detail level, 0..=3
    pub thumbnail: u8,
    /// Output is meant for a double-density display
    pub double_density: bool,
    /// Raw buffer output instead of an encoded image
    pub image_data: bool,
    pub rows: usize,
    /// Whether `ESC[2J` clears the screen
    pub honor_clear_screen: bool,
    pub filetype: String,
    pub mode: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::validate(&RenderOptions::default())
    }
}

fn flag(name: &str, value: Option<i64>, default: bool) -> bool {
    match value {
        Some(0) => false,
        Some(1) => true,
        None => default,
        Some(other) => {
            tracing::debug!("Ignoring {} = {}, using {}", name, other, default as u8);
            default
        }
    }
}

/// Positive values only, clamped to `max`
fn positive(name: &str, value: Option<i64>, max: usize) -> Option<usize> {
    match value {
        Some(n) if n > 0 => {
            let n = usize::try_from(n).unwrap_or(usize::MAX);
            if n > max {
                tracing::debug!("Clamping {} = {} to {}", name, n, max);
            }
            Some(n.min(max))
        }
        Some(n) => {
            tracing::debug!("Ignoring {} = {}", name, n);
            None
        }
        None => None,
    }
}

impl RenderConfig {
    /// Total validation: every field falls back to its default
    pub fn validate(options: &RenderOptions) -> Self {
        let bits = match options.bits.as_deref() {
            Some(value) => Bits::parse(value).unwrap_or_else(|| {
                tracing::debug!("Ignoring bits = {:?}", value);
                Bits::Eight
            }),
            None => Bits::Eight,
        };

        let font = match options.font.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_PRESET.to_string(),
        };

        let thumbnail = match options.thumbnail {
            Some(level @ 0..=3) => level as u8,
            Some(level) => {
                tracing::debug!("Ignoring thumbnail = {}", level);
                0
            }
            None => 0,
        };

        Self {
            icecolors: flag("icecolors", options.icecolors, false),
            bits,
            columns: positive("columns", options.columns, MAX_COLUMNS),
            font,
            thumbnail,
            double_density: flag("2x", options.double, false),
            image_data: flag("imagedata", options.imagedata, false),
            rows: positive("rows", options.rows, MAX_ROWS).unwrap_or(DEFAULT_ROWS),
            honor_clear_screen: flag("2J", options.clear_screen, true),
            filetype: options.filetype.clone().unwrap_or_else(|| "ans".to_string()),
            mode: options.mode.clone(),
        }
    }

    /// Column count given the declared SAUCE columns
    pub fn stream_columns(&self, declared: Option<u16>) -> usize {
        if let Some(columns) = self.columns {
            return columns;
        }
        match declared {
            Some(n) if n > 0 => (n as usize).min(MAX_COLUMNS),
            _ if self.mode.as_deref() == Some("ced") => CED_COLUMNS,
            _ => STREAM_COLUMNS,
        }
    }
}

/// Application configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default playback rate in bits per second
    pub baud: Option<u32>,
    /// Render option defaults
    pub render: RenderOptions,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("{}", e),
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".ansiplay").join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert!(!config.icecolors);
        assert_eq!(config.bits, Bits::Eight);
        assert_eq!(config.columns, None);
        assert_eq!(config.font, "80x25");
        assert_eq!(config.thumbnail, 0);
        assert!(!config.double_density);
        assert!(!config.image_data);
        assert_eq!(config.rows, 26);
        assert!(config.honor_clear_screen);
        assert_eq!(config.filetype, "ans");
    }

    #[test]
    fn test_invalid_values_default() {
        let options = RenderOptions {
            icecolors: Some(2),
            bits: Some("16".to_string()),
            columns: Some(-4),
            font: Some(String::new()),
            thumbnail: Some(4),
            double: Some(-1),
            rows: Some(0),
            clear_screen: Some(7),
            ..Default::default()
        };
        assert_eq!(RenderConfig::validate(&options), RenderConfig::default());
    }

    #[test]
    fn test_valid_values_kept() {
        let options = RenderOptions {
            icecolors: Some(1),
            bits: Some("workbench".to_string()),
            columns: Some(132),
            thumbnail: Some(3),
            clear_screen: Some(0),
            rows: Some(50),
            ..Default::default()
        };
        let config = RenderConfig::validate(&options);
        assert!(config.icecolors);
        assert_eq!(config.bits, Bits::Workbench);
        assert_eq!(config.columns, Some(132));
        assert_eq!(config.thumbnail, 3);
        assert!(!config.honor_clear_screen);
        assert_eq!(config.rows, 50);
    }

    #[test]
    fn test_oversized_dimensions_clamped() {
        let options = RenderOptions {
            columns: Some(i64::MAX),
            rows: Some(i64::MAX),
            ..Default::default()
        };
        let config = RenderConfig::validate(&options);
        assert_eq!(config.columns, Some(MAX_COLUMNS));
        assert_eq!(config.rows, MAX_ROWS);
        assert_eq!(RenderConfig::default().stream_columns(Some(u16::MAX)), MAX_COLUMNS);
    }

    #[test]
    fn test_stream_columns() {
        let config = RenderConfig::default();
        assert_eq!(config.stream_columns(None), 80);
        assert_eq!(config.stream_columns(Some(0)), 80);
        assert_eq!(config.stream_columns(Some(132)), 132);

        let ced = RenderConfig::validate(&RenderOptions {
            mode: Some("ced".to_string()),
            ..Default::default()
        });
        assert_eq!(ced.stream_columns(None), 78);

        let forced = RenderConfig::validate(&RenderOptions {
            columns: Some(40),
            ..Default::default()
        });
        assert_eq!(forced.stream_columns(Some(132)), 40);
    }

    #[test]
    fn test_options_merge() {
        let file = RenderOptions {
            font: Some("80x50".to_string()),
            rows: Some(30),
            ..Default::default()
        };
        let cli = RenderOptions {
            rows: Some(40),
            ..Default::default()
        };
        let merged = cli.or(&file);
        assert_eq!(merged.font.as_deref(), Some("80x50"));
        assert_eq!(merged.rows, Some(40));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baud = 9600\n\n[render]\nicecolors = 1\n\"2J\" = 0\nfont = \"80x50\"").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.baud, Some(9600));
        assert_eq!(config.render.icecolors, Some(1));
        assert_eq!(config.render.clear_screen, Some(0));
        assert_eq!(config.render.font.as_deref(), Some("80x50"));
    }

    #[test]
    fn test_load_from_errors() {
        let missing = AppConfig::load_from(Path::new("/nonexistent/ansiplay.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baud = \"fast\"").unwrap();
        assert!(matches!(AppConfig::load_from(file.path()), Err(ConfigError::Parse(_))));
    }
}
