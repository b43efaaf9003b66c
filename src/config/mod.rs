//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments
//!
//! Only the surroundings of the glide are configurable (logging, the
//! virtual pointer, the motion source, path output). Window, gate and
//! decay tuning are fixed constants in [`crate::momentum`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod types;

pub use types::{InputConfig, InputSource, LoggingConfig, OutputConfig, PointerConfig};

use crate::momentum::Point;
use crate::pointer::ScreenBounds;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Virtual pointer configuration
    #[serde(default)]
    pub pointer: PointerConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Default config file location (`<config_dir>/cursor-momentum/config.toml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cursor-momentum")
            .join("config.toml")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        let max_side = i32::MAX as u32;
        if self.pointer.screen_width == 0
            || self.pointer.screen_height == 0
            || self.pointer.screen_width > max_side
            || self.pointer.screen_height > max_side
        {
            anyhow::bail!(
                "Invalid screen size: {}x{}",
                self.pointer.screen_width,
                self.pointer.screen_height
            );
        }

        if !self.screen_bounds().contains(self.start_position()) {
            anyhow::bail!(
                "Pointer start ({}, {}) is outside the {}x{} screen",
                self.pointer.start_x,
                self.pointer.start_y,
                self.pointer.screen_width,
                self.pointer.screen_height
            );
        }

        if self.input.source == InputSource::Trace && self.input.trace_path.is_none() {
            anyhow::bail!("Input source 'trace' requires input.trace_path");
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        source: Option<InputSource>,
        trace_path: Option<PathBuf>,
        path_file: Option<PathBuf>,
    ) -> Self {
        if let Some(trace_path) = trace_path {
            self.input.trace_path = Some(trace_path);
            // A trace on the command line implies replaying it
            self.input.source = InputSource::Trace;
        }

        if let Some(source) = source {
            self.input.source = source;
        }

        if let Some(path_file) = path_file {
            self.output.path_file = Some(path_file);
        }

        self
    }

    /// Screen the virtual pointer lives on
    pub fn screen_bounds(&self) -> ScreenBounds {
        ScreenBounds::new(self.pointer.screen_width, self.pointer.screen_height)
    }

    /// Initial virtual pointer position
    pub fn start_position(&self) -> Point {
        Point::new(self.pointer.start_x, self.pointer.start_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.input.source, InputSource::Stdin);
        assert_eq!(config.start_position(), Point::new(960, 540));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[pointer]
screen_width = 2560
screen_height = 1440

[input]
source = "trace"
trace_path = "/tmp/flick.jsonl"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.pointer.screen_width, 2560);
        assert_eq!(config.pointer.start_x, 960);
        assert_eq!(config.input.source, InputSource::Trace);
        assert_eq!(config.input.linger_ms, 1000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/cursor-momentum.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_validation_invalid_level() {
        let mut config = Config::default_config();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_format() {
        let mut config = Config::default_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_start_off_screen() {
        let mut config = Config::default_config();
        config.pointer.start_x = 1920;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_screen_size() {
        let mut config = Config::default_config();
        config.pointer.screen_width = 3_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid screen size"));

        config.pointer.screen_width = i32::MAX as u32;
        assert!(config.validate().is_ok());

        config.pointer.screen_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_trace_needs_path() {
        let mut config = Config::default_config();
        config.input.source = InputSource::Trace;
        assert!(config.validate().is_err());

        config.input.trace_path = Some(PathBuf::from("flick.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default_config().with_overrides(
            None,
            Some(PathBuf::from("flick.jsonl")),
            Some(PathBuf::from("path.jsonl")),
        );
        assert_eq!(config.input.source, InputSource::Trace);
        assert_eq!(config.output.path_file, Some(PathBuf::from("path.jsonl")));

        let config = config.with_overrides(Some(InputSource::Stdin), None, None);
        assert_eq!(config.input.source, InputSource::Stdin);
    }

    #[test]
    fn test_input_source_parse() {
        assert_eq!("TRACE".parse::<InputSource>().unwrap(), InputSource::Trace);
        assert_eq!("-".parse::<InputSource>().unwrap(), InputSource::Stdin);
        assert!("usb".parse::<InputSource>().is_err());
    }
}
