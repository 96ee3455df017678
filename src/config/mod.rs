//! Configuration file support for rasterpad.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/rasterpad/config.toml`. Settings include the initial paint state,
//! canvas size, undo depth, auto-save and the tool-change log.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{ColorSpec, SaveFormat};
pub use types::{AutosaveConfig, CanvasConfig, DrawingConfig, HistoryConfig, LoggingConfig};

use crate::canvas::{AutoSaveSink, MAX_CANVAS_EDGE, MAX_ZOOM};
use crate::input::{MAX_POLYGON_SIDES, ToolParams};
use crate::tasks::TaskOptions;
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// primary_color = "red"
/// secondary_color = [0, 0, 255]
/// line_width = 3.0
///
/// [canvas]
/// width = 1024
/// height = 768
///
/// [history]
/// max_depth = 32
///
/// [autosave]
/// enabled = true
/// interval_secs = 10
/// format = "png"
///
/// [logging]
/// tool_log_path = "log.txt"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Paint state and tool parameters
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Canvas size, background and zoom
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Undo history bounds
    #[serde(default)]
    pub history: HistoryConfig,

    /// Periodic snapshots
    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// Tool-change log
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `line_width`: 0.5 - 100.0
    /// - `font_size`: 4.0 - 288.0
    /// - `polygon_sides`: 3 - 1000
    /// - `canvas.width`/`canvas.height`: 1 - 16384
    /// - `zoom`: 1 - 64
    /// - `interval_secs`, `poll_interval_ms`: at least 1
    fn validate_and_clamp(&mut self) {
        // Line width: 0.5 - 100.0
        if !(0.5..=100.0).contains(&self.drawing.line_width) {
            log::warn!(
                "Invalid line_width {:.1}, clamping to 0.5-100.0 range",
                self.drawing.line_width
            );
            self.drawing.line_width = if self.drawing.line_width.is_nan() {
                0.5
            } else {
                self.drawing.line_width.clamp(0.5, 100.0)
            };
        }

        // Font size: 4.0 - 288.0
        if !(4.0..=288.0).contains(&self.drawing.font_size) {
            log::warn!(
                "Invalid font_size {:.1}, clamping to 4.0-288.0 range",
                self.drawing.font_size
            );
            self.drawing.font_size = if self.drawing.font_size.is_nan() {
                12.0
            } else {
                self.drawing.font_size.clamp(4.0, 288.0)
            };
        }

        if self.drawing.font_family.trim().is_empty() {
            log::warn!("Empty font_family, falling back to 'Sans'");
            self.drawing.font_family = "Sans".to_string();
        }

        // Polygon sides: 3 - MAX_POLYGON_SIDES
        if !(3..=MAX_POLYGON_SIDES).contains(&self.drawing.polygon_sides) {
            log::warn!(
                "Invalid polygon_sides {}, clamping to 3-{} range",
                self.drawing.polygon_sides,
                MAX_POLYGON_SIDES
            );
            self.drawing.polygon_sides = self.drawing.polygon_sides.clamp(3, MAX_POLYGON_SIDES);
        }

        // Canvas size: 1 - 16384
        for (name, value) in [
            ("width", &mut self.canvas.width),
            ("height", &mut self.canvas.height),
        ] {
            if !(1..=MAX_CANVAS_EDGE).contains(&*value) {
                log::warn!(
                    "Invalid canvas {} {}, clamping to 1-{} range",
                    name,
                    value,
                    MAX_CANVAS_EDGE
                );
                *value = (*value).clamp(1, MAX_CANVAS_EDGE);
            }
        }

        // Zoom: 1 - MAX_ZOOM
        if !(1..=MAX_ZOOM).contains(&self.canvas.zoom) {
            log::warn!(
                "Invalid zoom {}, clamping to 1-{} range",
                self.canvas.zoom,
                MAX_ZOOM
            );
            self.canvas.zoom = self.canvas.zoom.clamp(1, MAX_ZOOM);
        }

        if self.autosave.interval_secs == 0 {
            log::warn!("Invalid autosave interval_secs 0, using 1");
            self.autosave.interval_secs = 1;
        }

        if self.logging.poll_interval_ms == 0 {
            log::warn!("Invalid poll_interval_ms 0, using 1");
            self.logging.poll_interval_ms = 1;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/rasterpad/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("rasterpad");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates the configuration at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default location.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Serializes the configuration as TOML to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Background task settings derived from `[autosave]` and `[logging]`.
    pub fn task_options(&self) -> TaskOptions {
        TaskOptions {
            autosave_interval: self
                .autosave
                .enabled
                .then_some(self.autosave.interval_secs),
            countdown_tick: Duration::from_secs(1),
            tool_log_path: Some(self.logging.tool_log_path.clone()),
            poll_interval: Duration::from_millis(self.logging.poll_interval_ms),
        }
    }

    /// Destination for auto-save snapshots.
    pub fn autosave_sink(&self) -> AutoSaveSink {
        AutoSaveSink::new(
            crate::util::expand_tilde(&self.autosave.directory),
            self.autosave.filename_template.clone(),
            self.autosave.format.extension(),
        )
    }

    /// Polygon tool parameters from `[drawing]`.
    pub fn polygon_params(&self) -> ToolParams {
        ToolParams::Polygon {
            sides: self.drawing.polygon_sides.to_string(),
        }
    }
}
