//! Configuration type definitions.

use super::enums::{ColorSpec, SaveFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Drawing-related settings.
///
/// Controls the paint state and tool parameters the canvas starts with.
/// Users can change these values at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Left-button color - either a named color (red, green, blue, yellow, orange, pink, white, black)
    /// or an RGB array like `[255, 0, 0]` for red
    #[serde(default = "default_primary_color")]
    pub primary_color: ColorSpec,

    /// Right-button color, also the fill color of left-button shapes in fill mode
    #[serde(default = "default_secondary_color")]
    pub secondary_color: ColorSpec,

    /// Stroke width in pixels (valid range: 0.5 - 100.0)
    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Font family for the text tool (e.g., "Sans", "Monospace")
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font size for the text tool in points (valid range: 4.0 - 288.0)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Side count offered by the polygon tool (3 - 1000)
    #[serde(default = "default_polygon_sides")]
    pub polygon_sides: u32,

    /// Fill closed shapes with the other button's color
    #[serde(default)]
    pub fill_shapes: bool,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            line_width: default_line_width(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            polygon_sides: default_polygon_sides(),
            fill_shapes: false,
        }
    }
}

/// Canvas dimensions and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Width of a new canvas in pixels (valid range: 1 - 16384)
    #[serde(default = "default_canvas_width")]
    pub width: i32,

    /// Height of a new canvas in pixels (valid range: 1 - 16384)
    #[serde(default = "default_canvas_height")]
    pub height: i32,

    /// Color a new canvas is filled with; the eraser paints this color
    #[serde(default = "default_background_color")]
    pub background_color: ColorSpec,

    /// Initial display zoom factor (1 - 64)
    #[serde(default = "default_zoom")]
    pub zoom: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            background_color: default_background_color(),
            zoom: default_zoom(),
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept; each step is a full raster copy.
    /// 0 keeps every step.
    #[serde(default = "default_history_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_history_depth(),
        }
    }
}

/// Periodic snapshot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AutosaveConfig {
    /// Write snapshots in the background
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between snapshots (minimum 1)
    #[serde(default = "default_autosave_interval")]
    pub interval_secs: u64,

    /// Directory snapshots are written to (supports `~/`)
    #[serde(default = "default_autosave_directory")]
    pub directory: String,

    /// Filename template with chrono format specifiers
    #[serde(default = "default_autosave_template")]
    pub filename_template: String,

    /// Snapshot image format
    #[serde(default)]
    pub format: SaveFormat,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_autosave_interval(),
            directory: default_autosave_directory(),
            filename_template: default_autosave_template(),
            format: SaveFormat::default(),
        }
    }
}

/// Tool-change log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// File tool switches are appended to
    #[serde(default = "default_tool_log_path")]
    pub tool_log_path: PathBuf,

    /// Poll interval of the tool-change watcher in milliseconds (minimum 1)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            tool_log_path: default_tool_log_path(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_primary_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_secondary_color() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_line_width() -> f64 {
    2.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_polygon_sides() -> u32 {
    5
}

fn default_canvas_width() -> i32 {
    800
}

fn default_canvas_height() -> i32 {
    600
}

fn default_background_color() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_zoom() -> u32 {
    1
}

fn default_history_depth() -> usize {
    64
}

fn default_autosave_interval() -> u64 {
    10
}

fn default_autosave_directory() -> String {
    dirs::picture_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("rasterpad")
        .to_string_lossy()
        .into_owned()
}

fn default_autosave_template() -> String {
    "autosave_%Y-%m-%d_%H%M%S".to_string()
}

fn default_tool_log_path() -> PathBuf {
    PathBuf::from("log.txt")
}

fn default_poll_interval() -> u64 {
    10
}
