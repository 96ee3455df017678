//! Utility functions for colors and geometry.
//!
//! This module provides:
//! - Color name mapping used by configuration and scripts
//! - The axis-aligned [`Rect`] used for selections
//! - Drag-constraint helpers for squares, circles and polygons

use crate::draw::{Color, color::*};
use std::path::PathBuf;

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

/// Maps a Color value to its human-readable name.
///
/// Uses approximate matching (threshold-based) to identify colors.
/// Returns "Custom" if the color doesn't match any predefined color.
pub fn color_to_name(color: &Color) -> &'static str {
    if color.r > 0.9 && color.g < 0.1 && color.b < 0.1 {
        "Red"
    } else if color.r < 0.1 && color.g > 0.9 && color.b < 0.1 {
        "Green"
    } else if color.r < 0.1 && color.g < 0.1 && color.b > 0.9 {
        "Blue"
    } else if color.r > 0.9 && color.g > 0.9 && color.b < 0.1 {
        "Yellow"
    } else if color.r > 0.9 && (0.4..=0.6).contains(&color.g) && color.b < 0.1 {
        "Orange"
    } else if color.r > 0.9 && color.g < 0.1 && color.b > 0.9 {
        "Pink"
    } else if color.r > 0.9 && color.g > 0.9 && color.b > 0.9 {
        "White"
    } else if color.r < 0.1 && color.g < 0.1 && color.b < 0.1 {
        "Black"
    } else {
        "Custom"
    }
}

// ============================================================================
// Geometry Utilities
// ============================================================================

/// Axis-aligned rectangle used for selections and surface bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle. Width/height must be positive.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Builds a rectangle from min/max bounds (inclusive min, exclusive max).
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        let width = max_x.saturating_sub(min_x);
        let height = max_y.saturating_sub(min_y);
        Self::new(min_x, min_y, width, height)
    }

    /// Builds the rectangle spanned by two opposite corners dragged in any direction.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Self> {
        Self::from_min_max(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }

    /// Returns true when `(px, py)` lies inside (min inclusive, max exclusive).
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && px < self.x.saturating_add(self.width)
            && py >= self.y
            && py < self.y.saturating_add(self.height)
    }

    /// Clamps the rectangle to a `width` x `height` surface.
    ///
    /// Returns `None` when nothing of the rectangle remains on the surface.
    pub fn clamp_to_bounds(&self, width: i32, height: i32) -> Option<Rect> {
        let min_x = self.x.clamp(0, width);
        let min_y = self.y.clamp(0, height);
        let max_x = self.x.saturating_add(self.width).clamp(0, width);
        let max_y = self.y.saturating_add(self.height).clamp(0, height);
        Rect::from_min_max(min_x, min_y, max_x, max_y)
    }

    /// Returns true if rectangle has a positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Normalizes a drag into `(x, y, w, h)` with non-negative width and height.
///
/// Zero-sized drags are kept (a click produces a `0 x 0` box at the press point).
/// Extents that do not fit in an `i32` saturate.
pub fn drag_bounds(x1: i32, y1: i32, x2: i32, y2: i32) -> (i32, i32, i32, i32) {
    (x1.min(x2), y1.min(y2), span(x1, x2), span(y1, y2))
}

/// Distance between two coordinates, saturating at `i32::MAX`.
pub fn span(a: i32, b: i32) -> i32 {
    saturate((i64::from(b) - i64::from(a)).abs())
}

/// Narrows a wide coordinate to `i32`, saturating at the bounds.
pub fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Constrains the terminal point of a drag so the spanned box is square.
///
/// The side length comes from the dominant axis; the drag direction on each
/// axis is preserved (a zero delta counts as positive).
pub fn constrain_square(x1: i32, y1: i32, x2: i32, y2: i32) -> (i32, i32) {
    let (x1, y1) = (i64::from(x1), i64::from(y1));
    let dx = i64::from(x2) - x1;
    let dy = i64::from(y2) - y1;
    let side = dx.abs().max(dy.abs());
    let sx = if dx < 0 { -1 } else { 1 };
    let sy = if dy < 0 { -1 } else { 1 };
    (saturate(x1 + sx * side), saturate(y1 + sy * side))
}

/// Computes the vertices of a regular polygon.
///
/// `(cx, cy)` is the center; the first vertex sits at `radius` along
/// `start_angle` (radians) and the rest follow counter-clockwise.
pub fn polygon_vertices(
    cx: f64,
    cy: f64,
    radius: f64,
    sides: u32,
    start_angle: f64,
) -> Vec<(f64, f64)> {
    let step = std::f64::consts::TAU / sides as f64;
    (0..sides)
        .map(|i| {
            let angle = start_angle + step * i as f64;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

// ============================================================================
// Path Utilities
// ============================================================================

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
