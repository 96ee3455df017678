//! Rendering primitives and shape definitions (Cairo-based).
//!
//! This module defines the core drawing types:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Shape`]: Geometric primitives (lines, boxes, polygons, strokes, text)
//! - [`Raster`]: The pixel buffer shapes are committed into
//! - Rendering functions for Cairo-based output

pub mod color;
pub mod font;
pub mod raster;
pub mod render;
pub mod shape;

// Re-export commonly used types at module level
pub use color::Color;
pub use font::FontDescriptor;
pub use raster::{Raster, RasterError};
pub use render::{render_selection_outline, render_shape, render_text};
pub use shape::{Paint, Shape};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, WHITE, YELLOW};
