//! Error types for the drawing engine.
//!
//! Every error here is recoverable: the canvas stays usable after any of them.

use crate::draw::RasterError;
use crate::input::ToolMode;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed tool parameters or UI input. The previous state is kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} tool needs its parameters before it can be selected")]
    MissingParameters(ToolMode),

    #[error("Polygon side count '{0}' is not a whole number")]
    InvalidSideCount(String),

    #[error("Polygon needs at least 3 sides, got {0}")]
    TooFewSides(u32),

    #[error("Polygon side count {0} is above the maximum of {}", crate::input::tool::MAX_POLYGON_SIDES)]
    TooManySides(u32),

    #[error("Font size '{0}' is not a positive number")]
    InvalidFontSize(String),

    #[error("Font family must not be empty")]
    EmptyFontFamily,

    #[error("Text to draw must not be empty")]
    EmptyText,

    #[error("Zoom '{0}' is not a whole number between 1 and {}", crate::canvas::MAX_ZOOM)]
    InvalidZoom(String),

    #[error("Line width {0} must be a positive number")]
    InvalidLineWidth(f64),

    #[error("Canvas size {width}x{height} is out of range")]
    InvalidCanvasSize { width: i32, height: i32 },

    #[error("No file is open; choose a path to save to")]
    NoOpenedFile,
}

/// Failures of the image file adapter.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Image file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to decode {}: {source}", path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    EncodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image format for {} (use png, bmp or jpg)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Undo/redo requested with nothing on the respective stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Failures of the background tasks.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Shutdown arrived while a cycle was still running
    #[error("Background task interrupted")]
    Interrupted,

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start background runtime: {0}")]
    Startup(String),
}

/// Umbrella error returned by [`CanvasManager`](crate::canvas::CanvasManager) operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RasterError),
}

impl CanvasError {
    /// True for undo/redo on an empty stack, which callers report as a no-op.
    pub fn is_empty_history(&self) -> bool {
        matches!(self, CanvasError::History(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            ValidationError::InvalidSideCount("five".into()).to_string(),
            "Polygon side count 'five' is not a whole number"
        );
        assert_eq!(HistoryError::NothingToUndo.to_string(), "Nothing to undo");
        let err = PersistenceError::NotFound(PathBuf::from("/tmp/missing.png"));
        assert!(err.to_string().contains("/tmp/missing.png"));
    }

    #[test]
    fn history_errors_are_flagged_as_no_ops() {
        let err: CanvasError = HistoryError::NothingToRedo.into();
        assert!(err.is_empty_history());
        let err: CanvasError = ValidationError::EmptyText.into();
        assert!(!err.is_empty_history());
    }
}
