//! Library exports for the rasterpad drawing engine.
//!
//! Exposes the engine (tool state machine, gesture interpreter, canvas and
//! history), the background tasks and the configuration types so the binary,
//! the schema dumper and integration tests share one implementation.

pub mod canvas;
pub mod config;
pub mod draw;
pub mod error;
pub mod input;
pub mod script;
pub mod tasks;
pub mod util;

pub use canvas::{CanvasManager, CanvasOptions};
pub use config::Config;
pub use error::{CanvasError, HistoryError, PersistenceError, TaskError, ValidationError};
