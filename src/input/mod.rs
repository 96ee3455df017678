//! Input handling and tool state machine.
//!
//! This module translates pointer events into drawing actions. It holds the
//! active tool and its parameters, and the gesture state machine that turns
//! press/drag/release sequences into shapes.

pub mod events;
pub mod gesture;
pub mod tool;

// Re-export commonly used types at module level
pub use events::MouseButton;
pub use gesture::{FillMode, GestureInterpreter, GestureOutcome, GestureState, PaintSettings};
pub use tool::{MAX_POLYGON_SIDES, Tool, ToolChange, ToolChangeSignal, ToolMode, ToolParams, ToolState};
