//! Pointer event types.

use serde::{Deserialize, Serialize};

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (draws with / picks into the primary color)
    #[default]
    Left,
    /// Right mouse button (draws with / picks into the secondary color)
    Right,
    /// Middle mouse button (currently unused)
    Middle,
}
