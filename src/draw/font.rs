//! Font descriptor for text rendering.

/// Font configuration for the Text tool.
///
/// Carries the family and point size chosen when the tool is activated; the
/// same descriptor is used for the live preview and the committed text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "Comic Sans MS")
    pub family: String,

    /// Font size in points
    pub size: f64,
}

impl FontDescriptor {
    /// Creates a new font descriptor.
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Converts this font descriptor to a Pango font description string.
    ///
    /// Format: "Family Size", e.g. "Sans 12" or "Sans 10.5".
    pub fn to_pango_string(&self) -> String {
        format!("{} {}", self.family, self.size)
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::new("Sans", 12.0)
    }
}
