//! Configuration enum types.

use crate::draw::{Color, RED};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Image format written by auto-save.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// Portable Network Graphics (lossless)
    #[default]
    Png,
    /// Windows bitmap (lossless, uncompressed)
    Bmp,
    /// JPEG (lossy, no alpha)
    Jpg,
}

impl SaveFormat {
    /// File extension, which also selects the encoder.
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Jpg => "jpg",
        }
    }
}

/// Color specification - either a named color or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// primary_color = "red"
///
/// # Custom RGB color (0-255 per component)
/// primary_color = [255, 128, 0]  # Orange
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: red, green, blue, yellow, orange, pink, white, black
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Named colors are mapped to predefined RGBA values using `util::name_to_color()`.
    /// Unknown color names default to red with a warning. RGB arrays are converted from
    /// 0-255 range to 0.0-1.0 range with full opacity.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => crate::util::name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using red", name);
                RED
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgba8(*r, *g, *b, 255),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::BLUE;

    #[test]
    fn color_spec_resolves_names_and_rgb() {
        assert_eq!(ColorSpec::Name("Blue".into()).to_color(), BLUE);
        assert_eq!(ColorSpec::Name("mauve".into()).to_color(), RED);
        assert_eq!(
            ColorSpec::Rgb([255, 0, 255]).to_color(),
            Color::new(1.0, 0.0, 1.0, 1.0)
        );
    }

    #[test]
    fn save_format_extensions() {
        assert_eq!(SaveFormat::default().extension(), "png");
        assert_eq!(SaveFormat::Jpg.extension(), "jpg");
    }
}
