//! Tool selection state machine.
//!
//! Exactly one tool is active at a time (or none). Tools that need extra
//! parameters (Text, Polygon) receive them together with the mode switch and
//! are validated before the switch happens, so a rejected switch leaves the
//! previous tool in place.

use crate::draw::FontDescriptor;
use crate::error::ValidationError;
use chrono::{DateTime, Local, SecondsFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// Largest side count the polygon tool accepts.
pub const MAX_POLYGON_SIDES: u32 = 1000;

/// Interaction modes selectable from the tool bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ToolMode {
    Line,
    Ellipse,
    Circle,
    Rectangle,
    Square,
    Triangle,
    Pencil,
    Text,
    Polygon,
    Eraser,
    Select,
    ColorPicker,
}

impl ToolMode {
    /// All tool modes in tool bar order.
    pub const ALL: [ToolMode; 12] = [
        ToolMode::Line,
        ToolMode::Ellipse,
        ToolMode::Circle,
        ToolMode::Rectangle,
        ToolMode::Square,
        ToolMode::Triangle,
        ToolMode::Pencil,
        ToolMode::Text,
        ToolMode::Polygon,
        ToolMode::Eraser,
        ToolMode::Select,
        ToolMode::ColorPicker,
    ];

    fn name(self) -> &'static str {
        match self {
            ToolMode::Line => "Line",
            ToolMode::Ellipse => "Ellipse",
            ToolMode::Circle => "Circle",
            ToolMode::Rectangle => "Rectangle",
            ToolMode::Square => "Square",
            ToolMode::Triangle => "Triangle",
            ToolMode::Pencil => "Pencil",
            ToolMode::Text => "Text",
            ToolMode::Polygon => "Polygon",
            ToolMode::Eraser => "Eraser",
            ToolMode::Select => "Select",
            ToolMode::ColorPicker => "ColorPicker",
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolMode {
    type Err = String;

    /// Parses a tool name, ignoring case, dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        ToolMode::ALL
            .into_iter()
            .find(|mode| mode.name().to_lowercase() == normalized)
            .ok_or_else(|| format!("Unknown tool '{s}'"))
    }
}

/// Raw parameters collected by the parameter popups, validated on activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolParams {
    /// No parameters (every tool except Text and Polygon)
    #[default]
    None,
    /// Text tool: string to stamp plus font family and size as typed
    Text {
        text: String,
        font_family: String,
        font_size: String,
    },
    /// Polygon tool: side count as typed
    Polygon { sides: String },
}

/// A validated, fully configured tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    Line,
    Ellipse,
    Circle,
    Rectangle,
    Square,
    Triangle,
    Pencil,
    /// Stamps `text` with `font` at the press point
    Text { text: String, font: FontDescriptor },
    /// Regular polygon with `sides` sides
    Polygon { sides: u32 },
    Eraser,
    Select,
    ColorPicker,
}

impl Tool {
    /// Validates `params` for `mode` and builds the configured tool.
    pub fn configure(mode: ToolMode, params: ToolParams) -> Result<Self, ValidationError> {
        let tool = match mode {
            ToolMode::Line => Tool::Line,
            ToolMode::Ellipse => Tool::Ellipse,
            ToolMode::Circle => Tool::Circle,
            ToolMode::Rectangle => Tool::Rectangle,
            ToolMode::Square => Tool::Square,
            ToolMode::Triangle => Tool::Triangle,
            ToolMode::Pencil => Tool::Pencil,
            ToolMode::Eraser => Tool::Eraser,
            ToolMode::Select => Tool::Select,
            ToolMode::ColorPicker => Tool::ColorPicker,
            ToolMode::Text => match params {
                ToolParams::Text {
                    text,
                    font_family,
                    font_size,
                } => {
                    let font = parse_font(&font_family, &font_size)?;
                    if text.is_empty() {
                        return Err(ValidationError::EmptyText);
                    }
                    Tool::Text { text, font }
                }
                _ => return Err(ValidationError::MissingParameters(mode)),
            },
            ToolMode::Polygon => match params {
                ToolParams::Polygon { sides } => Tool::Polygon {
                    sides: parse_side_count(&sides)?,
                },
                _ => return Err(ValidationError::MissingParameters(mode)),
            },
        };
        Ok(tool)
    }

    /// The mode this tool was configured for.
    pub fn mode(&self) -> ToolMode {
        match self {
            Tool::Line => ToolMode::Line,
            Tool::Ellipse => ToolMode::Ellipse,
            Tool::Circle => ToolMode::Circle,
            Tool::Rectangle => ToolMode::Rectangle,
            Tool::Square => ToolMode::Square,
            Tool::Triangle => ToolMode::Triangle,
            Tool::Pencil => ToolMode::Pencil,
            Tool::Text { .. } => ToolMode::Text,
            Tool::Polygon { .. } => ToolMode::Polygon,
            Tool::Eraser => ToolMode::Eraser,
            Tool::Select => ToolMode::Select,
            Tool::ColorPicker => ToolMode::ColorPicker,
        }
    }
}

/// Parses a polygon side count; must be a whole number in `3..=MAX_POLYGON_SIDES`.
pub fn parse_side_count(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidSideCount(input.to_string()));
    }
    let sides: u32 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidSideCount(input.to_string()))?;
    if sides < 3 {
        return Err(ValidationError::TooFewSides(sides));
    }
    if sides > MAX_POLYGON_SIDES {
        return Err(ValidationError::TooManySides(sides));
    }
    Ok(sides)
}

fn parse_font(family: &str, size: &str) -> Result<FontDescriptor, ValidationError> {
    let family = family.trim();
    if family.is_empty() {
        return Err(ValidationError::EmptyFontFamily);
    }
    let size_value: f64 = size
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFontSize(size.to_string()))?;
    if !size_value.is_finite() || size_value <= 0.0 {
        return Err(ValidationError::InvalidFontSize(size.to_string()));
    }
    Ok(FontDescriptor::new(family, size_value))
}

/// A recorded tool transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolChange {
    /// Newly active mode (`None` when the tool was deselected)
    pub mode: Option<ToolMode>,
    /// Local time of the transition
    pub at: DateTime<Local>,
}

impl ToolChange {
    /// Formats the change as a log-sink line, newline included.
    pub fn log_line(&self) -> String {
        let mode = self
            .mode
            .map(|mode| mode.to_string())
            .unwrap_or_else(|| "None".to_string());
        format!(
            "[{}] Tool switched to {}\n",
            self.at.to_rfc3339_opts(SecondsFormat::Micros, false),
            mode
        )
    }
}

/// Changed-flag shared between the tool state and an external watcher.
///
/// The watcher polls it and acknowledges what it saw. Several transitions
/// between two polls collapse into the latest one.
#[derive(Debug, Default)]
pub struct ToolChangeSignal {
    pending: Mutex<Option<ToolChange>>,
}

impl ToolChangeSignal {
    fn lock(&self) -> MutexGuard<'_, Option<ToolChange>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, change: ToolChange) {
        *self.lock() = Some(change);
    }

    /// Returns true when a transition has not been acknowledged yet.
    pub fn was_changed(&self) -> bool {
        self.lock().is_some()
    }

    /// Clears the changed-flag.
    pub fn acknowledge_change(&self) {
        self.lock().take();
    }

    /// Atomically reads and acknowledges the pending transition.
    pub fn take_change(&self) -> Option<ToolChange> {
        self.lock().take()
    }
}

/// Holds the single active tool.
#[derive(Debug, Default)]
pub struct ToolState {
    active: Option<Tool>,
    signal: Arc<ToolChangeSignal>,
}

impl ToolState {
    /// Creates a tool state with no active tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates `mode` (or clears the tool when `None`), replacing any previous tool.
    ///
    /// Parameters are validated first; on failure the previous tool stays active.
    pub fn set_tool(
        &mut self,
        mode: Option<ToolMode>,
        params: ToolParams,
    ) -> Result<Option<&Tool>, ValidationError> {
        let next = match mode {
            Some(mode) => Some(Tool::configure(mode, params)?),
            None => None,
        };
        self.active = next;
        self.signal.record(ToolChange {
            mode,
            at: Local::now(),
        });
        log::info!(
            "Tool switched to {}",
            mode.map(|m| m.to_string())
                .unwrap_or_else(|| "None".to_string())
        );
        Ok(self.active.as_ref())
    }

    /// Returns the active tool with its parameters.
    pub fn current_tool(&self) -> Option<&Tool> {
        self.active.as_ref()
    }

    /// Returns the active mode.
    pub fn current_mode(&self) -> Option<ToolMode> {
        self.active.as_ref().map(Tool::mode)
    }

    /// Returns true when a transition has not been acknowledged yet.
    pub fn was_changed(&self) -> bool {
        self.signal.was_changed()
    }

    /// Clears the changed-flag.
    pub fn acknowledge_change(&self) {
        self.signal.acknowledge_change();
    }

    /// Shared handle for a watcher running outside the UI context.
    pub fn change_signal(&self) -> Arc<ToolChangeSignal> {
        Arc::clone(&self.signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(sides: &str) -> ToolParams {
        ToolParams::Polygon {
            sides: sides.to_string(),
        }
    }

    fn text(text: &str, family: &str, size: &str) -> ToolParams {
        ToolParams::Text {
            text: text.to_string(),
            font_family: family.to_string(),
            font_size: size.to_string(),
        }
    }

    #[test]
    fn new_tool_replaces_previous_one() {
        let mut tools = ToolState::new();
        assert!(tools.current_tool().is_none());

        tools
            .set_tool(Some(ToolMode::Pencil), ToolParams::None)
            .unwrap();
        tools.set_tool(Some(ToolMode::Line), ToolParams::None).unwrap();
        assert_eq!(tools.current_mode(), Some(ToolMode::Line));

        tools.set_tool(None, ToolParams::None).unwrap();
        assert_eq!(tools.current_mode(), None);
    }

    #[test]
    fn polygon_rejects_fewer_than_three_sides() {
        let mut tools = ToolState::new();
        tools.set_tool(Some(ToolMode::Line), ToolParams::None).unwrap();

        assert_eq!(
            tools.set_tool(Some(ToolMode::Polygon), polygon("2")),
            Err(ValidationError::TooFewSides(2))
        );
        assert_eq!(
            tools.set_tool(Some(ToolMode::Polygon), polygon("five")),
            Err(ValidationError::InvalidSideCount("five".into()))
        );
        assert_eq!(
            tools.set_tool(Some(ToolMode::Polygon), polygon("-4")),
            Err(ValidationError::InvalidSideCount("-4".into()))
        );
        assert_eq!(tools.current_mode(), Some(ToolMode::Line));

        tools
            .set_tool(Some(ToolMode::Polygon), polygon(" 7 "))
            .unwrap();
        assert_eq!(tools.current_tool(), Some(&Tool::Polygon { sides: 7 }));
    }

    #[test]
    fn polygon_rejects_huge_side_counts() {
        let mut tools = ToolState::new();
        tools.set_tool(Some(ToolMode::Line), ToolParams::None).unwrap();

        assert_eq!(
            tools.set_tool(Some(ToolMode::Polygon), polygon("4000000000")),
            Err(ValidationError::TooManySides(4_000_000_000))
        );
        assert_eq!(
            parse_side_count(&(MAX_POLYGON_SIDES + 1).to_string()),
            Err(ValidationError::TooManySides(MAX_POLYGON_SIDES + 1))
        );
        assert_eq!(tools.current_mode(), Some(ToolMode::Line));

        assert_eq!(
            parse_side_count(&MAX_POLYGON_SIDES.to_string()),
            Ok(MAX_POLYGON_SIDES)
        );
    }

    #[test]
    fn text_requires_valid_font_and_text() {
        let mut tools = ToolState::new();
        tools.set_tool(Some(ToolMode::Pencil), ToolParams::None).unwrap();

        assert_eq!(
            tools.set_tool(Some(ToolMode::Text), text("hi", "Sans", "big")),
            Err(ValidationError::InvalidFontSize("big".into()))
        );
        assert_eq!(
            tools.set_tool(Some(ToolMode::Text), text("hi", "Sans", "0")),
            Err(ValidationError::InvalidFontSize("0".into()))
        );
        assert_eq!(
            tools.set_tool(Some(ToolMode::Text), text("", "Sans", "12")),
            Err(ValidationError::EmptyText)
        );
        assert_eq!(
            tools.set_tool(Some(ToolMode::Text), ToolParams::None),
            Err(ValidationError::MissingParameters(ToolMode::Text))
        );
        assert_eq!(tools.current_mode(), Some(ToolMode::Pencil));

        tools
            .set_tool(Some(ToolMode::Text), text("hello", "Monospace", "18"))
            .unwrap();
        assert_eq!(
            tools.current_tool(),
            Some(&Tool::Text {
                text: "hello".into(),
                font: FontDescriptor::new("Monospace", 18.0),
            })
        );
    }

    #[test]
    fn rejected_switch_does_not_raise_change_flag() {
        let mut tools = ToolState::new();
        assert!(!tools.was_changed());

        let _ = tools.set_tool(Some(ToolMode::Polygon), polygon("1"));
        assert!(!tools.was_changed());

        tools.set_tool(Some(ToolMode::Eraser), ToolParams::None).unwrap();
        assert!(tools.was_changed());
        tools.acknowledge_change();
        assert!(!tools.was_changed());
    }

    #[test]
    fn rapid_switches_collapse_to_latest() {
        let mut tools = ToolState::new();
        let signal = tools.change_signal();

        tools.set_tool(Some(ToolMode::Line), ToolParams::None).unwrap();
        tools.set_tool(Some(ToolMode::Square), ToolParams::None).unwrap();

        let change = signal.take_change().expect("change pending");
        assert_eq!(change.mode, Some(ToolMode::Square));
        assert!(signal.take_change().is_none());
    }

    #[test]
    fn log_line_names_the_mode() {
        let change = ToolChange {
            mode: Some(ToolMode::ColorPicker),
            at: Local::now(),
        };
        let line = change.log_line();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Tool switched to ColorPicker\n"));

        let stamp = &line[1..line.find(']').unwrap()];
        let parsed = DateTime::parse_from_rfc3339(stamp).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), change.at.offset().local_minus_utc());

        let cleared = ToolChange {
            mode: None,
            at: Local::now(),
        };
        assert!(cleared.log_line().ends_with("Tool switched to None\n"));
    }

    #[test]
    fn tool_mode_parses_loosely() {
        assert_eq!("color-picker".parse::<ToolMode>(), Ok(ToolMode::ColorPicker));
        assert_eq!("RECTANGLE".parse::<ToolMode>(), Ok(ToolMode::Rectangle));
        assert!("lasso".parse::<ToolMode>().is_err());
    }
}
