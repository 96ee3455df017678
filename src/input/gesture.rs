//! Gesture interpreter: turns press/drag/release sequences into shapes.
//!
//! The interpreter is a two-state machine (`Idle`, `Constructing`). The tool
//! and paint are captured on press, so switching tools mid-drag cannot change
//! what the running gesture produces.

use crate::draw::{Color, Paint, Shape};
use crate::input::{MouseButton, Tool};
use crate::util::{self, Rect};
use serde::{Deserialize, Serialize};

/// Whether closed shapes are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Outline only
    #[default]
    Outline,
    /// Fill with the color of the other button, then outline
    Filled,
}

/// Paint state sampled when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintSettings {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub line_width: f64,
    pub fill_mode: FillMode,
}

impl PaintSettings {
    /// Paint for a closed shape drawn with `button`.
    ///
    /// The right button swaps the roles of the primary and secondary colors.
    pub fn paint_for(&self, button: MouseButton) -> Paint {
        let (stroke, other) = match button {
            MouseButton::Right => (self.secondary, self.primary),
            _ => (self.primary, self.secondary),
        };
        Paint {
            color: stroke,
            fill: (self.fill_mode == FillMode::Filled).then_some(other),
            width: self.line_width,
        }
    }
}

/// Interpreter state.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    /// No button held
    Idle,
    /// Button held; a shape or selection is being dragged out
    Constructing {
        /// Tool captured on press
        tool: Tool,
        /// Button that started the gesture
        button: MouseButton,
        /// Press point
        anchor: (i32, i32),
        /// Points visited so far (press point first)
        points: Vec<(i32, i32)>,
        /// Paint captured on press
        paint: Paint,
        /// Background color for eraser strokes
        background: Color,
    },
}

/// What the canvas should do in response to a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to do
    Ignored,
    /// Show `Shape` on the overlay; the raster is not touched
    Preview(Shape),
    /// Commit a finished shape (with its own history checkpoint)
    Commit(Shape),
    /// A pencil/eraser stroke starts: checkpoint, then paint the first dot
    BeginStroke(Shape),
    /// Paint one more stroke segment (no checkpoint)
    StrokeSegment(Shape),
    /// The stroke ended, optionally with a last segment to paint
    EndStroke(Option<Shape>),
    /// Sample the raster at the point into the color of `button`
    PickColor { x: i32, y: i32, button: MouseButton },
    /// Selection rectangle being dragged (`None` while it has no area)
    SelectionPreview(Option<Rect>),
    /// Selection finished (`None` clears the selection)
    SelectionFinished(Option<Rect>),
}

/// Converts pointer events into [`GestureOutcome`]s.
#[derive(Debug)]
pub struct GestureInterpreter {
    state: GestureState,
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureInterpreter {
    /// Creates an idle interpreter.
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Returns true while a gesture is in progress.
    pub fn is_constructing(&self) -> bool {
        matches!(self.state, GestureState::Constructing { .. })
    }

    /// Processes a button press at `(x, y)` in canvas coordinates.
    ///
    /// # Behavior
    /// - No active tool, middle button, or a gesture already running: ignored
    /// - Text: commits the configured string immediately
    /// - Color picker: requests a color sample
    /// - Pencil/Eraser: starts a stroke
    /// - Everything else: starts constructing
    pub fn press(
        &mut self,
        tool: Option<&Tool>,
        settings: &PaintSettings,
        button: MouseButton,
        x: i32,
        y: i32,
    ) -> GestureOutcome {
        let Some(tool) = tool else {
            return GestureOutcome::Ignored;
        };
        if button == MouseButton::Middle || self.is_constructing() {
            return GestureOutcome::Ignored;
        }

        let paint = settings.paint_for(button);
        match tool {
            Tool::Text { text, font } => {
                return GestureOutcome::Commit(Shape::Text {
                    x,
                    y,
                    text: text.clone(),
                    font: font.clone(),
                    color: paint.color,
                });
            }
            Tool::ColorPicker => return GestureOutcome::PickColor { x, y, button },
            _ => {}
        }

        self.state = GestureState::Constructing {
            tool: tool.clone(),
            button,
            anchor: (x, y),
            points: vec![(x, y)],
            paint,
            background: settings.background,
        };
        log::debug!("Gesture started with {} at ({x}, {y})", tool.mode());

        match tool {
            Tool::Pencil | Tool::Eraser => {
                GestureOutcome::BeginStroke(self.stroke_segment(&[(x, y)]))
            }
            Tool::Select => GestureOutcome::SelectionPreview(None),
            _ => self.preview_at(x, y),
        }
    }

    /// Processes pointer motion while a button is held.
    pub fn drag(&mut self, x: i32, y: i32) -> GestureOutcome {
        let GestureState::Constructing { tool, points, .. } = &mut self.state else {
            return GestureOutcome::Ignored;
        };

        match tool {
            Tool::Pencil | Tool::Eraser => {
                let last = points.last().copied().unwrap_or((x, y));
                if last == (x, y) {
                    return GestureOutcome::Ignored;
                }
                points.push((x, y));
                GestureOutcome::StrokeSegment(self.stroke_segment(&[last, (x, y)]))
            }
            Tool::Select => {
                points.push((x, y));
                GestureOutcome::SelectionPreview(self.selection_to(x, y))
            }
            _ => {
                points.push((x, y));
                self.preview_at(x, y)
            }
        }
    }

    /// Processes a button release, finalizing the running gesture.
    ///
    /// Zero-length drags still commit (a degenerate shape).
    pub fn release(&mut self, button: MouseButton, x: i32, y: i32) -> GestureOutcome {
        let started_with = match &self.state {
            GestureState::Constructing { button, .. } => *button,
            GestureState::Idle => return GestureOutcome::Ignored,
        };
        if started_with != button {
            return GestureOutcome::Ignored;
        }

        let outcome = match &self.state {
            GestureState::Constructing {
                tool: Tool::Pencil | Tool::Eraser,
                points,
                ..
            } => {
                let last = points.last().copied().unwrap_or((x, y));
                let tail = (last != (x, y)).then(|| self.stroke_segment(&[last, (x, y)]));
                GestureOutcome::EndStroke(tail)
            }
            GestureState::Constructing {
                tool: Tool::Select, ..
            } => GestureOutcome::SelectionFinished(self.selection_to(x, y)),
            GestureState::Constructing {
                tool,
                anchor,
                paint,
                ..
            } => match build_shape(tool, *anchor, (x, y), *paint) {
                Some(shape) => GestureOutcome::Commit(shape),
                None => GestureOutcome::Ignored,
            },
            GestureState::Idle => GestureOutcome::Ignored,
        };

        self.state = GestureState::Idle;
        log::debug!("Gesture finished at ({x}, {y})");
        outcome
    }

    /// Abandons the running gesture without committing anything further.
    ///
    /// Returns true when a gesture was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        let was_constructing = self.is_constructing();
        self.state = GestureState::Idle;
        was_constructing
    }

    fn preview_at(&self, x: i32, y: i32) -> GestureOutcome {
        if let GestureState::Constructing {
            tool,
            anchor,
            paint,
            ..
        } = &self.state
        {
            if let Some(shape) = build_shape(tool, *anchor, (x, y), *paint) {
                return GestureOutcome::Preview(shape);
            }
        }
        GestureOutcome::Ignored
    }

    fn selection_to(&self, x: i32, y: i32) -> Option<Rect> {
        match &self.state {
            GestureState::Constructing { anchor, .. } => {
                Rect::from_corners(anchor.0, anchor.1, x, y)
            }
            GestureState::Idle => None,
        }
    }

    /// Builds one stroke primitive for the running pencil/eraser gesture.
    fn stroke_segment(&self, points: &[(i32, i32)]) -> Shape {
        match &self.state {
            GestureState::Constructing {
                tool: Tool::Eraser,
                paint,
                background,
                ..
            } => Shape::Eraser {
                points: points.to_vec(),
                color: *background,
                width: paint.width,
            },
            GestureState::Constructing { paint, .. } => Shape::Freehand {
                points: points.to_vec(),
                paint: Paint::stroke(paint.color, paint.width),
            },
            GestureState::Idle => Shape::Freehand {
                points: points.to_vec(),
                paint: Paint::stroke(Color::new(0.0, 0.0, 0.0, 1.0), 1.0),
            },
        }
    }
}

/// Applies a tool's construction rule to a drag from `anchor` to `terminal`.
///
/// Returns `None` for tools that do not construct a single shape.
pub fn build_shape(
    tool: &Tool,
    anchor: (i32, i32),
    terminal: (i32, i32),
    paint: Paint,
) -> Option<Shape> {
    let (ax, ay) = anchor;
    let (tx, ty) = terminal;

    let shape = match tool {
        Tool::Line => Shape::Line {
            x1: ax,
            y1: ay,
            x2: tx,
            y2: ty,
            paint: Paint::stroke(paint.color, paint.width),
        },
        Tool::Rectangle => {
            let (x, y, w, h) = util::drag_bounds(ax, ay, tx, ty);
            Shape::Rect { x, y, w, h, paint }
        }
        Tool::Square => {
            let (sx, sy) = util::constrain_square(ax, ay, tx, ty);
            let (x, y, side, _) = util::drag_bounds(ax, ay, sx, sy);
            Shape::Square { x, y, side, paint }
        }
        Tool::Ellipse => {
            let (x, y, w, h) = util::drag_bounds(ax, ay, tx, ty);
            Shape::Ellipse { x, y, w, h, paint }
        }
        Tool::Circle => {
            let (sx, sy) = util::constrain_square(ax, ay, tx, ty);
            let (x, y, diameter, _) = util::drag_bounds(ax, ay, sx, sy);
            Shape::Circle {
                x,
                y,
                diameter,
                paint,
            }
        }
        Tool::Triangle => Shape::Triangle {
            vertices: [
                (util::saturate((i64::from(ax) + i64::from(tx)) / 2), ay),
                (ax, ty),
                (tx, ty),
            ],
            paint,
        },
        Tool::Polygon { sides } => {
            let dx = f64::from(tx) - f64::from(ax);
            let dy = f64::from(ty) - f64::from(ay);
            Shape::Polygon {
                cx: ax,
                cy: ay,
                radius: dx.hypot(dy),
                sides: *sides,
                start_angle: dy.atan2(dx),
                paint,
            }
        }
        Tool::Pencil
        | Tool::Eraser
        | Tool::Text { .. }
        | Tool::Select
        | Tool::ColorPicker => return None,
    };
    Some(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BLACK, BLUE, FontDescriptor, RED, WHITE};

    fn settings() -> PaintSettings {
        PaintSettings {
            primary: RED,
            secondary: BLUE,
            background: WHITE,
            line_width: 2.0,
            fill_mode: FillMode::Outline,
        }
    }

    fn drag_out(tool: Tool, from: (i32, i32), to: (i32, i32)) -> GestureOutcome {
        let mut gestures = GestureInterpreter::new();
        gestures.press(Some(&tool), &settings(), MouseButton::Left, from.0, from.1);
        gestures.drag(to.0, to.1);
        gestures.release(MouseButton::Left, to.0, to.1)
    }

    #[test]
    fn press_without_tool_is_ignored() {
        let mut gestures = GestureInterpreter::new();
        let outcome = gestures.press(None, &settings(), MouseButton::Left, 3, 4);
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert!(!gestures.is_constructing());
    }

    #[test]
    fn line_drag_previews_then_commits() {
        let mut gestures = GestureInterpreter::new();
        gestures.press(Some(&Tool::Line), &settings(), MouseButton::Left, 10, 10);
        assert!(gestures.is_constructing());

        match gestures.drag(30, 20) {
            GestureOutcome::Preview(Shape::Line { x2, y2, .. }) => assert_eq!((x2, y2), (30, 20)),
            other => panic!("unexpected outcome {other:?}"),
        }

        let outcome = gestures.release(MouseButton::Left, 50, 50);
        assert_eq!(
            outcome,
            GestureOutcome::Commit(Shape::Line {
                x1: 10,
                y1: 10,
                x2: 50,
                y2: 50,
                paint: Paint::stroke(RED, 2.0),
            })
        );
        assert_eq!(gestures.state(), &GestureState::Idle);
    }

    #[test]
    fn zero_length_drag_commits_degenerate_shape() {
        let outcome = drag_out(Tool::Rectangle, (20, 20), (20, 20));
        assert_eq!(
            outcome,
            GestureOutcome::Commit(Shape::Rect {
                x: 20,
                y: 20,
                w: 0,
                h: 0,
                paint: Paint::stroke(RED, 2.0),
            })
        );
    }

    #[test]
    fn square_and_circle_follow_dominant_axis() {
        match drag_out(Tool::Square, (10, 10), (40, 20)) {
            GestureOutcome::Commit(Shape::Square { x, y, side, .. }) => {
                assert_eq!((x, y, side), (10, 10, 30))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match drag_out(Tool::Circle, (50, 50), (40, 10)) {
            GestureOutcome::Commit(Shape::Circle { x, y, diameter, .. }) => {
                assert_eq!((x, y, diameter), (10, 10, 40))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn rectangle_normalizes_reverse_drag() {
        match drag_out(Tool::Rectangle, (40, 30), (10, 5)) {
            GestureOutcome::Commit(Shape::Rect { x, y, w, h, .. }) => {
                assert_eq!((x, y, w, h), (10, 5, 30, 25))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn triangle_apex_sits_on_press_row() {
        match drag_out(Tool::Triangle, (0, 0), (40, 30)) {
            GestureOutcome::Commit(Shape::Triangle { vertices, .. }) => {
                assert_eq!(vertices, [(20, 0), (0, 30), (40, 30)])
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn extreme_coordinates_saturate_instead_of_overflowing() {
        let (min, max) = (i32::MIN, i32::MAX);
        match drag_out(Tool::Rectangle, (min, min), (max, max)) {
            GestureOutcome::Commit(Shape::Rect { x, y, w, h, .. }) => {
                assert_eq!((x, y, w, h), (min, min, max, max))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match drag_out(Tool::Square, (max, max), (min, 0)) {
            GestureOutcome::Commit(Shape::Square { x, side, .. }) => {
                assert_eq!((x, side), (min, max))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match drag_out(Tool::Triangle, (min, 0), (max, 10)) {
            GestureOutcome::Commit(Shape::Triangle { vertices, .. }) => {
                assert_eq!(vertices[0], (0, 0))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match drag_out(Tool::Polygon { sides: 4 }, (min, 0), (max, 0)) {
            GestureOutcome::Commit(Shape::Polygon { radius, .. }) => {
                assert_eq!(radius, f64::from(max) - f64::from(min))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn polygon_uses_press_as_center_and_release_as_radius() {
        match drag_out(Tool::Polygon { sides: 5 }, (50, 50), (50, 80)) {
            GestureOutcome::Commit(Shape::Polygon {
                cx,
                cy,
                radius,
                sides,
                start_angle,
                ..
            }) => {
                assert_eq!((cx, cy, sides), (50, 50, 5));
                assert!((radius - 30.0).abs() < 1e-9);
                assert!((start_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn pencil_emits_segments_between_successive_points() {
        let mut gestures = GestureInterpreter::new();
        let begin = gestures.press(Some(&Tool::Pencil), &settings(), MouseButton::Left, 0, 0);
        assert!(matches!(begin, GestureOutcome::BeginStroke(Shape::Freehand { ref points, .. }) if points == &vec![(0, 0)]));

        assert_eq!(
            gestures.drag(5, 0),
            GestureOutcome::StrokeSegment(Shape::Freehand {
                points: vec![(0, 0), (5, 0)],
                paint: Paint::stroke(RED, 2.0),
            })
        );
        assert_eq!(gestures.drag(5, 0), GestureOutcome::Ignored);
        assert_eq!(
            gestures.release(MouseButton::Left, 5, 5),
            GestureOutcome::EndStroke(Some(Shape::Freehand {
                points: vec![(5, 0), (5, 5)],
                paint: Paint::stroke(RED, 2.0),
            }))
        );
    }

    #[test]
    fn eraser_paints_background() {
        let mut gestures = GestureInterpreter::new();
        gestures.press(Some(&Tool::Eraser), &settings(), MouseButton::Right, 1, 1);
        assert_eq!(
            gestures.drag(4, 4),
            GestureOutcome::StrokeSegment(Shape::Eraser {
                points: vec![(1, 1), (4, 4)],
                color: WHITE,
                width: 2.0,
            })
        );
        assert_eq!(
            gestures.release(MouseButton::Right, 4, 4),
            GestureOutcome::EndStroke(None)
        );
    }

    #[test]
    fn text_commits_on_press_without_drag_phase() {
        let mut gestures = GestureInterpreter::new();
        let tool = Tool::Text {
            text: "hi".into(),
            font: FontDescriptor::new("Sans", 14.0),
        };
        let outcome = gestures.press(Some(&tool), &settings(), MouseButton::Left, 7, 9);
        assert_eq!(
            outcome,
            GestureOutcome::Commit(Shape::Text {
                x: 7,
                y: 9,
                text: "hi".into(),
                font: FontDescriptor::new("Sans", 14.0),
                color: RED,
            })
        );
        assert!(!gestures.is_constructing());
    }

    #[test]
    fn color_picker_requests_sample_for_button() {
        let mut gestures = GestureInterpreter::new();
        let outcome = gestures.press(
            Some(&Tool::ColorPicker),
            &settings(),
            MouseButton::Right,
            2,
            3,
        );
        assert_eq!(
            outcome,
            GestureOutcome::PickColor {
                x: 2,
                y: 3,
                button: MouseButton::Right
            }
        );
        assert!(!gestures.is_constructing());
    }

    #[test]
    fn selection_drag_reports_rectangle() {
        let mut gestures = GestureInterpreter::new();
        gestures.press(Some(&Tool::Select), &settings(), MouseButton::Left, 0, 0);
        assert_eq!(
            gestures.drag(20, 10),
            GestureOutcome::SelectionPreview(Rect::new(0, 0, 20, 10))
        );
        assert_eq!(
            gestures.release(MouseButton::Left, 50, 50),
            GestureOutcome::SelectionFinished(Rect::new(0, 0, 50, 50))
        );
    }

    #[test]
    fn right_button_swaps_colors_and_fill_uses_other_color() {
        let mut filled = settings();
        filled.fill_mode = FillMode::Filled;
        let paint = filled.paint_for(MouseButton::Right);
        assert_eq!(paint.color, BLUE);
        assert_eq!(paint.fill, Some(RED));
        assert_eq!(settings().paint_for(MouseButton::Left).fill, None);
    }

    #[test]
    fn tool_is_captured_on_press() {
        let mut gestures = GestureInterpreter::new();
        let mut settings = settings();
        gestures.press(Some(&Tool::Line), &settings, MouseButton::Left, 0, 0);
        settings.primary = BLACK;
        match gestures.release(MouseButton::Left, 3, 3) {
            GestureOutcome::Commit(Shape::Line { paint, .. }) => assert_eq!(paint.color, RED),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn release_with_other_button_keeps_constructing() {
        let mut gestures = GestureInterpreter::new();
        gestures.press(Some(&Tool::Ellipse), &settings(), MouseButton::Left, 0, 0);
        assert_eq!(
            gestures.release(MouseButton::Right, 5, 5),
            GestureOutcome::Ignored
        );
        assert!(gestures.is_constructing());
        assert!(gestures.cancel());
        assert!(!gestures.is_constructing());
    }
}
