//! Shape definitions for the drawing surface.

use super::color::Color;
use super::font::FontDescriptor;
use crate::util;

/// Paint attributes shared by every stroked shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Outline color
    pub color: Color,
    /// Interior color for closed shapes (`None` = outline only)
    pub fill: Option<Color>,
    /// Line width in pixels
    pub width: f64,
}

impl Paint {
    /// Outline-only paint.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            color,
            fill: None,
            width,
        }
    }
}

/// A geometric primitive ready to be rasterized.
///
/// Each variant carries its own geometry and paint. A shape is rendered once
/// into the raster when committed; after that only its pixels remain.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Straight line between two points
    Line {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        paint: Paint,
    },
    /// Axis-aligned ellipse inscribed in the box `(x, y, w, h)`
    Ellipse {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        paint: Paint,
    },
    /// Circle inscribed in the square `(x, y, diameter, diameter)`
    Circle {
        x: i32,
        y: i32,
        diameter: i32,
        paint: Paint,
    },
    /// Axis-aligned rectangle
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        paint: Paint,
    },
    /// Axis-aligned square
    Square {
        x: i32,
        y: i32,
        side: i32,
        paint: Paint,
    },
    /// Triangle through three vertices
    Triangle {
        vertices: [(i32, i32); 3],
        paint: Paint,
    },
    /// Regular polygon
    Polygon {
        /// Center X coordinate
        cx: i32,
        /// Center Y coordinate
        cy: i32,
        /// Distance from the center to every vertex
        radius: f64,
        /// Number of sides (at least 3)
        sides: u32,
        /// Angle of the first vertex in radians
        start_angle: f64,
        paint: Paint,
    },
    /// Freehand pencil stroke (polyline through the traced points)
    Freehand {
        points: Vec<(i32, i32)>,
        paint: Paint,
    },
    /// Text anchored at its baseline start
    Text {
        x: i32,
        y: i32,
        text: String,
        font: FontDescriptor,
        color: Color,
    },
    /// Eraser stroke, painted with the background color
    Eraser {
        points: Vec<(i32, i32)>,
        color: Color,
        width: f64,
    },
}

impl Shape {
    /// Short human-readable name of the shape kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Line { .. } => "line",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Circle { .. } => "circle",
            Shape::Rect { .. } => "rectangle",
            Shape::Square { .. } => "square",
            Shape::Triangle { .. } => "triangle",
            Shape::Polygon { .. } => "polygon",
            Shape::Freehand { .. } => "freehand",
            Shape::Text { .. } => "text",
            Shape::Eraser { .. } => "eraser",
        }
    }

    /// Returns the paint for stroked shapes (`None` for text and eraser strokes).
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Shape::Line { paint, .. }
            | Shape::Ellipse { paint, .. }
            | Shape::Circle { paint, .. }
            | Shape::Rect { paint, .. }
            | Shape::Square { paint, .. }
            | Shape::Triangle { paint, .. }
            | Shape::Polygon { paint, .. }
            | Shape::Freehand { paint, .. } => Some(paint),
            Shape::Text { .. } | Shape::Eraser { .. } => None,
        }
    }

    /// Vertices of a polygon shape, `None` for every other kind.
    pub fn polygon_vertices(&self) -> Option<Vec<(f64, f64)>> {
        match self {
            Shape::Polygon {
                cx,
                cy,
                radius,
                sides,
                start_angle,
                ..
            } => Some(util::polygon_vertices(
                *cx as f64,
                *cy as f64,
                *radius,
                *sides,
                *start_angle,
            )),
            _ => None,
        }
    }
}
