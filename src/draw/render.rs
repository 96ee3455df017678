//! Cairo-based rendering functions for shapes.

use super::color::Color;
use super::font::FontDescriptor;
use super::shape::{Paint, Shape};
use crate::util::Rect;

/// Renders a single shape to a Cairo context.
///
/// Dispatches to the appropriate internal rendering function based on shape type.
/// Degenerate geometry (zero-sized boxes, single points) is drawn as whatever
/// Cairo produces for it: a dot for strokes, nothing for empty boxes.
pub fn render_shape(ctx: &cairo::Context, shape: &Shape) {
    match shape {
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            paint,
        } => render_line(ctx, *x1, *y1, *x2, *y2, paint),
        Shape::Ellipse { x, y, w, h, paint } => render_ellipse(ctx, *x, *y, *w, *h, paint),
        Shape::Circle {
            x,
            y,
            diameter,
            paint,
        } => render_ellipse(ctx, *x, *y, *diameter, *diameter, paint),
        Shape::Rect { x, y, w, h, paint } => render_rect(ctx, *x, *y, *w, *h, paint),
        Shape::Square { x, y, side, paint } => render_rect(ctx, *x, *y, *side, *side, paint),
        Shape::Triangle { vertices, paint } => {
            let points: Vec<(f64, f64)> = vertices
                .iter()
                .map(|&(x, y)| (x as f64, y as f64))
                .collect();
            render_closed_path(ctx, &points, paint);
        }
        Shape::Polygon { .. } => {
            if let (Some(points), Some(paint)) = (shape.polygon_vertices(), shape.paint()) {
                render_closed_path(ctx, &points, paint);
            }
        }
        Shape::Freehand { points, paint } => {
            render_polyline(ctx, points, paint.color, paint.width, cairo::Operator::Over)
        }
        Shape::Text {
            x,
            y,
            text,
            font,
            color,
        } => render_text(ctx, *x, *y, text, font, *color),
        Shape::Eraser {
            points,
            color,
            width,
        } => render_polyline(ctx, points, *color, *width, cairo::Operator::Source),
    }
}

/// Fills (when the paint has a fill color) and then strokes the current path.
fn fill_and_stroke(ctx: &cairo::Context, paint: &Paint) {
    if let Some(fill) = paint.fill {
        fill.apply(ctx);
        let _ = ctx.fill_preserve();
    }
    paint.color.apply(ctx);
    ctx.set_line_width(paint.width);
    let _ = ctx.stroke();
}

/// Render a polyline with round caps and joins.
///
/// A single point renders as a round dot of the stroke width.
fn render_polyline(
    ctx: &cairo::Context,
    points: &[(i32, i32)],
    color: Color,
    width: f64,
    operator: cairo::Operator,
) {
    let Some(&(x0, y0)) = points.first() else {
        return;
    };

    ctx.save().ok();
    ctx.set_operator(operator);
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(x0 as f64, y0 as f64);
    if points.len() == 1 {
        ctx.line_to(x0 as f64, y0 as f64);
    }
    for &(x, y) in &points[1..] {
        ctx.line_to(x as f64, y as f64);
    }

    let _ = ctx.stroke();
    ctx.restore().ok();
}

/// Render a straight line
fn render_line(ctx: &cairo::Context, x1: i32, y1: i32, x2: i32, y2: i32, paint: &Paint) {
    paint.color.apply(ctx);
    ctx.set_line_width(paint.width);
    ctx.set_line_cap(cairo::LineCap::Round);

    ctx.move_to(x1 as f64, y1 as f64);
    ctx.line_to(x2 as f64, y2 as f64);
    let _ = ctx.stroke();
}

/// Render a rectangle, normalizing negative extents
fn render_rect(ctx: &cairo::Context, x: i32, y: i32, w: i32, h: i32, paint: &Paint) {
    ctx.set_line_join(cairo::LineJoin::Miter);

    let (x, y, w, h) = (x as f64, y as f64, w as f64, h as f64);
    let (norm_x, norm_w) = if w >= 0.0 { (x, w) } else { (x + w, -w) };
    let (norm_y, norm_h) = if h >= 0.0 { (y, h) } else { (y + h, -h) };

    ctx.rectangle(norm_x, norm_y, norm_w, norm_h);
    fill_and_stroke(ctx, paint);
}

/// Render an ellipse inscribed in a box using Cairo's arc with scaling
fn render_ellipse(ctx: &cairo::Context, x: i32, y: i32, w: i32, h: i32, paint: &Paint) {
    if w == 0 || h == 0 {
        return;
    }

    let rx = w.abs() as f64 / 2.0;
    let ry = h.abs() as f64 / 2.0;
    let cx = (x as f64).min(x as f64 + w as f64) + rx;
    let cy = (y as f64).min(y as f64 + h as f64) + ry;

    ctx.save().ok();
    ctx.translate(cx, cy);
    ctx.scale(rx, ry);
    ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * std::f64::consts::PI);
    ctx.restore().ok();

    fill_and_stroke(ctx, paint);
}

/// Render a closed outline through the given vertices
fn render_closed_path(ctx: &cairo::Context, points: &[(f64, f64)], paint: &Paint) {
    let Some(&(x0, y0)) = points.first() else {
        return;
    };

    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.move_to(x0, y0);
    for &(x, y) in &points[1..] {
        ctx.line_to(x, y);
    }
    ctx.close_path();
    fill_and_stroke(ctx, paint);
}

/// Renders text at a baseline position using Pango.
///
/// The position (x, y) is the baseline start of the first line; newlines
/// produce additional lines spaced by the font metrics.
pub fn render_text(
    ctx: &cairo::Context,
    x: i32,
    y: i32,
    text: &str,
    font: &FontDescriptor,
    color: Color,
) {
    if text.is_empty() {
        return;
    }

    ctx.save().ok();
    ctx.set_antialias(cairo::Antialias::Gray);

    let layout = pangocairo::functions::create_layout(ctx);
    let font_desc = pango::FontDescription::from_string(&font.to_pango_string());
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    // Pango positions from the top-left corner, we anchor on the baseline
    let baseline = layout.baseline() as f64 / pango::SCALE as f64;
    ctx.move_to(x as f64, y as f64 - baseline);

    color.apply(ctx);
    pangocairo::functions::show_layout(ctx, &layout);

    ctx.restore().ok();
}

/// Draws the dashed outline of a selection rectangle.
///
/// Used on display overlays only; never on the raster.
pub fn render_selection_outline(ctx: &cairo::Context, rect: Rect) {
    ctx.save().ok();
    ctx.set_line_width(1.0);
    ctx.set_dash(&[4.0, 4.0], 0.0);

    ctx.rectangle(
        rect.x as f64 + 0.5,
        rect.y as f64 + 0.5,
        (rect.width - 1).max(0) as f64,
        (rect.height - 1).max(0) as f64,
    );
    ctx.set_source_rgba(0.0, 0.0, 0.0, 1.0);
    let _ = ctx.stroke_preserve();

    ctx.set_dash(&[4.0, 4.0], 4.0);
    ctx.set_source_rgba(1.0, 1.0, 1.0, 1.0);
    let _ = ctx.stroke();

    ctx.restore().ok();
}
