//! Canvas manager: the single owner of the raster and of the drawing state.
//!
//! All mutation of the raster goes through [`CanvasManager`]. Every mutating
//! operation pushes exactly one [`History`] entry taken before the change, so
//! undo restores pixels exactly. Background tasks never see the live raster;
//! they receive copies made on the UI context via [`CanvasManager::snapshot`].

pub mod history;
pub mod persistence;


pub use history::History;
pub use persistence::{AutoSaveSink, ImageFileAdapter, PersistenceAdapter};

use crate::config::Config;
use crate::draw::{
    BLACK, Color, Raster, RasterError, Shape, WHITE, render_selection_outline, render_shape,
};
use crate::error::{CanvasError, ValidationError};
use crate::input::{
    FillMode, GestureInterpreter, GestureOutcome, MouseButton, PaintSettings, Tool,
    ToolChangeSignal, ToolMode, ToolParams, ToolState,
};
use crate::util::{self, Rect};
use cairo::{Context, Filter, Format, ImageSurface, SurfacePattern};
use image::RgbaImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Largest accepted canvas edge, in pixels.
pub const MAX_CANVAS_EDGE: i32 = 16384;

/// Largest display zoom factor.
pub const MAX_ZOOM: u32 = 64;

/// Initial canvas state.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    pub width: i32,
    pub height: i32,
    pub background: Color,
    pub primary: Color,
    pub secondary: Color,
    pub line_width: f64,
    pub fill_mode: FillMode,
    pub zoom: u32,
    /// Maximum undo depth (0 = unlimited)
    pub history_depth: usize,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: WHITE,
            primary: BLACK,
            secondary: WHITE,
            line_width: 2.0,
            fill_mode: FillMode::Outline,
            zoom: 1,
            history_depth: 64,
        }
    }
}

impl CanvasOptions {
    /// Builds the initial canvas state from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.canvas.width,
            height: config.canvas.height,
            background: config.canvas.background_color.to_color(),
            primary: config.drawing.primary_color.to_color(),
            secondary: config.drawing.secondary_color.to_color(),
            line_width: config.drawing.line_width,
            fill_mode: if config.drawing.fill_shapes {
                FillMode::Filled
            } else {
                FillMode::Outline
            },
            zoom: config.canvas.zoom,
            history_depth: config.history.max_depth,
        }
    }
}

/// Read-only summary for a status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasStatus {
    pub tool: Option<ToolMode>,
    pub primary: Color,
    pub secondary: Color,
    pub line_width: f64,
    pub fill_mode: FillMode,
    pub zoom: u32,
    pub width: i32,
    pub height: i32,
    pub selection: Option<Rect>,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub opened_file: Option<PathBuf>,
}

impl fmt::Display for CanvasStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tool = self
            .tool
            .map(|mode| mode.to_string())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "{tool} | {}x{} @ {}x | {} / {} | width {:.1}",
            self.width,
            self.height,
            self.zoom,
            util::color_to_name(&self.primary),
            util::color_to_name(&self.secondary),
            self.line_width,
        )?;
        if self.fill_mode == FillMode::Filled {
            write!(f, " | filled")?;
        }
        if let Some(rect) = self.selection {
            write!(
                f,
                " | selection {}x{} at ({}, {})",
                rect.width, rect.height, rect.x, rect.y
            )?;
        }
        write!(f, " | undo {} redo {}", self.undo_depth, self.redo_depth)
    }
}

/// Owns the raster, the history, the tool state and the color/width/zoom/selection state.
#[derive(Debug)]
pub struct CanvasManager {
    raster: Raster,
    history: History<Raster>,
    tools: ToolState,
    gestures: GestureInterpreter,
    primary: Color,
    secondary: Color,
    background: Color,
    line_width: f64,
    fill_mode: FillMode,
    zoom: u32,
    selection: Option<Rect>,
    selection_made: bool,
    /// Selection rectangle while it is being dragged out
    pending_selection: Option<Rect>,
    /// Overlay shape of the running gesture; never part of the raster
    preview: Option<Shape>,
    opened_file: Option<PathBuf>,
    adapter: Box<dyn PersistenceAdapter>,
}

impl CanvasManager {
    /// Creates a blank canvas that reads and writes image files.
    pub fn new(options: CanvasOptions) -> Result<Self, CanvasError> {
        Self::with_adapter(options, Box::new(ImageFileAdapter))
    }

    /// Creates a blank canvas using `adapter` for load/save.
    pub fn with_adapter(
        options: CanvasOptions,
        adapter: Box<dyn PersistenceAdapter>,
    ) -> Result<Self, CanvasError> {
        validate_size(options.width, options.height)?;
        validate_line_width(options.line_width)?;
        validate_zoom(options.zoom)?;

        let raster = Raster::new(options.width, options.height, options.background)?;
        log::info!(
            "Created {}x{} canvas (undo depth {})",
            options.width,
            options.height,
            options.history_depth
        );
        Ok(Self {
            raster,
            history: History::new(options.history_depth),
            tools: ToolState::new(),
            gestures: GestureInterpreter::new(),
            primary: options.primary,
            secondary: options.secondary,
            background: options.background,
            line_width: options.line_width,
            fill_mode: options.fill_mode,
            zoom: options.zoom,
            selection: None,
            selection_made: false,
            pending_selection: None,
            preview: None,
            opened_file: None,
            adapter,
        })
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    /// Activates `mode` with `params`, or clears the tool when `mode` is `None`.
    ///
    /// Selecting the Select tool drops any existing selection.
    pub fn set_tool(
        &mut self,
        mode: Option<ToolMode>,
        params: ToolParams,
    ) -> Result<(), CanvasError> {
        if let Err(err) = self.tools.set_tool(mode, params) {
            log::warn!("Tool switch rejected: {err}");
            return Err(err.into());
        }
        if mode == Some(ToolMode::Select) {
            self.selection = None;
            self.selection_made = false;
        }
        Ok(())
    }

    pub fn current_tool(&self) -> Option<&Tool> {
        self.tools.current_tool()
    }

    pub fn current_mode(&self) -> Option<ToolMode> {
        self.tools.current_mode()
    }

    /// Shared changed-flag for the tool-change watcher.
    pub fn change_signal(&self) -> Arc<ToolChangeSignal> {
        self.tools.change_signal()
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tools
    }

    // ------------------------------------------------------------------
    // Pointer input (display coordinates)
    // ------------------------------------------------------------------

    pub fn pointer_press(&mut self, button: MouseButton, x: i32, y: i32) -> Result<(), CanvasError> {
        let (cx, cy) = self.to_canvas(x, y);
        let settings = self.paint_settings();
        let outcome = self
            .gestures
            .press(self.tools.current_tool(), &settings, button, cx, cy);
        self.apply(outcome)
    }

    pub fn pointer_drag(&mut self, x: i32, y: i32) -> Result<(), CanvasError> {
        let (cx, cy) = self.to_canvas(x, y);
        let outcome = self.gestures.drag(cx, cy);
        self.apply(outcome)
    }

    pub fn pointer_release(
        &mut self,
        button: MouseButton,
        x: i32,
        y: i32,
    ) -> Result<(), CanvasError> {
        let (cx, cy) = self.to_canvas(x, y);
        let outcome = self.gestures.release(button, cx, cy);
        self.apply(outcome)
    }

    /// Abandons the running gesture. Stroke segments already painted stay.
    ///
    /// History operations, invert, resize and load call this first, so a
    /// stroke never continues onto a raster it did not checkpoint.
    pub fn cancel_gesture(&mut self) {
        if self.gestures.cancel() {
            log::debug!("Gesture cancelled");
        }
        self.preview = None;
        self.pending_selection = None;
    }

    /// Returns true while a press/drag/release sequence is running.
    pub fn is_constructing(&self) -> bool {
        self.gestures.is_constructing()
    }

    fn to_canvas(&self, x: i32, y: i32) -> (i32, i32) {
        // zoom is bounded by MAX_ZOOM, so the cast cannot wrap
        let zoom = self.zoom as i32;
        (x.div_euclid(zoom), y.div_euclid(zoom))
    }

    fn paint_settings(&self) -> PaintSettings {
        PaintSettings {
            primary: self.primary,
            secondary: self.secondary,
            background: self.background,
            line_width: self.line_width,
            fill_mode: self.fill_mode,
        }
    }

    fn apply(&mut self, outcome: GestureOutcome) -> Result<(), CanvasError> {
        match outcome {
            GestureOutcome::Ignored => {}
            GestureOutcome::Preview(shape) => self.preview = Some(shape),
            GestureOutcome::Commit(shape) => {
                self.preview = None;
                self.commit(&shape)?;
            }
            GestureOutcome::BeginStroke(dot) => {
                self.checkpoint()?;
                self.raster.render(&dot)?;
            }
            GestureOutcome::StrokeSegment(segment) => self.raster.render(&segment)?,
            GestureOutcome::EndStroke(tail) => {
                if let Some(segment) = tail {
                    self.raster.render(&segment)?;
                }
            }
            GestureOutcome::PickColor { x, y, button } => self.pick_color(x, y, button),
            GestureOutcome::SelectionPreview(rect) => self.pending_selection = rect,
            GestureOutcome::SelectionFinished(rect) => {
                let (width, height) = (self.raster.width(), self.raster.height());
                self.pending_selection = None;
                self.selection = rect.and_then(|r| r.clamp_to_bounds(width, height));
                self.selection_made = self.selection.is_some();
                match self.selection {
                    Some(r) => log::debug!(
                        "Selection set to {}x{} at ({}, {})",
                        r.width,
                        r.height,
                        r.x,
                        r.y
                    ),
                    None => log::debug!("Selection cleared"),
                }
            }
        }
        Ok(())
    }

    fn pick_color(&mut self, x: i32, y: i32, button: MouseButton) {
        let Some(color) = self.raster.pixel(x, y) else {
            log::debug!("Color pick at ({x}, {y}) is outside the canvas");
            return;
        };
        match button {
            MouseButton::Right => self.secondary = color,
            _ => self.primary = color,
        }
        log::info!("Picked {:?} into {:?} color", color.to_rgba8(), button);
    }

    // ------------------------------------------------------------------
    // Raster mutation
    // ------------------------------------------------------------------

    /// Renders `shape` onto the raster with one history checkpoint.
    pub fn commit(&mut self, shape: &Shape) -> Result<(), CanvasError> {
        let before = self.raster.try_clone()?;
        self.raster.render(shape)?;
        self.history.push(before);
        log::debug!("Committed {}", shape.kind());
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<(), RasterError> {
        self.history.push(self.raster.try_clone()?);
        Ok(())
    }

    /// Restores the raster from before the last mutation.
    pub fn undo(&mut self) -> Result<(), CanvasError> {
        self.cancel_gesture();
        self.history.undo(&mut self.raster)?;
        self.after_history_move();
        log::debug!("Undo (remaining {})", self.history.undo_depth());
        Ok(())
    }

    /// Re-applies the last undone mutation.
    pub fn redo(&mut self) -> Result<(), CanvasError> {
        self.cancel_gesture();
        self.history.redo(&mut self.raster)?;
        self.after_history_move();
        log::debug!("Redo (remaining {})", self.history.redo_depth());
        Ok(())
    }

    fn after_history_move(&mut self) {
        self.preview = None;
        self.clamp_selection();
    }

    /// Inverts the color channels inside the selection, or everywhere without one.
    pub fn invert(&mut self) -> Result<(), CanvasError> {
        self.cancel_gesture();
        let full = Rect {
            x: 0,
            y: 0,
            width: self.raster.width(),
            height: self.raster.height(),
        };
        let region = match self.selection {
            Some(rect) if self.selection_made => rect,
            _ => full,
        };
        self.checkpoint()?;
        self.raster.invert_region(region)?;
        log::info!(
            "Inverted {}x{} region at ({}, {})",
            region.width,
            region.height,
            region.x,
            region.y
        );
        Ok(())
    }

    /// Resizes the raster, keeping the old content anchored at the origin.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), CanvasError> {
        validate_size(width, height)?;
        self.cancel_gesture();
        let resized = self.raster.resized(width, height, self.background)?;
        let before = std::mem::replace(&mut self.raster, resized);
        self.history.push(before);
        self.clamp_selection();
        log::info!("Resized canvas to {width}x{height}");
        Ok(())
    }

    fn clamp_selection(&mut self) {
        self.selection = self
            .selection
            .and_then(|r| r.clamp_to_bounds(self.raster.width(), self.raster.height()));
        if self.selection.is_none() {
            self.selection_made = false;
        }
    }

    // ------------------------------------------------------------------
    // Drawing state
    // ------------------------------------------------------------------

    /// Sets the display scale; factors outside `1..=MAX_ZOOM` are rejected.
    pub fn set_zoom(&mut self, factor: u32) -> Result<(), CanvasError> {
        if let Err(err) = validate_zoom(factor) {
            log::warn!("Rejected zoom factor {factor}; keeping {}", self.zoom);
            return Err(err.into());
        }
        self.zoom = factor;
        log::info!("Zoom set to {factor}x");
        Ok(())
    }

    /// Parses zoom text typed by the user, keeping the current zoom on failure.
    pub fn set_zoom_input(&mut self, input: &str) -> Result<(), CanvasError> {
        match input.trim().parse::<u32>() {
            Ok(factor) if factor > 0 => self.set_zoom(factor),
            _ => {
                log::warn!("Rejected zoom input '{input}'; keeping {}", self.zoom);
                Err(ValidationError::InvalidZoom(input.to_string()).into())
            }
        }
    }

    pub fn set_line_width(&mut self, width: f64) -> Result<(), CanvasError> {
        validate_line_width(width)?;
        self.line_width = width;
        Ok(())
    }

    pub fn set_primary_color(&mut self, color: Color) {
        self.primary = color;
    }

    pub fn set_secondary_color(&mut self, color: Color) {
        self.secondary = color;
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
    }

    pub fn primary_color(&self) -> Color {
        self.primary
    }

    pub fn secondary_color(&self) -> Color {
        self.secondary
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Finished selection, if any.
    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn selection_made(&self) -> bool {
        self.selection_made
    }

    /// Live preview of the running gesture.
    pub fn preview(&self) -> Option<&Shape> {
        self.preview.as_ref()
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn history(&self) -> &History<Raster> {
        &self.history
    }

    pub fn opened_file(&self) -> Option<&Path> {
        self.opened_file.as_deref()
    }

    pub fn status(&self) -> CanvasStatus {
        CanvasStatus {
            tool: self.current_mode(),
            primary: self.primary,
            secondary: self.secondary,
            line_width: self.line_width,
            fill_mode: self.fill_mode,
            zoom: self.zoom,
            width: self.raster.width(),
            height: self.raster.height(),
            selection: self.selection.filter(|_| self.selection_made),
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
            opened_file: self.opened_file.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Replaces the raster with the image at `path` and clears the history.
    pub fn load_image_from_file(&mut self, path: &Path) -> Result<(), CanvasError> {
        let image = self.adapter.load(path)?;
        let raster = Raster::from_rgba(image.width(), image.height(), image.as_raw())?;

        self.cancel_gesture();
        self.raster = raster;
        self.history.clear();
        self.selection = None;
        self.selection_made = false;
        self.opened_file = Some(path.to_path_buf());
        log::info!(
            "Opened {} ({}x{})",
            path.display(),
            self.raster.width(),
            self.raster.height()
        );
        Ok(())
    }

    /// Saves to the opened file.
    pub fn save(&mut self) -> Result<(), CanvasError> {
        let path = self
            .opened_file
            .clone()
            .ok_or(ValidationError::NoOpenedFile)?;
        self.save_canvas_to_file(&path)
    }

    /// Saves to `path` and remembers it as the opened file.
    pub fn save_canvas_to_file(&mut self, path: &Path) -> Result<(), CanvasError> {
        self.send_snapshot_to_file(path)?;
        self.opened_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Writes a copy of the raster to `path` without touching history or the opened file.
    pub fn send_snapshot_to_file(&self, path: &Path) -> Result<(), CanvasError> {
        let image = self.snapshot_image()?;
        self.adapter.save(&image, path)?;
        Ok(())
    }

    /// Independent copy of the raster.
    pub fn snapshot(&self) -> Result<Raster, CanvasError> {
        Ok(self.raster.try_clone()?)
    }

    /// Straight-alpha RGBA copy of the raster.
    pub fn snapshot_image(&self) -> Result<RgbaImage, CanvasError> {
        let width = self.raster.width() as u32;
        let height = self.raster.height() as u32;
        let rgba = self.raster.to_rgba()?;
        let len = rgba.len();
        RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            CanvasError::Render(RasterError::SizeMismatch { width, height, len })
        })
    }

    // ------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------

    /// Composes what the user sees: the zoomed raster plus preview and selection overlays.
    pub fn compose_display(&self) -> Result<ImageSurface, CanvasError> {
        let zoom = self.zoom as i32;
        let surface = ImageSurface::create(
            Format::ARgb32,
            self.raster.width().saturating_mul(zoom),
            self.raster.height().saturating_mul(zoom),
        )
        .map_err(RasterError::from)?;
        {
            let ctx = Context::new(&surface).map_err(RasterError::from)?;
            ctx.scale(self.zoom as f64, self.zoom as f64);

            let pattern = SurfacePattern::create(self.raster.surface());
            pattern.set_filter(Filter::Nearest);
            ctx.set_source(&pattern).map_err(RasterError::from)?;
            ctx.paint().map_err(RasterError::from)?;

            if let Some(shape) = &self.preview {
                render_shape(&ctx, shape);
            }
            let outline = self
                .pending_selection
                .or(self.selection.filter(|_| self.selection_made));
            if let Some(rect) = outline {
                render_selection_outline(&ctx, rect);
            }
            ctx.status().map_err(RasterError::from)?;
        }
        surface.flush();
        Ok(surface)
    }
}

fn validate_size(width: i32, height: i32) -> Result<(), ValidationError> {
    if (1..=MAX_CANVAS_EDGE).contains(&width) && (1..=MAX_CANVAS_EDGE).contains(&height) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCanvasSize { width, height })
    }
}

fn validate_zoom(factor: u32) -> Result<(), ValidationError> {
    if (1..=MAX_ZOOM).contains(&factor) {
        Ok(())
    } else {
        Err(ValidationError::InvalidZoom(factor.to_string()))
    }
}

fn validate_line_width(width: f64) -> Result<(), ValidationError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidLineWidth(width))
    }
}
