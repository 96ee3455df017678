//! Headless gesture scripts.
//!
//! A script is a TOML file with one `[[step]]` table per action, replayed
//! against a [`CanvasManager`] exactly as pointer and menu input would be:
//!
//! ```toml
//! [[step]]
//! action = "tool"
//! tool = "line"
//!
//! [[step]]
//! action = "press"
//! x = 10
//! y = 10
//!
//! [[step]]
//! action = "release"
//! x = 50
//! y = 50
//! ```

use crate::canvas::{AutoSaveSink, CanvasManager};
use crate::config::{ColorSpec, Config};
use crate::error::CanvasError;
use crate::input::{FillMode, MouseButton, ToolMode, ToolParams};
use crate::tasks::BackgroundTasks;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// How often background events are drained during a `wait` step.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Switch tools; omit `tool` to deselect. Text and polygon parameters
    /// fall back to the `[drawing]` configuration.
    Tool {
        #[serde(default)]
        tool: Option<ToolMode>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        font_family: Option<String>,
        #[serde(default)]
        font_size: Option<String>,
        #[serde(default)]
        sides: Option<String>,
    },
    Press {
        x: i32,
        y: i32,
        #[serde(default)]
        button: MouseButton,
    },
    Drag {
        x: i32,
        y: i32,
    },
    Release {
        x: i32,
        y: i32,
        #[serde(default)]
        button: MouseButton,
    },
    /// Escape-to-cancel
    Cancel,
    Primary {
        color: ColorSpec,
    },
    Secondary {
        color: ColorSpec,
    },
    Width {
        value: f64,
    },
    /// Zoom as typed into the zoom field
    Zoom {
        value: String,
    },
    Fill {
        enabled: bool,
    },
    Undo,
    Redo,
    Invert,
    Resize {
        width: i32,
        height: i32,
    },
    Open {
        path: PathBuf,
    },
    /// Save to `path`, or to the opened file when omitted
    Save {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Sleep while still servicing background tasks
    Wait {
        ms: u64,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Tool { .. } => "tool",
            Step::Press { .. } => "press",
            Step::Drag { .. } => "drag",
            Step::Release { .. } => "release",
            Step::Cancel => "cancel",
            Step::Primary { .. } => "primary",
            Step::Secondary { .. } => "secondary",
            Step::Width { .. } => "width",
            Step::Zoom { .. } => "zoom",
            Step::Fill { .. } => "fill",
            Step::Undo => "undo",
            Step::Redo => "redo",
            Step::Invert => "invert",
            Step::Resize { .. } => "resize",
            Step::Open { .. } => "open",
            Step::Save { .. } => "save",
            Step::Wait { .. } => "wait",
        }
    }
}

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parses script text.
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse script")
    }

    /// Reads and parses the script at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script = Self::parse(&source)
            .with_context(|| format!("Invalid script {}", path.display()))?;
        log::info!(
            "Loaded script {} ({} steps)",
            path.display(),
            script.steps.len()
        );
        Ok(script)
    }
}

/// A step that failed. Failures are recoverable; the run continues.
#[derive(Debug)]
pub struct StepFailure {
    /// 1-based step number
    pub index: usize,
    pub action: &'static str,
    pub error: CanvasError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({}): {}", self.index, self.action, self.error)
    }
}

/// Outcome of a script run.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub steps_run: usize,
    pub failures: Vec<StepFailure>,
    /// Auto-save files written while the script ran
    pub autosaves: Vec<PathBuf>,
}

/// Replays scripts against a canvas.
pub struct ScriptRunner<'a> {
    config: &'a Config,
    tasks: Option<&'a mut BackgroundTasks>,
    sink: AutoSaveSink,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            tasks: None,
            sink: config.autosave_sink(),
        }
    }

    /// Services `tasks` between steps, writing auto-saves to the configured sink.
    pub fn with_tasks(mut self, tasks: &'a mut BackgroundTasks) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn run(&mut self, script: &Script, canvas: &mut CanvasManager) -> ScriptReport {
        let mut report = ScriptReport::default();
        for (i, step) in script.steps.iter().enumerate() {
            log::debug!("Step {}: {:?}", i + 1, step);
            if let Err(error) = self.execute(step, canvas, &mut report) {
                log::warn!("Step {} ({}) failed: {error}", i + 1, step.name());
                report.failures.push(StepFailure {
                    index: i + 1,
                    action: step.name(),
                    error,
                });
            }
            report.steps_run += 1;
            self.pump(canvas, &mut report);
        }
        report
    }

    fn pump(&mut self, canvas: &CanvasManager, report: &mut ScriptReport) {
        if let Some(tasks) = self.tasks.as_deref_mut() {
            report.autosaves.extend(tasks.pump(canvas, &self.sink));
        }
    }

    fn execute(
        &mut self,
        step: &Step,
        canvas: &mut CanvasManager,
        report: &mut ScriptReport,
    ) -> Result<(), CanvasError> {
        match step {
            Step::Tool {
                tool,
                text,
                font_family,
                font_size,
                sides,
            } => {
                let params = match tool {
                    Some(ToolMode::Text) => ToolParams::Text {
                        text: text.clone().unwrap_or_default(),
                        font_family: font_family
                            .clone()
                            .unwrap_or_else(|| self.config.drawing.font_family.clone()),
                        font_size: font_size
                            .clone()
                            .unwrap_or_else(|| self.config.drawing.font_size.to_string()),
                    },
                    Some(ToolMode::Polygon) => match sides {
                        Some(sides) => ToolParams::Polygon {
                            sides: sides.clone(),
                        },
                        None => self.config.polygon_params(),
                    },
                    _ => ToolParams::None,
                };
                canvas.set_tool(*tool, params)
            }
            Step::Press { x, y, button } => canvas.pointer_press(*button, *x, *y),
            Step::Drag { x, y } => canvas.pointer_drag(*x, *y),
            Step::Release { x, y, button } => canvas.pointer_release(*button, *x, *y),
            Step::Cancel => {
                canvas.cancel_gesture();
                Ok(())
            }
            Step::Primary { color } => {
                canvas.set_primary_color(color.to_color());
                Ok(())
            }
            Step::Secondary { color } => {
                canvas.set_secondary_color(color.to_color());
                Ok(())
            }
            Step::Width { value } => canvas.set_line_width(*value),
            Step::Zoom { value } => canvas.set_zoom_input(value),
            Step::Fill { enabled } => {
                canvas.set_fill_mode(if *enabled {
                    FillMode::Filled
                } else {
                    FillMode::Outline
                });
                Ok(())
            }
            Step::Undo => canvas.undo(),
            Step::Redo => canvas.redo(),
            Step::Invert => canvas.invert(),
            Step::Resize { width, height } => canvas.resize(*width, *height),
            Step::Open { path } => canvas.load_image_from_file(path),
            Step::Save { path: Some(path) } => canvas.save_canvas_to_file(path),
            Step::Save { path: None } => canvas.save(),
            Step::Wait { ms } => {
                let deadline = Instant::now() + Duration::from_millis(*ms);
                while Instant::now() < deadline {
                    self.pump(canvas, report);
                    let left = deadline.saturating_duration_since(Instant::now());
                    thread::sleep(left.min(PUMP_INTERVAL));
                }
                Ok(())
            }
        }
    }
}
