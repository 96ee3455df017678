//! Background tasks: the auto-save countdown and the tool-change watcher.
//!
//! Both run on one dedicated thread that owns a current-thread Tokio runtime.
//! Neither touches the canvas: the countdown only sends [`TaskEvent`]s, and the
//! UI context acts on them in [`BackgroundTasks::pump`]. Snapshots are therefore
//! always taken between gestures, never from a half-drawn frame.

mod autosave;
mod tool_log;

pub use tool_log::ToolChangeLogger;

use crate::canvas::{AutoSaveSink, CanvasManager};
use crate::error::TaskError;
use crate::input::ToolChangeSignal;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Messages sent from the background thread to the UI context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// Seconds left until the next auto-save
    Countdown(u64),
    /// Time to write a snapshot
    AutoSaveDue,
}

/// Which tasks to run and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOptions {
    /// Auto-save period in countdown ticks (`None` disables auto-save)
    pub autosave_interval: Option<u64>,
    /// Length of one countdown tick
    pub countdown_tick: Duration,
    /// Tool log file (`None` disables the watcher)
    pub tool_log_path: Option<PathBuf>,
    /// How often the watcher polls the changed-flag
    pub poll_interval: Duration,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            autosave_interval: Some(10),
            countdown_tick: Duration::from_secs(1),
            tool_log_path: Some(PathBuf::from("log.txt")),
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// Handle to the running background thread.
#[derive(Debug)]
pub struct BackgroundTasks {
    events: Receiver<TaskEvent>,
    shutdown: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
    countdown: Option<u64>,
}

impl BackgroundTasks {
    /// Spawns the background thread and waits until its runtime is up.
    pub fn start(options: TaskOptions, signal: Arc<ToolChangeSignal>) -> Result<Self, TaskError> {
        let (event_tx, event_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        let logger = options
            .tool_log_path
            .clone()
            .map(|path| ToolChangeLogger::new(signal, path));

        let thread = thread::Builder::new()
            .name("rasterpad-tasks".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                rt.block_on(async move {
                    let autosave = async {
                        let Some(seconds) = options.autosave_interval else {
                            return;
                        };
                        log::info!("Auto-save every {seconds} ticks");
                        match autosave::run_countdown(
                            seconds,
                            options.countdown_tick,
                            event_tx,
                            shutdown_rx.clone(),
                        )
                        .await
                        {
                            Ok(()) => log::debug!("Auto-save receiver gone"),
                            Err(TaskError::Interrupted) => {
                                log::debug!("Auto-save countdown interrupted by shutdown")
                            }
                            Err(e) => log::warn!("Auto-save countdown failed: {e}"),
                        }
                    };
                    let watcher = async {
                        let Some(logger) = logger else {
                            return;
                        };
                        watch_tool_changes(logger, options.poll_interval, shutdown_rx.clone())
                            .await;
                    };
                    tokio::join!(autosave, watcher);
                });
            })
            .map_err(|e| TaskError::Startup(e.to_string()))?;

        match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(())) => {
                log::info!("Background tasks started");
                Ok(Self {
                    events: event_rx,
                    shutdown: shutdown_tx,
                    thread: Some(thread),
                    countdown: None,
                })
            }
            Ok(Err(message)) => {
                let _ = thread.join();
                Err(TaskError::Startup(message))
            }
            Err(_) => {
                let _ = shutdown_tx.send(true);
                Err(TaskError::Startup(
                    "background thread did not signal readiness".to_string(),
                ))
            }
        }
    }

    /// Drains pending events on the UI context, writing due auto-saves to `sink`.
    ///
    /// Returns the paths written. A failed auto-save is logged and skipped.
    pub fn pump(&mut self, canvas: &CanvasManager, sink: &AutoSaveSink) -> Vec<PathBuf> {
        let mut written = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(TaskEvent::Countdown(remaining)) => {
                    log::trace!("Auto-save in {remaining}");
                    self.countdown = Some(remaining);
                }
                Ok(TaskEvent::AutoSaveDue) => {
                    self.countdown = None;
                    let result = sink
                        .next_path()
                        .map_err(Into::into)
                        .and_then(|path| canvas.send_snapshot_to_file(&path).map(|()| path));
                    match result {
                        Ok(path) => {
                            log::info!("Auto-saved to {}", path.display());
                            written.push(path);
                        }
                        Err(e) => log::warn!("Auto-save failed: {e}"),
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        written
    }

    /// Seconds until the next auto-save, as last reported.
    pub fn countdown(&self) -> Option<u64> {
        self.countdown
    }

    /// Signals shutdown and waits for the thread to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Background task thread panicked");
            } else {
                log::debug!("Background tasks stopped");
            }
        }
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Polls the changed-flag until shutdown, with one final poll on the way out.
async fn watch_tool_changes(
    logger: ToolChangeLogger,
    poll: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    log::info!(
        "Logging tool changes to {} every {:?}",
        logger.path().display(),
        poll
    );
    let mut ticker = interval(poll.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = logger.poll_once() {
                    log::warn!("Tool change log failed: {e}");
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    if let Err(e) = logger.poll_once() {
        log::warn!("Tool change log failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasOptions;
    use crate::input::{ToolMode, ToolParams};
    use std::fs;
    use std::time::Instant;

    fn small_canvas() -> CanvasManager {
        CanvasManager::new(CanvasOptions {
            width: 8,
            height: 8,
            ..CanvasOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn autosave_writes_snapshot_on_ui_side() {
        let dir = tempfile::tempdir().unwrap();
        let canvas = small_canvas();
        let sink = AutoSaveSink::new(dir.path(), "snap", "png");
        let options = TaskOptions {
            autosave_interval: Some(2),
            countdown_tick: Duration::from_millis(10),
            tool_log_path: None,
            ..TaskOptions::default()
        };
        let mut tasks = BackgroundTasks::start(options, canvas.change_signal()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut written = Vec::new();
        while written.is_empty() && Instant::now() < deadline {
            written = tasks.pump(&canvas, &sink);
            thread::sleep(Duration::from_millis(5));
        }
        tasks.shutdown();

        assert_eq!(written.len(), 1);
        assert!(written[0].exists());
        assert_eq!(canvas.history().undo_depth(), 0);
        assert_eq!(canvas.opened_file(), None);
    }

    #[test]
    fn watcher_logs_tool_switches() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.txt");
        let mut canvas = small_canvas();
        canvas
            .set_tool(Some(ToolMode::Pencil), ToolParams::None)
            .unwrap();
        canvas.tool_state().acknowledge_change();

        let options = TaskOptions {
            autosave_interval: None,
            tool_log_path: Some(log_path.clone()),
            poll_interval: Duration::from_millis(2),
            ..TaskOptions::default()
        };
        let tasks = BackgroundTasks::start(options, canvas.change_signal()).unwrap();

        canvas.set_tool(Some(ToolMode::Line), ToolParams::None).unwrap();
        thread::sleep(Duration::from_millis(100));
        canvas
            .set_tool(Some(ToolMode::Pencil), ToolParams::None)
            .unwrap();
        thread::sleep(Duration::from_millis(100));
        tasks.shutdown();

        let contents = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2, "{contents}");
        assert!(lines[0].ends_with("Tool switched to Line"));
        assert!(lines[1].ends_with("Tool switched to Pencil"));
    }

    #[test]
    fn shutdown_interrupts_long_countdown() {
        let canvas = small_canvas();
        let options = TaskOptions {
            autosave_interval: Some(3600),
            tool_log_path: None,
            ..TaskOptions::default()
        };
        let tasks = BackgroundTasks::start(options, canvas.change_signal()).unwrap();
        let started = Instant::now();
        tasks.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
