use anyhow::Context;
use clap::{ArgAction, Parser};
use rasterpad::canvas::{CanvasManager, CanvasOptions};
use rasterpad::config::Config;
use rasterpad::script::{Script, ScriptRunner};
use rasterpad::tasks::BackgroundTasks;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rasterpad")]
#[command(version, about = "Raster drawing engine with tools, gestures and undo history")]
struct Cli {
    /// Config file to use instead of ~/.config/rasterpad/config.toml
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image to open (png, bmp or jpg)
    #[arg(long, value_name = "IMAGE")]
    open: Option<PathBuf>,

    /// Width of a new canvas
    #[arg(long, value_name = "PX", requires = "height")]
    width: Option<i32>,

    /// Height of a new canvas
    #[arg(long, value_name = "PX", requires = "width")]
    height: Option<i32>,

    /// Gesture script to replay (TOML with [[step]] tables)
    #[arg(long, short = 's', value_name = "FILE")]
    script: Option<PathBuf>,

    /// Save the final canvas to this image
    #[arg(long, value_name = "IMAGE")]
    output: Option<PathBuf>,

    /// Enable periodic auto-save while the script runs
    #[arg(long, action = ArgAction::SetTrue)]
    autosave: bool,

    /// File tool switches are logged to (default: log.txt)
    #[arg(long, value_name = "FILE")]
    tool_log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.script.is_none() && cli.open.is_none() && cli.output.is_none() {
        // No work requested: show usage
        println!("rasterpad: Raster drawing engine with tools, gestures and undo history");
        println!();
        println!("Usage:");
        println!("  rasterpad --script steps.toml --output out.png   Replay a gesture script");
        println!("  rasterpad --open in.png --output out.bmp         Convert an image");
        println!("  rasterpad --help                                 Show help");
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        config.canvas.width = width;
        config.canvas.height = height;
    }
    if cli.autosave {
        config.autosave.enabled = true;
    }
    if let Some(path) = cli.tool_log {
        config.logging.tool_log_path = path;
    }

    let mut canvas = CanvasManager::new(CanvasOptions::from_config(&config))
        .context("Failed to create canvas")?;
    if let Some(path) = &cli.open {
        canvas
            .load_image_from_file(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
    }

    let mut tasks = BackgroundTasks::start(config.task_options(), canvas.change_signal())?;

    if let Some(path) = &cli.script {
        let script = Script::load(path)?;
        let report = ScriptRunner::new(&config)
            .with_tasks(&mut tasks)
            .run(&script, &mut canvas);

        for failure in &report.failures {
            eprintln!("warning: {failure}");
        }
        for saved in &report.autosaves {
            println!("Auto-saved {}", saved.display());
        }
        println!(
            "Ran {} steps ({} failed)",
            report.steps_run,
            report.failures.len()
        );
    }

    tasks.shutdown();

    if let Some(path) = &cli.output {
        canvas
            .save_canvas_to_file(path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        println!("Saved {}", path.display());
    }

    println!("{}", canvas.status());
    Ok(())
}
