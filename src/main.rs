//! Batchcut - Batch Video Splitter
//!
//! This is the main entry point for the batchcut application, which
//! splits every video file in a source folder into fixed-length segments
//! using ffmpeg.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use batchcut::batch::{BatchController, SplitEvent, SplitJob};
use batchcut::cli::{Args, Commands};
use batchcut::config::Config;
use batchcut::media::{MediaToolFactory, MediaToolTrait};
use batchcut::scan::find_video_files;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                // First run: persist the defaults so they are editable.
                let config = Config::default();
                match config.save_to_file("config.toml") {
                    Ok(()) => info!("Wrote default config.toml"),
                    Err(e) => warn!("Could not write default config.toml: {}", e),
                }
                config
            }
        }
    };

    let tool: Arc<dyn MediaToolTrait> = Arc::from(MediaToolFactory::create_tool(config.media.clone()));

    // Environment check: a missing media tool is fatal before any work.
    if let Err(e) = tool.check_availability() {
        eprintln!("ffmpeg is not available: {}", e);
        eprintln!("Install ffmpeg and make sure its bin directory is on the search path, then retry.");
        std::process::exit(1);
    }
    match tool.version_info().await {
        Ok(version) => info!("Media tool: {}", version),
        Err(e) => warn!("Could not read media tool version: {}", e),
    }

    match args.command {
        Commands::Split {
            source_dir,
            output_dir,
            segment_length,
        } => {
            let segment_length = segment_length.unwrap_or(config.split.segment_length);
            run_split(tool, source_dir, output_dir, segment_length).await?;
        }
        Commands::Probe { input } => {
            let duration = tool.probe_duration(&input).await?;
            println!("{}: {:.2}s", input.display(), duration);
        }
        Commands::Scan { dir } => {
            if !dir.is_dir() {
                anyhow::bail!("Not a directory: {}", dir.display());
            }
            let files = find_video_files(&dir);
            if files.is_empty() {
                println!("No supported video files found in {}", dir.display());
            } else {
                for file in files {
                    println!("{}", file.display());
                }
            }
        }
    }

    Ok(())
}

/// Run one batch split, driving a progress bar and the log output from
/// the controller's event stream. Ctrl-C requests a cooperative stop.
async fn run_split(
    tool: Arc<dyn MediaToolTrait>,
    source_dir: PathBuf,
    output_dir: PathBuf,
    segment_length: f64,
) -> Result<()> {
    // Pre-flight input checks, surfaced before any work starts.
    if !source_dir.is_dir() {
        anyhow::bail!("Source directory does not exist: {}", source_dir.display());
    }
    if find_video_files(&source_dir).is_empty() {
        anyhow::bail!(
            "No supported video files found in {}",
            source_dir.display()
        );
    }

    let controller = Arc::new(BatchController::new(tool));
    let job = SplitJob {
        source_dir,
        output_dir,
        segment_length,
    };
    let (handle, mut events) = controller.start(job)?;

    let stop_controller = Arc::clone(&controller);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stop requested, terminating current segment...");
            stop_controller.stop();
        }
    });

    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::with_template(
        "[{bar:40.cyan/blue}] {pos:>3}%",
    )?);

    while let Some(event) = events.recv().await {
        match event {
            SplitEvent::Progress(percent) => bar.set_position(percent as u64),
            SplitEvent::Log(message) => bar.println(message),
            SplitEvent::Finished => break,
        }
    }

    bar.finish_and_clear();
    handle.await?;
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let app_dir = std::env::current_dir()?.join(".batchcut");
    let log_dir = app_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "batchcut.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer().with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_ansi(false); // No ANSI colors in file

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
