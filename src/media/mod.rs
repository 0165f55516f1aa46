// Media tool orchestration: probing, splitting, and process control.
//
// - commands: invocation builders for the external tool
// - probe: duration detection from diagnostic output
// - splitter: per-segment execution with streamed progress

pub mod commands;
pub mod probe;
pub mod splitter;

use async_trait::async_trait;
use std::path::Path;
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub use commands::*;
pub use probe::*;
pub use splitter::*;

use crate::config::MediaConfig;
use crate::error::{Result, SplitError};
use crate::planner::Segment;

/// Shared callback for percent-of-segment progress values.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Main trait for external media tool operations
#[async_trait]
pub trait MediaToolTrait: Send + Sync {
    /// Check that the media tool binary is runnable
    fn check_availability(&self) -> Result<()>;

    /// Get the media tool version line
    async fn version_info(&self) -> Result<String>;

    /// Detected duration of a video file in seconds
    async fn probe_duration(&self, input: &Path) -> Result<f64>;

    /// Split one segment out of `input`, reporting percent-of-segment
    /// progress through the callback
    async fn split_segment(
        &self,
        input: &Path,
        output: &Path,
        segment: &Segment,
        control: Arc<ProcessControl>,
        on_progress: ProgressFn,
    ) -> Result<()>;
}

/// Factory for media tool instances
pub struct MediaToolFactory;

impl MediaToolFactory {
    /// Create the default media tool implementation (ffmpeg-based)
    pub fn create_tool(config: MediaConfig) -> Box<dyn MediaToolTrait> {
        Box::new(FfmpegTool::new(config))
    }
}

/// FFmpeg-backed implementation
pub struct FfmpegTool {
    probe: DurationProbe,
    builder: MediaCommandBuilder,
    splitter: SegmentSplitter,
}

impl FfmpegTool {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            probe: DurationProbe::new(&config),
            builder: MediaCommandBuilder::new(&config.binary_path),
            splitter: SegmentSplitter::new(config),
        }
    }
}

/// The subprocess calls below block on pipe reads and `wait`, so each
/// async method hands its synchronous body to `spawn_blocking` instead
/// of stalling a runtime worker for the whole invocation.
#[async_trait]
impl MediaToolTrait for FfmpegTool {
    fn check_availability(&self) -> Result<()> {
        let output = self.builder.version_check().capture()?;

        if output.status.success() {
            info!("Media tool is available");
            Ok(())
        } else {
            Err(SplitError::Media("Media tool version check failed".to_string()))
        }
    }

    async fn version_info(&self) -> Result<String> {
        let builder = self.builder.clone();
        run_blocking(move || {
            let output = builder.version_check().capture()?;

            if output.status.success() {
                let version_info = String::from_utf8_lossy(&output.stdout);
                // The first line typically contains the version
                let first_line = version_info.lines().next().unwrap_or("Unknown version");
                Ok(first_line.to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(SplitError::Media(format!(
                    "Media tool version check failed: {}",
                    stderr
                )))
            }
        })
        .await
    }

    async fn probe_duration(&self, input: &Path) -> Result<f64> {
        let probe = self.probe.clone();
        let input = input.to_path_buf();
        run_blocking(move || probe.probe_duration(&input)).await
    }

    async fn split_segment(
        &self,
        input: &Path,
        output: &Path,
        segment: &Segment,
        control: Arc<ProcessControl>,
        on_progress: ProgressFn,
    ) -> Result<()> {
        let splitter = self.splitter.clone();
        let input = input.to_path_buf();
        let output = output.to_path_buf();
        let segment = segment.clone();
        run_blocking(move || {
            splitter.split_segment(&input, &output, &segment, &control, on_progress.as_ref())
        })
        .await
    }
}

/// Run a blocking media tool call on the blocking thread pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SplitError::Media(format!("Media tool task failed: {}", e)))?
}

/// Shared handoff between the control side and the batch worker: the
/// cooperative stop flag plus the handle of the in-flight child process.
/// One side requests the stop while the other polls and mutates, so both
/// live behind atomic/Mutex access.
#[derive(Default)]
pub struct ProcessControl {
    cancelled: AtomicBool,
    current: Mutex<Option<Child>>,
}

impl ProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a cooperative stop has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the stop flag and any stale child handle so the next run
    /// starts clean. Must only be called while no run is in flight.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.current.lock() {
            *slot = None;
        }
    }

    /// Request a cooperative stop and terminate the in-flight child
    /// process, if any. Idempotent; a no-op when nothing is running.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);

        if let Ok(mut slot) = self.current.lock() {
            if let Some(child) = slot.as_mut() {
                if let Err(e) = child.kill() {
                    warn!("Failed to terminate media tool process: {}", e);
                }
            }
        }
    }

    /// Register the currently running child so `cancel` can reach it.
    pub fn register(&self, child: Child) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(child);
        }
    }

    /// Take the child back for the final wait.
    pub fn take(&self) -> Option<Child> {
        self.current.lock().ok().and_then(|mut slot| slot.take())
    }
}
