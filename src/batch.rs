use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Result, SplitError};
use crate::media::{MediaToolTrait, ProcessControl, ProgressFn};
use crate::planner::{plan_segments, segment_output_path};
use crate::scan::find_video_files;

/// Events delivered to the presentation layer, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitEvent {
    /// Combined progress across all files, 0-100.
    Progress(u8),
    /// Human-readable line for the log pane.
    Log(String),
    /// Batch finished, completed or stopped. Emitted exactly once.
    Finished,
}

/// One batch run over a source directory.
#[derive(Debug, Clone)]
pub struct SplitJob {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Configured segment length in seconds, always positive.
    pub segment_length: f64,
}

/// Sequences per-file splitting on one background worker and forwards
/// progress, log, and completion events to the presentation layer. The
/// control side only ever touches the stop flag and the in-flight
/// process handle, both shared through [`ProcessControl`].
pub struct BatchController {
    tool: Arc<dyn MediaToolTrait>,
    control: Arc<ProcessControl>,
    running: Arc<AtomicBool>,
}

impl BatchController {
    pub fn new(tool: Arc<dyn MediaToolTrait>) -> Self {
        Self {
            tool,
            control: Arc::new(ProcessControl::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the batch worker and hand back the event stream. Fails when
    /// a batch is already running on this controller or the segment
    /// length is not positive.
    pub fn start(&self, job: SplitJob) -> Result<(JoinHandle<()>, UnboundedReceiver<SplitEvent>)> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SplitError::Batch("A batch is already running".to_string()));
        }

        if job.segment_length <= 0.0 {
            self.running.store(false, Ordering::SeqCst);
            return Err(SplitError::InvalidSegmentLength(job.segment_length));
        }

        // A stop request from an earlier run must not bleed into this one.
        self.control.reset();

        let (tx, rx) = mpsc::unbounded_channel();
        let tool = Arc::clone(&self.tool);
        let control = Arc::clone(&self.control);
        let running = Arc::clone(&self.running);

        let handle = tokio::spawn(async move {
            run_batch(tool.as_ref(), &control, &job, &tx).await;
            running.store(false, Ordering::SeqCst);
        });

        Ok((handle, rx))
    }

    /// Request a cooperative stop: no new file or segment is started, and
    /// the in-flight media tool process is terminated. Idempotent; calling
    /// it after completion does nothing.
    pub fn stop(&self) {
        self.control.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Worker body for one batch run. Emits `Finished` exactly once on every
/// exit path; everything below the batch level is logged and skipped,
/// never fatal.
pub async fn run_batch(
    tool: &dyn MediaToolTrait,
    control: &Arc<ProcessControl>,
    job: &SplitJob,
    events: &UnboundedSender<SplitEvent>,
) {
    let files = find_video_files(&job.source_dir);
    info!(
        "Found {} eligible video files in {}",
        files.len(),
        job.source_dir.display()
    );

    if files.is_empty() {
        send_log(events, "No supported video files found".to_string());
        send(events, SplitEvent::Finished);
        return;
    }

    if let Err(e) = std::fs::create_dir_all(&job.output_dir) {
        send_log(events, format!("Failed to create output directory: {}", e));
        send(events, SplitEvent::Finished);
        return;
    }

    let total_files = files.len();
    for (file_index, input) in files.iter().enumerate() {
        if control.is_cancelled() {
            break;
        }

        send_log(
            events,
            format!(
                "Processing file {}/{}: {}",
                file_index + 1,
                total_files,
                input.display()
            ),
        );

        if let Err(e) = split_file(tool, control, job, events, input, file_index, total_files).await
        {
            send_log(events, format!("Failed to process {}: {}", input.display(), e));
        }
    }

    if control.is_cancelled() {
        send_log(events, "Splitting stopped".to_string());
    }
    send(events, SplitEvent::Finished);
}

/// Probe, plan, and execute all segments of one file. Segment failures
/// are logged and the remaining segments continue.
async fn split_file(
    tool: &dyn MediaToolTrait,
    control: &Arc<ProcessControl>,
    job: &SplitJob,
    events: &UnboundedSender<SplitEvent>,
    input: &Path,
    file_index: usize,
    total_files: usize,
) -> Result<()> {
    let duration = tool.probe_duration(input).await?;
    let segments = plan_segments(duration, job.segment_length)?;
    let total_segments = segments.len();

    send_log(
        events,
        format!(
            "Detected duration {:.1}s, splitting into {} segments",
            duration, total_segments
        ),
    );

    for segment in &segments {
        if control.is_cancelled() {
            break;
        }

        let output = segment_output_path(input, &job.output_dir, segment.index)?;
        let segment_number = segment.index + 1;

        let progress_events = events.clone();
        let on_progress: ProgressFn = Arc::new(move |percent: f64| {
            let _ = progress_events.send(SplitEvent::Log(format!(
                "Writing segment {}/{}... ({:.1}%)",
                segment_number, total_segments, percent
            )));
        });

        if let Err(e) = tool
            .split_segment(input, &output, segment, Arc::clone(control), on_progress)
            .await
        {
            send_log(events, format!("Segment {} failed: {}", segment_number, e));
        }

        let overall = (100.0
            * (file_index as f64 + segment_number as f64 / total_segments as f64)
            / total_files as f64)
            .floor() as u8;
        send(events, SplitEvent::Progress(overall));
    }

    if !control.is_cancelled() {
        send_log(events, format!("Finished splitting {}", input.display()));
    }
    Ok(())
}

fn send(events: &UnboundedSender<SplitEvent>, event: SplitEvent) {
    if events.send(event).is_err() {
        debug!("Event receiver dropped; discarding batch event");
    }
}

fn send_log(events: &UnboundedSender<SplitEvent>, message: String) {
    send(events, SplitEvent::Log(message));
}
