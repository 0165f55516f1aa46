use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::error::{Result, SplitError};
use crate::planner::Segment;
use super::probe::parse_clock_time;
use super::{MediaCommandBuilder, ProcessControl};

/// Segment executor: runs one media tool re-encode per planned segment
/// and translates the machine-readable progress stream into
/// percent-of-segment callbacks.
#[derive(Clone)]
pub struct SegmentSplitter {
    config: MediaConfig,
    builder: MediaCommandBuilder,
}

impl SegmentSplitter {
    pub fn new(config: MediaConfig) -> Self {
        let builder = MediaCommandBuilder::new(&config.binary_path);
        Self { config, builder }
    }

    /// Run one segment to completion. Percent values in [0, 100] are
    /// reported through `on_progress`; the child handle is registered
    /// with `control` so a concurrent stop request can terminate it.
    ///
    /// A non-zero exit with diagnostic text is a segment error. A stop
    /// mid-segment is not an error: the partial output file is removed
    /// and the function returns Ok.
    pub fn split_segment(
        &self,
        input: &Path,
        output: &Path,
        segment: &Segment,
        control: &ProcessControl,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<()> {
        let command = self.builder.split_segment(
            input,
            output,
            segment.start,
            segment.length,
            &self.config.video_codec,
            &self.config.audio_codec,
            &self.config.encode_options,
        );

        let mut child = command.spawn_piped()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SplitError::Media("Media tool stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SplitError::Media("Media tool stderr was not captured".to_string()))?;

        control.register(child);
        // A stop request between spawn and register would miss the child;
        // re-issuing the cancel here closes that window.
        if control.is_cancelled() {
            control.cancel();
        }

        // Drain stderr on the side so the pipe cannot fill up while we
        // block on the progress stream. With errors-only diagnostics it
        // stays empty unless the tool fails.
        let stderr_reader = std::thread::spawn(move || {
            let mut diagnostics = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut diagnostics);
            diagnostics
        });

        for line in BufReader::new(stdout).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read media tool progress stream: {}", e);
                    break;
                }
            };

            if let Some(elapsed) = parse_out_time(&line) {
                let percent = (elapsed / segment.length * 100.0).clamp(0.0, 100.0);
                on_progress(percent);
            }
        }

        let diagnostics = stderr_reader.join().unwrap_or_default();

        let status = match control.take() {
            Some(mut child) => child.wait()?,
            // The control side never removes the handle, so this only
            // happens if the slot was poisoned.
            None => return Err(SplitError::Media("Lost media tool process handle".to_string())),
        };

        if control.is_cancelled() && !status.success() {
            // Stopped mid-segment; a truncated re-encode is not a usable
            // clip, so drop it rather than leave it looking complete.
            if let Err(e) = std::fs::remove_file(output) {
                debug!("Could not remove partial segment {}: {}", output.display(), e);
            }
            return Ok(());
        }

        if !status.success() && !diagnostics.trim().is_empty() {
            return Err(SplitError::Segment(format!(
                "Media tool exited with {}: {}",
                status,
                diagnostics.trim()
            )));
        }

        on_progress(100.0);
        Ok(())
    }
}

/// Parse an `out_time=HH:MM:SS.mmm` progress line into elapsed seconds.
/// Other keys, the `N/A` sentinel, and malformed values yield None.
pub fn parse_out_time(line: &str) -> Option<f64> {
    let value = line.strip_prefix("out_time=")?.trim();
    if value == "N/A" {
        return None;
    }
    parse_clock_time(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_out_time() {
        assert_eq!(parse_out_time("out_time=00:00:15.500000"), Some(15.5));
        assert_eq!(parse_out_time("out_time=00:01:05.000000"), Some(65.0));
        assert_eq!(parse_out_time("out_time=01:00:00.000000"), Some(3600.0));
    }

    #[test]
    fn test_sentinel_and_malformed_values_are_ignored() {
        assert_eq!(parse_out_time("out_time=N/A"), None);
        assert_eq!(parse_out_time("out_time=garbage"), None);
        assert_eq!(parse_out_time("out_time="), None);
    }

    #[test]
    fn test_other_progress_keys_are_ignored() {
        assert_eq!(parse_out_time("frame=100"), None);
        assert_eq!(parse_out_time("out_time_us=15500000"), None);
        assert_eq!(parse_out_time("out_time_ms=15500000"), None);
        assert_eq!(parse_out_time("speed=2.5x"), None);
        assert_eq!(parse_out_time("progress=continue"), None);
    }
}
