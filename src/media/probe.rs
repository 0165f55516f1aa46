use std::path::Path;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{Result, SplitError};
use super::MediaCommandBuilder;

/// Marker the tool prints when it cannot open the input at all.
const NO_SUCH_FILE_MARKER: &str = "No such file or directory";

/// Duration probe over the media tool's diagnostic output.
#[derive(Clone)]
pub struct DurationProbe {
    builder: MediaCommandBuilder,
}

impl DurationProbe {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            builder: MediaCommandBuilder::new(&config.binary_path),
        }
    }

    /// Detected duration of `input` in seconds. A missing or malformed
    /// `Duration:` header yields 0.0 (the planner then produces a single
    /// segment); a file the tool cannot open at all is reported as a
    /// file-not-found error instead.
    pub fn probe_duration(&self, input: &Path) -> Result<f64> {
        let output = self.builder.probe(input).capture()?;
        let diagnostics = String::from_utf8_lossy(&output.stderr);

        if diagnostics.contains(NO_SUCH_FILE_MARKER) {
            return Err(SplitError::FileNotFound(input.display().to_string()));
        }

        let duration = parse_duration_header(&diagnostics).unwrap_or(0.0);
        debug!("Detected duration of {}: {}s", input.display(), duration);
        Ok(duration)
    }
}

/// Extract the `Duration: HH:MM:SS.cc` token from probe diagnostics.
pub fn parse_duration_header(diagnostics: &str) -> Option<f64> {
    for line in diagnostics.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("Duration: ") {
            let token = rest.split(',').next()?.trim();
            return parse_clock_time(token);
        }
    }
    None
}

/// Parse `HH:MM:SS[.fraction]` into seconds.
pub fn parse_clock_time(token: &str) -> Option<f64> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIAGNOSTICS: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'holiday.mp4':
  Metadata:
    major_brand     : isom
  Duration: 00:01:05.00, start: 0.000000, bitrate: 1205 kb/s
  Stream #0:0(und): Video: h264 (High), yuv420p, 1920x1080";

    #[test]
    fn test_parse_duration_header() {
        assert_eq!(parse_duration_header(SAMPLE_DIAGNOSTICS), Some(65.0));
    }

    #[test]
    fn test_missing_header_yields_none() {
        assert_eq!(parse_duration_header("Input #0, matroska\n  Stream #0:0"), None);
        assert_eq!(parse_duration_header(""), None);
    }

    #[test]
    fn test_unparseable_header_yields_none() {
        assert_eq!(parse_duration_header("  Duration: N/A, bitrate: N/A"), None);
        assert_eq!(parse_duration_header("  Duration: garbage, start: 0"), None);
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(parse_clock_time("00:00:00.00"), Some(0.0));
        assert_eq!(parse_clock_time("00:01:05.00"), Some(65.0));
        assert_eq!(parse_clock_time("01:01:01.50"), Some(3661.5));
        assert_eq!(parse_clock_time("10:00:00"), Some(36000.0));
        assert_eq!(parse_clock_time("N/A"), None);
        assert_eq!(parse_clock_time("05:00"), None);
        assert_eq!(parse_clock_time(""), None);
    }
}
