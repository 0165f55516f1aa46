use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use tracing::debug;

use crate::error::{Result, SplitError};

/// Abstract media tool invocation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media tool command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite of an existing output file
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Seek to a start offset in seconds
    pub fn seek(self, seconds: f64) -> Self {
        self.arg("-ss").arg(seconds.to_string())
    }

    /// Limit the output duration in seconds
    pub fn limit_duration(self, seconds: f64) -> Self {
        self.arg("-t").arg(seconds.to_string())
    }

    /// Stream machine-readable progress lines to stdout
    pub fn progress_to_stdout(self) -> Self {
        self.arg("-progress").arg("pipe:1")
    }

    /// Restrict diagnostic output to errors
    pub fn errors_only(self) -> Self {
        self.arg("-v").arg("error")
    }

    /// Run to completion and capture output. Used for probe-style
    /// invocations where all we need is the collected text.
    pub fn capture(&self) -> Result<Output> {
        debug!("Running media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| SplitError::Media(format!("Failed to execute media tool: {}", e)))
    }

    /// Spawn with piped stdout/stderr for streaming reads. Used for
    /// split invocations that report progress while running.
    pub fn spawn_piped(&self) -> Result<Child> {
        debug!("Spawning media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SplitError::Media(format!("Failed to spawn media tool: {}", e)))
    }
}

/// Builder for the fixed invocations this tool uses
#[derive(Clone)]
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build a metadata probe command. The tool writes the header to
    /// stderr and exits non-zero because no output target is given.
    pub fn probe<P: AsRef<Path>>(&self, input: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Duration probe").input(input)
    }

    /// Build a segment split command: re-encode `input` truncated to
    /// `[start, start + length)`, with progress streamed to stdout and
    /// diagnostics limited to errors.
    #[allow(clippy::too_many_arguments)]
    pub fn split_segment<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        start: f64,
        length: f64,
        video_codec: &str,
        audio_codec: &str,
        encode_options: &[String],
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Segment split")
            .input(input)
            .seek(start)
            .limit_duration(length)
            .video_codec(video_codec)
            .audio_codec(audio_codec);

        // User-specified additional encoding options
        for option in encode_options {
            cmd = cmd.arg(option);
        }

        cmd.overwrite()
            .progress_to_stdout()
            .errors_only()
            .output(output)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segment_argument_order() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.split_segment(
            "in.mp4",
            "out_000.mp4",
            30.0,
            30.0,
            "libx264",
            "aac",
            &[],
        );

        assert_eq!(
            cmd.args,
            vec![
                "-i", "in.mp4", "-ss", "30", "-t", "30", "-c:v", "libx264", "-c:a", "aac", "-y",
                "-progress", "pipe:1", "-v", "error", "out_000.mp4",
            ]
        );
    }

    #[test]
    fn test_encode_options_are_inserted_before_output() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let options = vec!["-preset".to_string(), "fast".to_string()];
        let cmd = builder.split_segment("in.mp4", "out.mp4", 0.0, 10.0, "libx264", "aac", &options);

        let preset_pos = cmd.args.iter().position(|a| a == "-preset").unwrap();
        let output_pos = cmd.args.iter().position(|a| a == "out.mp4").unwrap();
        assert!(preset_pos < output_pos);
    }

    #[test]
    fn test_probe_command_has_no_output_target() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.probe("clip.mkv");
        assert_eq!(cmd.args, vec!["-i", "clip.mkv"]);
    }
}
