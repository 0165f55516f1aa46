use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, SplitError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub split: SplitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Video codec for re-encoded segments
    pub video_codec: String,
    /// Audio codec for re-encoded segments
    pub audio_codec: String,
    /// Additional encoding options inserted before the output path
    /// Common options: ["-preset", "medium", "-crf", "23"]
    /// - preset: encoding speed (ultrafast, fast, medium, slow, veryslow)
    /// - crf: quality (0-51, lower = better quality, 23 is default)
    pub encode_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Default segment length in seconds when not given on the command line
    pub segment_length: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                video_codec: "libx264".to_string(),
                audio_codec: "aac".to_string(),
                encode_options: vec![],
            },
            split: SplitConfig {
                segment_length: 30.0,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SplitError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SplitError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SplitError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.media.binary_path, "ffmpeg");
        assert_eq!(parsed.media.video_codec, "libx264");
        assert_eq!(parsed.media.audio_codec, "aac");
        assert_eq!(parsed.split.segment_length, 30.0);
    }

    #[test]
    fn test_save_and_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.media.encode_options = vec!["-preset".to_string(), "fast".to_string()];
        config.split.segment_length = 12.5;
        config.save_to_file(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.media.encode_options, vec!["-preset", "fast"]);
        assert_eq!(reloaded.split.segment_length, 12.5);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = Config::from_file("no-such-config.toml");
        assert!(matches!(result, Err(SplitError::Config(_))));
    }
}
