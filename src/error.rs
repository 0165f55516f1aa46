use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media tool error: {0}")]
    Media(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Segment error: {0}")]
    Segment(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid segment length: {0} (must be greater than zero)")]
    InvalidSegmentLength(f64),

    #[error("Batch error: {0}")]
    Batch(String),
}

pub type Result<T> = std::result::Result<T, SplitError>;
