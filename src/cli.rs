use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split every video in a source directory into fixed-length segments
    Split {
        /// Source directory containing video files
        #[arg(short, long)]
        source_dir: PathBuf,

        /// Output directory for segments (created if absent)
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Segment length in seconds (overrides the configured default)
        #[arg(short = 'l', long)]
        segment_length: Option<f64>,
    },

    /// Print the detected duration of a single video file
    Probe {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the eligible video files in a directory
    Scan {
        /// Directory to scan
        #[arg(short, long)]
        dir: PathBuf,
    },
}
