//! Batchcut - Batch Video Splitter
//!
//! Splits every eligible video file in a source directory into
//! fixed-duration segments by driving ffmpeg as a subprocess.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod planner;
pub mod scan;
