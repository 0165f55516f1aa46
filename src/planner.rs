use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// One planned output clip. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    /// Start offset in seconds.
    pub start: f64,
    /// Requested length in seconds. The media tool truncates at
    /// end-of-stream, so the final segment may come out shorter.
    pub length: f64,
}

/// Plan fixed-length segments for a video of `duration` seconds.
///
/// Segment count is `floor(duration / chunk_length) + 1`. When the
/// duration divides evenly this requests one extra segment starting at
/// end-of-stream; the media tool then writes a tiny or empty file. That
/// matches the historical behavior and is kept as-is.
pub fn plan_segments(duration: f64, chunk_length: f64) -> Result<Vec<Segment>> {
    if chunk_length <= 0.0 {
        return Err(SplitError::InvalidSegmentLength(chunk_length));
    }

    let count = (duration / chunk_length).floor() as usize + 1;
    Ok((0..count)
        .map(|index| Segment {
            index,
            start: index as f64 * chunk_length,
            length: chunk_length,
        })
        .collect())
}

/// Output file name for a segment: `<stem>_<NNN>.mp4`, regardless of the
/// source extension.
pub fn segment_file_name(stem: &str, index: usize) -> String {
    format!("{}_{:03}.mp4", stem, index)
}

/// Full output path for segment `index` of `input` inside `output_dir`.
pub fn segment_output_path(input: &Path, output_dir: &Path, index: usize) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SplitError::Config(format!("Invalid video filename: {}", input.display())))?;

    Ok(output_dir.join(segment_file_name(stem, index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_count_is_floor_plus_one() {
        for (duration, chunk, expected) in [
            (0.0, 30.0, 1),
            (10.0, 30.0, 1),
            (65.0, 30.0, 3),
            (30.0, 30.0, 2),
            (90.0, 30.0, 4),
            (29.9, 30.0, 1),
        ] {
            let segments = plan_segments(duration, chunk).unwrap();
            assert_eq!(segments.len(), expected, "D={} L={}", duration, chunk);
        }
    }

    #[test]
    fn test_offsets_are_strictly_increasing_multiples() {
        let segments = plan_segments(65.0, 30.0).unwrap();
        let starts: Vec<f64> = segments.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, 30.0, 60.0]);

        for pair in segments.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert_eq!(pair[1].start - pair[0].start, pair[0].length);
        }
    }

    #[test]
    fn test_requested_length_is_always_chunk_length() {
        let segments = plan_segments(65.0, 30.0).unwrap();
        assert!(segments.iter().all(|s| s.length == 30.0));
    }

    #[test]
    fn test_non_positive_chunk_length_is_rejected() {
        assert!(matches!(
            plan_segments(65.0, 0.0),
            Err(SplitError::InvalidSegmentLength(_))
        ));
        assert!(matches!(
            plan_segments(65.0, -5.0),
            Err(SplitError::InvalidSegmentLength(_))
        ));
    }

    #[test]
    fn test_segment_file_names_are_zero_padded_and_unique() {
        assert_eq!(segment_file_name("clip", 0), "clip_000.mp4");
        assert_eq!(segment_file_name("clip", 12), "clip_012.mp4");
        assert_eq!(segment_file_name("clip", 123), "clip_123.mp4");

        let names: Vec<String> = (0..50).map(|i| segment_file_name("clip", i)).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_output_path_ignores_source_extension() {
        let path =
            segment_output_path(Path::new("/videos/holiday.webm"), Path::new("/out"), 1).unwrap();
        assert_eq!(path, PathBuf::from("/out/holiday_001.mp4"));
    }
}
