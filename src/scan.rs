use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Video file extensions eligible for splitting. Single source of truth
/// for the batch enumeration and the `scan` command.
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "m4v", "webm"];

/// Case-insensitive extension check against the allow-list.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Find eligible video files directly inside `dir` (non-recursive), in
/// sorted order. A missing or unreadable directory yields an empty list;
/// callers that need a hard error check the directory up front.
pub fn find_video_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_video_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(is_video_file(Path::new("clip.mp4")));
        assert!(is_video_file(Path::new("clip.MOV")));
        assert!(is_video_file(Path::new("clip.WebM")));
        assert!(!is_video_file(Path::new("clip.txt")));
        assert!(!is_video_file(Path::new("clip.mp3")));
        assert!(!is_video_file(Path::new("clip")));
    }

    #[test]
    fn test_scan_is_sorted_and_non_recursive() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("b.mov")).unwrap();
        File::create(dir.path().join("a.mp4")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        File::create(nested.join("deep.mp4")).unwrap();

        let files = find_video_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.mp4", "b.mov"]);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(find_video_files(&missing).is_empty());
    }
}
