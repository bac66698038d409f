use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

/// Return the configured extension `path` ends with, compared case-insensitively.
fn matched_extension<'a>(path: &Path, settings: &'a LibrarySettings) -> Option<&'a str> {
    let ext = path.extension().and_then(|s| s.to_str())?;

    settings
        .extensions
        .iter()
        .map(|e| e.trim())
        .find(|e| {
            let e = e.trim_start_matches('.');
            !e.is_empty() && e.eq_ignore_ascii_case(ext)
        })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List the audio files directly inside `dir`.
///
/// Only the directory's own entries are considered and they are returned in
/// the order the filesystem yields them. A missing or unreadable directory
/// produces an empty list.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    info!(dir = %dir.display(), "list music from dir");

    let walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .min_depth(1)
        .max_depth(1);

    let mut tracks: Vec<Track> = Vec::new();
    for entry in walker.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() || (!settings.include_hidden && is_hidden(path)) {
            continue;
        }
        if let Some(ext) = matched_extension(path, settings) {
            tracks.push(Track::from_file(path, ext));
        }
    }

    debug!(count = tracks.len(), "scan finished");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn matched_extension_is_case_insensitive() {
        let settings = LibrarySettings::default();
        assert_eq!(matched_extension(Path::new("/tmp/a.mp3"), &settings), Some("mp3"));
        assert_eq!(matched_extension(Path::new("/tmp/a.MP3"), &settings), Some("mp3"));
        assert_eq!(matched_extension(Path::new("/tmp/a.Mp3"), &settings), Some("mp3"));
        assert_eq!(matched_extension(Path::new("/tmp/a.flac"), &settings), None);
        assert_eq!(matched_extension(Path::new("/tmp/a.txt"), &settings), None);
        assert_eq!(matched_extension(Path::new("/tmp/a"), &settings), None);
    }

    #[test]
    fn matched_extension_accepts_dotted_configuration() {
        let settings = LibrarySettings {
            extensions: vec![".ogg".into(), " FLAC ".into()],
            ..LibrarySettings::default()
        };
        assert!(matched_extension(Path::new("/tmp/a.ogg"), &settings).is_some());
        assert!(matched_extension(Path::new("/tmp/a.flac"), &settings).is_some());
        assert!(matched_extension(Path::new("/tmp/a.mp3"), &settings).is_none());
    }

    #[test]
    fn scan_empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        assert!(scan(dir.path(), &LibrarySettings::default()).is_empty());
    }

    #[test]
    fn scan_missing_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(scan(&missing, &LibrarySettings::default()).is_empty());
    }

    #[test]
    fn scan_keeps_only_matching_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.mp3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title(), "song");
        assert!(tracks[0].path().is_absolute());
        assert!(tracks[0].path().ends_with("song.mp3"));
    }

    #[test]
    fn scan_strips_uppercase_suffix_by_length() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("LOUD.MP3"), b"not real").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title(), "LOUD");
    }

    #[test]
    fn scan_does_not_descend_into_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub.mp3");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title(), "root");
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title(), "visible");
    }
}
