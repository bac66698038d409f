use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A playable file: a title derived from its file name and its absolute path.
///
/// Two tracks are the same track when their paths are equal; the title does
/// not take part in comparisons.
#[derive(Debug, Clone)]
pub struct Track {
    title: String,
    path: PathBuf,
}

impl Track {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }

    /// Build a track from a file whose name ends with `.{extension}`.
    ///
    /// The title is the file name with that suffix cut off by length (the
    /// suffix is matched case-insensitively by the scanner, so `SONG.MP3`
    /// becomes `SONG`). The path is made absolute when possible.
    ///
    /// # Panics
    ///
    /// Panics if the file name is shorter than the suffix. Callers only pass
    /// names they already matched against the extension.
    pub fn from_file(path: &Path, extension: &str) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix_len = extension.trim_start_matches('.').len() + 1;
        let title = name[..name.len() - suffix_len].to_string();

        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        Self { title, path }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}
