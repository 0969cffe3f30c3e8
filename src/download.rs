// Exporting cleaned text as a plain-text file.

use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name used when the result came from typed text.
pub const DEFAULT_DOWNLOAD_NAME: &str = "cleaned-text.txt";

/// Suffix that replaces the original file's extension.
pub const CLEAN_EXTENSION: &str = "clean.txt";

pub trait DownloadSink {
    /// Store `contents` under the suggested `filename`, returning where it went.
    fn save(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf>;
}

/// `notes.txt` → `notes.clean.txt`, `README` → `README.clean.txt`, typed
/// text → [`DEFAULT_DOWNLOAD_NAME`]. Directory parts of the original name
/// are dropped.
pub fn download_name(original: Option<&str>) -> String {
    let name = original
        .map(Path::new)
        .and_then(Path::file_name)
        .map(Path::new);
    match name {
        Some(name) => name.with_extension(CLEAN_EXTENSION).to_string_lossy().into_owned(),
        None => DEFAULT_DOWNLOAD_NAME.to_string(),
    }
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, contents)?;
        info!(path = %path.display(), bytes = contents.len(), "download written");
        Ok(path)
    }
}
