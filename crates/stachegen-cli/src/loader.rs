//! Partial loading from the filesystem

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stachegen_core::PartialLoader;
use tracing::debug;

/// Loads partial `NAME` from `DIR/NAME.EXT`
///
/// A partial with no file behind it loads as the empty template, so a
/// reference to it renders nothing. Other I/O failures are errors.
#[derive(Debug, Clone)]
pub struct FileLoader {
    dir: PathBuf,
    extension: String,
}

impl FileLoader {
    /// Loader rooted at `dir` for files ending in `.extension`
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Directory partials are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a partial name maps to
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file = if self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", name, self.extension)
        };
        self.dir.join(file)
    }
}

impl PartialLoader for FileLoader {
    fn load(&mut self, name: &str) -> io::Result<String> {
        let path = self.path_for(name);
        match fs::read_to_string(&path) {
            Ok(source) => {
                debug!(partial = name, path = %path.display(), "read partial");
                Ok(source)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(partial = name, path = %path.display(), "partial not found, using empty template");
                Ok(String::new())
            }
            Err(err) => Err(err),
        }
    }
}
