//! Access to patch files on persistent storage.

use crate::error::{FileNotFound, ListFailed, OpenFailed, Result};
use log::warn;
use snafu::ResultExt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// Upper bound on patch files considered in one directory.
pub const MAX_FILES: usize = 255;

/// Storage the engine reads patch files from.
///
/// Handles are closed when dropped, so every exit path releases them.
pub trait PatchStore {
    type Handle: Read + Seek;

    /// Patch file paths, in no particular order.
    fn list(&self) -> Result<Vec<PathBuf>>;

    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// Patch files in one directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
    max_files: usize,
}

impl DirStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirStore {
            root: root.into(),
            max_files: MAX_FILES,
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PatchStore for DirStore {
    type Handle = BufReader<File>;

    fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.root).context(ListFailed { path: &self.root })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.context(ListFailed { path: &self.root })?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        // Directory order is unspecified; sort before capping so the same
        // files are kept on every filesystem.
        paths.sort();
        if paths.len() > self.max_files {
            warn!(
                "{} holds {} patch files, ignoring all after the first {}",
                self.root.display(),
                paths.len(),
                self.max_files
            );
            paths.truncate(self.max_files);
        }
        Ok(paths)
    }

    fn open(&self, path: &Path) -> Result<Self::Handle> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return FileNotFound { path }.fail();
            }
            Err(e) => return Err(e).context(OpenFailed { path }),
        };
        Ok(BufReader::new(file))
    }
}
