//! Recording tree traversal
//!
//! Lazily yields one `CandidateFile` per regular file under the root,
//! labelled with its top-level bucket. Unreadable subdirectories are
//! reported per entry and never abort the walk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::util::validate_directory;
use crate::error::{ResolveError, Result};
use crate::models::CandidateFile;

/// Walks a recording directory hierarchy and produces candidate files
#[derive(Debug, Clone)]
pub struct RecordingWalker {
    root: PathBuf,
}

impl RecordingWalker {
    /// Create a walker over a root directory
    ///
    /// Fails early if the root itself does not exist or is unreadable.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        validate_directory(&root, "walking the recording tree")?;
        Ok(Self { root })
    }

    /// The walk root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the tree
    ///
    /// Yields `Ok(CandidateFile)` for every regular file and
    /// `Err(DirectoryReadError)` for every entry that could not be read;
    /// the iterator keeps going after errors. Restartable: each call starts
    /// a fresh traversal.
    pub fn walk(&self) -> impl Iterator<Item = Result<CandidateFile>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    let path = entry.path().to_path_buf();
                    let bucket = self.bucket_label(&path);
                    Some(Ok(CandidateFile::new(path, bucket)))
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    Some(Err(ResolveError::DirectoryReadError {
                        path,
                        message: err.to_string(),
                    }))
                }
            })
    }

    /// Top-level bucket label: the path segment immediately below the root
    ///
    /// Files sitting directly in the root have no bucket and get an empty
    /// label (which no configured bucket matches).
    fn bucket_label(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return String::new();
        };
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(first), Some(_)) => first.as_os_str().to_string_lossy().into_owned(),
            _ => String::new(),
        }
    }
}
