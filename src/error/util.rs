//! Utility functions for error handling
//!
//! Helpers that attach path and purpose information to filesystem failures
//! before they enter the resolution pipeline.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ResolveError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
///
/// # Returns
/// * `Result<fs::File>` - The opened file or a detailed error
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(ResolveError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {} (needed for: {purpose})", path.display()),
        )));
    }

    if !path.is_file() {
        return Err(ResolveError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "path is not a file: {} (expected a file for: {purpose})",
                path.display()
            ),
        )));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied - check file permissions",
            io::ErrorKind::NotFound => "file not found - it may have been deleted during operation",
            _ => purpose,
        };
        ResolveError::Io(io::Error::new(
            e.kind(),
            format!("{}: {context}: {e}", path.display()),
        ))
    })
}

/// Check if a directory exists and is readable, with rich error information
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(ResolveError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "directory not found: {} (needed for: {purpose})",
                path.display()
            ),
        )));
    }

    if !path.is_dir() {
        return Err(ResolveError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "path is not a directory: {} (expected a directory for: {purpose})",
                path.display()
            ),
        )));
    }

    // Probe readability so the walk fails early instead of mid-batch
    fs::read_dir(path).map(|_| ()).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied - check directory permissions",
            _ => purpose,
        };
        ResolveError::Io(io::Error::new(
            e.kind(),
            format!("{}: {context}: {e}", path.display()),
        ))
    })
}
