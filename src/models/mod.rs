//! Core data types for recording identity resolution.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A regular file discovered by the walker, ready for resolution
///
/// Derived on the fly during the walk and never persisted.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Full path of the file on disk
    pub path: PathBuf,
    /// Top-level bucket label: the path segment immediately below the walk
    /// root (empty for files sitting directly in the root)
    pub bucket: String,
    /// Upper-cased, whitespace-trimmed basename
    pub file_name: String,
}

impl CandidateFile {
    /// Build a candidate from a path and its bucket label
    #[must_use]
    pub fn new(path: PathBuf, bucket: String) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().trim().to_uppercase())
            .unwrap_or_default();
        Self {
            path,
            bucket,
            file_name,
        }
    }

    /// Raw (un-normalized) basename, used for the housekeeping ignore list
    #[must_use]
    pub fn raw_name(&self) -> &str {
        self.path
            .file_name()
            .map(|name| name.to_str().unwrap_or_default())
            .unwrap_or_default()
    }
}

/// Validated identity recovered from a single recording file
///
/// Created fresh per input file; has no existence beyond the resolution call
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedIdentity {
    /// Experimental condition token from the filename
    pub condition: String,
    /// 3-4 character participant code prefix from the filename
    pub short_code: String,
    /// Study centre id resolved from the path
    pub centre_id: u32,
    /// Year from the participant code, or the configured fallback
    pub year: u16,
    /// Gender from the participant reference table
    pub gender: String,
    /// Device-assignment flag from the participant reference table
    pub fitbit: String,
}

impl ParsedIdentity {
    /// Compose the canonical export name for this identity
    ///
    /// Format: `{bucket}_{condition}_{short_code}_{centre_id}_{gender}`.
    #[must_use]
    pub fn canonical_name(&self, bucket: &str) -> String {
        format!(
            "{bucket}_{}_{}_{}_{}",
            self.condition, self.short_code, self.centre_id, self.gender
        )
    }
}

/// Outcome of resolving one candidate file
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The file produced a validated identity
    Resolved(ParsedIdentity),
    /// The file is outside the resolver's remit and was skipped, not errored
    Skipped(SkipReason),
}

/// Why a candidate file was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Basename is on the housekeeping ignore list
    Housekeeping,
    /// File sits under a bucket the resolver is not configured to process
    OutsideBucket(String),
}

impl SkipReason {
    /// Short label for log lines and reports
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Housekeeping => "housekeeping artifact".to_string(),
            Self::OutsideBucket(bucket) => format!("outside bucket (in '{bucket}')"),
        }
    }
}

/// Extract the second-to-last segment of a path (the centre directory)
#[must_use]
pub fn centre_segment(path: &Path) -> Option<&str> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
}
