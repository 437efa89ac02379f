//! Error handling for the identity resolution engine.
//!
//! One variant per failure mode of the resolution pipeline, so callers can
//! react to (and tests can assert on) the exact step that rejected a file.
//! Every per-file error is attributable to the file that caused it; the
//! batch driver collects them and keeps walking.

pub mod util;

use std::io;
use std::path::PathBuf;

/// Specialized error type for recording identity resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Filename does not start with any known condition token
    #[error("no condition token matches '{file_name}'")]
    NoConditionMatch {
        /// Upper-cased basename that was tested
        file_name: String,
    },

    /// Filename starts with more than one condition token
    #[error("ambiguous condition in '{file_name}': matches {matches:?}")]
    AmbiguousCondition {
        /// Upper-cased basename that was tested
        file_name: String,
        /// Every vocabulary token that matched, in vocabulary order
        matches: Vec<String>,
    },

    /// Character after the condition token is neither `_` nor a space
    #[error("invalid separator {found:?} after condition in '{file_name}'")]
    InvalidSeparator {
        /// Upper-cased basename that was tested
        file_name: String,
        /// The offending character, or `None` if the name ended early
        found: Option<char>,
    },

    /// No registry key contains the normalized centre segment
    #[error("unknown centre '{segment}'")]
    UnknownCentre {
        /// Normalized path segment that was looked up
        segment: String,
    },

    /// More than one registry key contains the normalized centre segment
    #[error("ambiguous centre '{segment}': candidates {candidates:?}")]
    AmbiguousCentre {
        /// Normalized path segment that was looked up
        segment: String,
        /// Every registry key containing the segment, sorted
        candidates: Vec<String>,
    },

    /// Centre-filtered participant rows do not number exactly one
    #[error(
        "participant lookup for code '{short_code}' in centre {centre_id} \
         matched {matched} rows (candidates before centre filter: {candidates:?})"
    )]
    ParticipantLookupError {
        /// Short code extracted from the filename
        short_code: String,
        /// Centre id the rows were filtered by
        centre_id: u32,
        /// Row count after the centre filter
        matched: usize,
        /// Codes of every row matching the prefix, before the centre filter
        candidates: Vec<String>,
    },

    /// A subdirectory could not be listed during the walk
    #[error("failed to read directory entry under '{path}': {message}")]
    DirectoryReadError {
        /// Deepest path walkdir could attribute the failure to
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },

    /// Malformed participant reference data (fatal to the run, not per-file)
    #[error("participant table error: {0}")]
    Table(String),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reading the CSV form of the participant table
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading the Parquet form of the participant table
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Wrapped error with additional context
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

impl ResolveError {
    /// Stable label for the structured batch report
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoConditionMatch { .. } => "no_condition_match",
            Self::AmbiguousCondition { .. } => "ambiguous_condition",
            Self::InvalidSeparator { .. } => "invalid_separator",
            Self::UnknownCentre { .. } => "unknown_centre",
            Self::AmbiguousCentre { .. } => "ambiguous_centre",
            Self::ParticipantLookupError { .. } => "participant_lookup",
            Self::DirectoryReadError { .. } => "directory_read",
            Self::Table(_) => "table",
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
            Self::Parquet(_) => "parquet",
            Self::Other(_) => "other",
        }
    }
}
