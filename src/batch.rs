//! Batch resolution pass
//!
//! Walks a recording tree, resolves every candidate file and collects the
//! outcomes. Per-file errors are reported and never abort the pass; the
//! report keeps each failure attached to the path that caused it so the
//! batch is fully diagnosable afterwards.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{ResolveError, Result};
use crate::models::{CandidateFile, ParsedIdentity, Resolution};
use crate::resolver::IdentityResolver;
use crate::walker::RecordingWalker;

/// One successfully resolved file
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFile {
    /// Path of the recording file
    pub path: PathBuf,
    /// The validated identity
    pub identity: ParsedIdentity,
    /// Canonical export name composed from the identity
    pub canonical_name: String,
}

/// One file (or directory entry) that failed
#[derive(Debug, Serialize)]
pub struct FileFailure {
    /// Path the failure is attributable to
    pub path: PathBuf,
    /// Stable error label (see `ResolveError::kind`)
    pub kind: &'static str,
    /// Human-readable error message
    pub message: String,
}

impl FileFailure {
    fn new(path: PathBuf, error: &ResolveError) -> Self {
        Self {
            path,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one batch pass over a recording tree
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Successfully resolved files
    pub resolved: Vec<ResolvedFile>,
    /// Files skipped as housekeeping or out-of-bucket
    pub skipped: usize,
    /// Per-file failures, in walk order
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// Total number of entries the pass looked at
    #[must_use]
    pub fn total(&self) -> usize {
        self.resolved.len() + self.skipped + self.failures.len()
    }

    fn record(&mut self, resolver: &IdentityResolver<'_>, candidate: &CandidateFile) {
        match resolver.resolve(candidate) {
            Ok(Resolution::Resolved(identity)) => {
                let canonical_name = identity.canonical_name(resolver.bucket());
                self.resolved.push(ResolvedFile {
                    path: candidate.path.clone(),
                    identity,
                    canonical_name,
                });
            }
            Ok(Resolution::Skipped(reason)) => {
                log::debug!("{}: skipped ({})", candidate.path.display(), reason.describe());
                self.skipped += 1;
            }
            Err(error) => {
                log::warn!("{}: {error}", candidate.path.display());
                self.failures.push(FileFailure::new(candidate.path.clone(), &error));
            }
        }
    }
}

/// Run a sequential batch pass
///
/// Shows a progress spinner while walking; one log line per processed file.
pub fn run(walker: &RecordingWalker, resolver: &IdentityResolver<'_>) -> Result<BatchReport> {
    let spinner = ProgressBar::new_spinner().with_style(
        ProgressStyle::with_template("{spinner} {pos} files ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let mut report = BatchReport::default();
    for item in walker.walk() {
        spinner.inc(1);
        match item {
            Ok(candidate) => {
                report.record(resolver, &candidate);
                spinner.set_message(format!(
                    "{} resolved, {} failed",
                    report.resolved.len(),
                    report.failures.len()
                ));
            }
            Err(error) => {
                // Unreadable directory entries count as failures but the
                // walk keeps going on siblings
                log::warn!("{error}");
                let path = match &error {
                    ResolveError::DirectoryReadError { path, .. } => path.clone(),
                    _ => walker.root().to_path_buf(),
                };
                report.failures.push(FileFailure::new(path, &error));
            }
        }
    }
    spinner.finish_and_clear();

    log::info!(
        "batch done: {} resolved, {} skipped, {} failed",
        report.resolved.len(),
        report.skipped,
        report.failures.len()
    );
    Ok(report)
}

/// Run a batch pass with per-file resolution parallelized across a rayon pool
///
/// Resolutions are independent (the reference tables are read-only), so
/// files are processed in parallel with no ordering requirement; failures
/// remain attributed to their files. The walk itself stays sequential.
pub fn run_parallel(
    walker: &RecordingWalker,
    resolver: &IdentityResolver<'_>,
) -> Result<BatchReport> {
    let mut walk_failures = Vec::new();
    let mut candidates = Vec::new();
    for item in walker.walk() {
        match item {
            Ok(candidate) => candidates.push(candidate),
            Err(error) => {
                log::warn!("{error}");
                let path = match &error {
                    ResolveError::DirectoryReadError { path, .. } => path.clone(),
                    _ => walker.root().to_path_buf(),
                };
                walk_failures.push(FileFailure::new(path, &error));
            }
        }
    }

    let outcomes: Vec<(CandidateFile, Result<Resolution>)> = candidates
        .into_par_iter()
        .map(|candidate| {
            let outcome = resolver.resolve(&candidate);
            (candidate, outcome)
        })
        .collect();

    let mut report = BatchReport {
        failures: walk_failures,
        ..BatchReport::default()
    };
    for (candidate, outcome) in outcomes {
        match outcome {
            Ok(Resolution::Resolved(identity)) => {
                let canonical_name = identity.canonical_name(resolver.bucket());
                report.resolved.push(ResolvedFile {
                    path: candidate.path,
                    identity,
                    canonical_name,
                });
            }
            Ok(Resolution::Skipped(_)) => report.skipped += 1,
            Err(error) => {
                log::warn!("{}: {error}", candidate.path.display());
                report.failures.push(FileFailure::new(candidate.path, &error));
            }
        }
    }

    log::info!(
        "parallel batch done: {} resolved, {} skipped, {} failed",
        report.resolved.len(),
        report.skipped,
        report.failures.len()
    );
    Ok(report)
}
