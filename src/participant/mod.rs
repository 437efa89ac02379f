//! Participant reference table
//!
//! One row per enrolled participant, loaded once before any resolution and
//! read-only afterwards. The resolver queries rows by code prefix and then
//! narrows to exactly one row via the centre id; anything else is an error.

pub mod loader;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ResolveError, Result};

lazy_static! {
    // 4-digit year token starting with "2", embedded in the full code
    static ref YEAR_PATTERN: Regex = Regex::new(r"(2\d{3})").unwrap();
}

/// One row of the participant reference table
///
/// Field names mirror the reference file columns (`Centro`, `CODIGO`,
/// `Genero`, `FITBIT`). Never mutated by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParticipantRecord {
    /// Study centre id
    #[serde(rename = "Centro")]
    pub centre_id: u32,
    /// Full participant code; the filename short code is a prefix of it
    #[serde(rename = "CODIGO")]
    pub code: String,
    /// Gender marker
    #[serde(rename = "Genero")]
    pub gender: String,
    /// Device-assignment flag
    #[serde(rename = "FITBIT")]
    pub fitbit: String,
    /// Enrollment year token carried inside the code, if any
    #[serde(skip)]
    pub year: Option<u16>,
}

impl ParticipantRecord {
    /// Build a record, deriving the year token from the code
    #[must_use]
    pub fn new(centre_id: u32, code: &str, gender: &str, fitbit: &str) -> Self {
        Self {
            centre_id,
            code: code.to_string(),
            gender: gender.to_string(),
            fitbit: fitbit.to_string(),
            year: extract_year(code),
        }
    }
}

/// Extract the 4-digit year token (beginning with "2") from a code string
#[must_use]
pub fn extract_year(code: &str) -> Option<u16> {
    YEAR_PATTERN
        .captures(code)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Participant reference table, queried by code prefix and centre id
#[derive(Debug, Clone, Default)]
pub struct ParticipantTable {
    records: Vec<ParticipantRecord>,
}

impl ParticipantTable {
    /// Build a table from already-constructed records
    #[must_use]
    pub fn from_records(records: Vec<ParticipantRecord>) -> Self {
        Self { records }
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows whose code starts with the given prefix
    #[must_use]
    pub fn by_code_prefix(&self, prefix: &str) -> Vec<&ParticipantRecord> {
        self.records
            .iter()
            .filter(|record| record.code.starts_with(prefix))
            .collect()
    }

    /// Prefix candidates for a short code, warning when several codes share
    /// the prefix
    ///
    /// The multi-match is soft because a later centre filter must still
    /// narrow the set to exactly one row.
    #[must_use]
    pub fn candidates_for(&self, short_code: &str) -> Vec<&ParticipantRecord> {
        let candidates = self.by_code_prefix(short_code);
        if candidates.len() > 1 {
            log::warn!(
                "more than one participant code starts with '{short_code}': {}",
                candidates.iter().map(|record| &record.code).join(", ")
            );
        }
        candidates
    }

    /// Resolve a short code and centre id to exactly one participant row
    ///
    /// Convenience composition of `candidates_for` and `narrow_to_centre`
    /// for callers that already know the centre id.
    pub fn resolve(&self, short_code: &str, centre_id: u32) -> Result<&ParticipantRecord> {
        let candidates = self.candidates_for(short_code);
        narrow_to_centre(&candidates, short_code, centre_id)
    }
}

/// Filter prefix candidates down to exactly one row in the given centre
///
/// Anything but exactly one surviving row fails with
/// `ParticipantLookupError` carrying the unfiltered candidate codes for
/// diagnosis.
pub fn narrow_to_centre<'t>(
    candidates: &[&'t ParticipantRecord],
    short_code: &str,
    centre_id: u32,
) -> Result<&'t ParticipantRecord> {
    let matched: Vec<&ParticipantRecord> = candidates
        .iter()
        .copied()
        .filter(|record| record.centre_id == centre_id)
        .collect();

    match matched.as_slice() {
        [single] => Ok(*single),
        other => Err(ResolveError::ParticipantLookupError {
            short_code: short_code.to_string(),
            centre_id,
            matched: other.len(),
            candidates: candidates
                .iter()
                .map(|record| record.code.clone())
                .collect(),
        }),
    }
}
