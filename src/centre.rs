//! Centre name normalization and registry lookup
//!
//! Study centres are identified on disk by free-text directory names with
//! inconsistent diacritics, case and bucket markers. The registry maps
//! normalized names to stable numeric ids; lookup is a substring containment
//! test (a deliberate tolerance for inconsistent directory naming), with the
//! usual exactly-one-match discipline on top.

use std::path::Path;

use deunicode::deunicode;
use rustc_hash::FxHashMap;

use crate::error::{ResolveError, Result};
use crate::models::centre_segment;

/// Fixed site table of the study: raw centre name to centre id
pub const DEFAULT_CENTRES: [(&str, u32); 8] = [
    ("QUERCUS", 1),
    ("PUEBLA", 2), // "ENRIQUE DÍEZ CANDO"
    ("EMÉRITA AUGUSTA", 3),
    ("SAGRADO CORAZÓN MIAJADAS", 4),
    ("SALESIANOS BADAJOZ", 5),
    ("SANTA EULALIA MÉRIDA", 6),
    ("NUESTRA SEÑORA DOLORES GUAREÑA", 7),
    ("ALBALAT", 8),
];

/// Normalize a centre directory segment for registry lookup
///
/// Strips a leading two-character bucket marker ("M1"/"M2"), trims
/// surrounding whitespace, strips diacritics and upper-cases. Pure; the
/// registry applies the same normalization to its keys at build time.
#[must_use]
pub fn normalize_centre_segment(segment: &str) -> String {
    let stripped = if segment.starts_with("M1") || segment.starts_with("M2") {
        &segment[2..]
    } else {
        segment
    };
    deunicode(stripped.trim()).to_uppercase()
}

/// Mapping from normalized centre name to integer centre id
///
/// Built once at startup and immutable thereafter.
#[derive(Debug, Clone)]
pub struct CentreRegistry {
    entries: FxHashMap<String, u32>,
}

impl Default for CentreRegistry {
    fn default() -> Self {
        Self::from_entries(DEFAULT_CENTRES.iter().map(|(name, id)| (*name, *id)))
    }
}

impl CentreRegistry {
    /// Build a registry, normalizing every key once
    ///
    /// Lookups never re-normalize registry keys, only the query string.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, id)| (deunicode(name.trim()).to_uppercase(), id))
            .collect();
        Self { entries }
    }

    /// Number of registered centres
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a centre id exists in the registry's value set
    #[must_use]
    pub fn contains_id(&self, centre_id: u32) -> bool {
        self.entries.values().any(|id| *id == centre_id)
    }

    /// Resolve a raw centre directory segment to a centre id
    ///
    /// Collects every registry key that *contains* the normalized segment as
    /// a substring. Zero matches fail with `UnknownCentre`, multiple with
    /// `AmbiguousCentre` naming all candidates; exactly one returns its id.
    pub fn resolve_segment(&self, segment: &str) -> Result<u32> {
        let query = normalize_centre_segment(segment);

        let mut matches: Vec<(&str, u32)> = self
            .entries
            .iter()
            .filter(|(key, _)| key.contains(&query))
            .map(|(key, id)| (key.as_str(), *id))
            .collect();
        // Sorted so ambiguity diagnostics are deterministic
        matches.sort_unstable_by_key(|(key, _)| *key);

        match matches.as_slice() {
            [] => Err(ResolveError::UnknownCentre { segment: query }),
            [(_, id)] => Ok(*id),
            many => Err(ResolveError::AmbiguousCentre {
                segment: query,
                candidates: many.iter().map(|(key, _)| (*key).to_string()).collect(),
            }),
        }
    }

    /// Resolve the centre for a recording file from its path
    ///
    /// The centre is named by the second-to-last path segment (the directory
    /// holding the file).
    pub fn resolve_path(&self, path: &Path) -> Result<u32> {
        let segment = centre_segment(path).ok_or_else(|| ResolveError::UnknownCentre {
            segment: String::new(),
        })?;
        self.resolve_segment(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn normalization_strips_marker_whitespace_and_diacritics() {
        assert_eq!(normalize_centre_segment("M1QUERCUS"), "QUERCUS");
        assert_eq!(normalize_centre_segment("M2 Emérita Augusta "), "EMERITA AUGUSTA");
        assert_eq!(
            normalize_centre_segment(" Santa Eulalia Mérida"),
            "SANTA EULALIA MERIDA"
        );
    }

    #[test]
    fn marker_is_only_stripped_at_the_front() {
        assert_eq!(normalize_centre_segment("ALBALAT M1"), "ALBALAT M1");
    }

    #[test]
    fn exact_key_resolves() {
        let registry = CentreRegistry::default();
        assert_eq!(registry.resolve_segment("QUERCUS").unwrap(), 1);
        assert_eq!(registry.resolve_segment("ALBALAT").unwrap(), 8);
    }

    #[test]
    fn substring_containment_resolves() {
        let registry = CentreRegistry::default();
        // Partial directory name contained in exactly one key
        assert_eq!(registry.resolve_segment("AUGUSTA").unwrap(), 3);
        assert_eq!(registry.resolve_segment("GUAREÑA").unwrap(), 7);
    }

    #[test]
    fn marker_prefixed_directory_resolves() {
        let registry = CentreRegistry::default();
        assert_eq!(registry.resolve_segment("M1QUERCUS").unwrap(), 1);
    }

    #[test]
    fn resolution_is_idempotent() {
        let registry = CentreRegistry::default();
        let first = registry.resolve_segment("MIAJADAS").unwrap();
        let second = registry.resolve_segment("MIAJADAS").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_segment_is_an_error() {
        let registry = CentreRegistry::default();
        let err = registry.resolve_segment("CACERES").unwrap_err();
        assert!(matches!(err, crate::ResolveError::UnknownCentre { .. }));
    }

    #[test]
    fn multiple_containing_keys_are_ambiguous() {
        let registry =
            CentreRegistry::from_entries([("QUERCUS NORTE", 1), ("QUERCUS SUR", 9)]);
        let err = registry.resolve_segment("QUERCUS").unwrap_err();
        match err {
            crate::ResolveError::AmbiguousCentre { candidates, .. } => {
                assert_eq!(candidates, vec!["QUERCUS NORTE", "QUERCUS SUR"]);
            }
            other => panic!("expected AmbiguousCentre, got {other:?}"),
        }
    }

    #[test]
    fn mixed_case_directory_resolves() {
        let registry = CentreRegistry::default();
        assert_eq!(registry.resolve_segment("Salesianos Badajoz").unwrap(), 5);
    }

    #[test]
    fn path_resolution_uses_parent_directory() {
        let registry = CentreRegistry::default();
        let path = PathBuf::from("/data/M1/QUERCUS/OA_JDS1.edf");
        assert_eq!(registry.resolve_path(&path).unwrap(), 1);
    }
}
