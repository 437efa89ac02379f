//! Condition vocabulary matching
//!
//! The experimental condition is encoded as a fixed token at the start of a
//! recording's filename. The vocabulary is a closed set; matching collects
//! every token that prefixes the name and demands exactly one. Tokens may be
//! textual prefixes of one another ("PVT" vs "PVT-B"), which is why a
//! double match is a hard error rather than a longest-wins pick.

use smallvec::SmallVec;

use crate::error::{ResolveError, Result};

/// Default condition tokens, in study protocol order
pub const DEFAULT_CONDITIONS: [&str; 9] = [
    "OA", "OC", "STROOP", "PASAT", "PVTB", "MSIT", "PVSAT", "PVT-B", "PVT",
];

/// Closed, ordered set of valid experimental-condition tokens
#[derive(Debug, Clone)]
pub struct ConditionVocabulary {
    tokens: Vec<String>,
}

impl Default for ConditionVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_CONDITIONS.iter().map(ToString::to_string))
    }
}

impl ConditionVocabulary {
    /// Build a vocabulary from an ordered token sequence
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// The tokens, in vocabulary order
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Classify a filename prefix against the vocabulary
    ///
    /// `file_name` is expected upper-cased; matching is case-insensitive
    /// regardless. Exactly one matching token is returned; zero matches fail
    /// with `NoConditionMatch` and multiple matches fail with
    /// `AmbiguousCondition` naming every match.
    pub fn match_condition(&self, file_name: &str) -> Result<&str> {
        let matches: SmallVec<[&str; 2]> = self
            .tokens
            .iter()
            .map(String::as_str)
            .filter(|token| starts_with_ignore_case(file_name, token))
            .collect();

        match matches.as_slice() {
            [] => Err(ResolveError::NoConditionMatch {
                file_name: file_name.to_string(),
            }),
            [single] => Ok(*single),
            many => Err(ResolveError::AmbiguousCondition {
                file_name: file_name.to_string(),
                matches: many.iter().map(ToString::to_string).collect(),
            }),
        }
    }
}

/// ASCII case-insensitive prefix test; vocabulary tokens are ASCII
fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    #[test]
    fn default_vocabulary_keeps_protocol_order() {
        let vocab = ConditionVocabulary::default();
        assert_eq!(vocab.tokens().len(), DEFAULT_CONDITIONS.len());
        assert_eq!(vocab.tokens()[0], "OA");
        assert_eq!(vocab.tokens()[DEFAULT_CONDITIONS.len() - 1], "PVT");
    }

    #[test]
    fn unique_token_resolves() {
        let vocab = ConditionVocabulary::default();
        assert_eq!(vocab.match_condition("STROOP_ABC1.EDF").unwrap(), "STROOP");
        assert_eq!(vocab.match_condition("OA_JDS1_EXTRA.EDF").unwrap(), "OA");
    }

    #[test]
    fn lowercase_input_still_matches() {
        let vocab = ConditionVocabulary::default();
        assert_eq!(vocab.match_condition("pasat_abcd.edf").unwrap(), "PASAT");
    }

    #[test]
    fn no_match_is_an_error() {
        let vocab = ConditionVocabulary::default();
        let err = vocab.match_condition("REST_ABC1.EDF").unwrap_err();
        assert!(matches!(err, ResolveError::NoConditionMatch { .. }));
    }

    #[test]
    fn overlapping_prefixes_are_ambiguous() {
        // Regression for the PVT / PVT-B overlap: a name starting with
        // "PVT-B" also starts with "PVT" and must not silently pick either.
        let vocab = ConditionVocabulary::default();
        let err = vocab.match_condition("PVT-B_ABC1.EDF").unwrap_err();
        match err {
            ResolveError::AmbiguousCondition { matches, .. } => {
                assert_eq!(matches, vec!["PVT-B".to_string(), "PVT".to_string()]);
            }
            other => panic!("expected AmbiguousCondition, got {other:?}"),
        }
    }

    #[test]
    fn plain_pvt_is_unambiguous() {
        let vocab = ConditionVocabulary::default();
        assert_eq!(vocab.match_condition("PVT_ABC1.EDF").unwrap(), "PVT");
    }

    #[test]
    fn pvtb_without_dash_is_also_ambiguous() {
        // "PVT" is a textual prefix of "PVTB" as well.
        let vocab = ConditionVocabulary::default();
        let err = vocab.match_condition("PVTB_ABC1.EDF").unwrap_err();
        match err {
            ResolveError::AmbiguousCondition { matches, .. } => {
                assert_eq!(matches, vec!["PVTB".to_string(), "PVT".to_string()]);
            }
            other => panic!("expected AmbiguousCondition, got {other:?}"),
        }
    }
}
