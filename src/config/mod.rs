//! Configuration for the identity resolver.

/// Configuration for the `IdentityResolver`
///
/// Constructed once at startup and passed by reference; the resolver never
/// mutates it.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Top-level bucket to process; files under any other bucket are skipped
    pub bucket: String,
    /// Basenames ignored as filesystem housekeeping artifacts (exact match)
    pub ignore_files: Vec<String>,
    /// Year used when the participant code carries no year token
    pub fallback_year: u16,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            bucket: "M1".to_string(),
            ignore_files: vec![".DS_Store".to_string(), "Thumbs.db".to_string()],
            fallback_year: 2024,
        }
    }
}

impl ResolverConfig {
    /// Whether a basename is a housekeeping artifact to skip
    #[must_use]
    pub fn is_ignored_file(&self, file_name: &str) -> bool {
        self.ignore_files.iter().any(|ignored| ignored == file_name)
    }
}
