//! Identity resolution engine for EEG recording trees.
//!
//! Given a raw recording file discovered on disk, the engine recovers the
//! experimental condition, the participant's short code and the study
//! centre from the path alone, then cross-references the participant
//! reference table to recover gender and device-assignment fields. Every
//! lookup enforces an exactly-one-match rule; ambiguous or malformed input
//! fails with a structured, per-file error instead of a guess.

pub mod batch;
pub mod centre;
pub mod condition;
pub mod config;
pub mod error;
pub mod models;
pub mod participant;
pub mod resolver;
pub mod walker;

// Re-export the most common types for easier use
// Core types
pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use models::{CandidateFile, ParsedIdentity, Resolution, SkipReason};

// Resolution components
pub use centre::{CentreRegistry, normalize_centre_segment};
pub use condition::ConditionVocabulary;
pub use participant::{ParticipantRecord, ParticipantTable};
pub use resolver::{IdentityResolver, short_code_len};
pub use walker::RecordingWalker;

// Batch processing
pub use batch::{BatchReport, FileFailure, ResolvedFile, run, run_parallel};

// Reference table loading
pub use participant::loader::{load_csv, load_parquet, load_table};
