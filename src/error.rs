//! Error types for the mashup studio core

use thiserror::Error;

/// A patch operation list could not be applied as a whole
#[derive(Error, Debug)]
pub enum InvalidPatchError {
    /// The operation list does not parse as RFC 6902 operations
    #[error("Malformed patch operations: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An operation failed (unresolvable path, failed test, ...)
    #[error("Patch application failed: {0}")]
    Apply(#[from] json_patch::PatchError),
}

/// A mashup plan failed patching or structural validation
#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Patch(#[from] InvalidPatchError),

    /// The document is not shaped like a mashup plan
    #[error("Invalid plan structure: {0}")]
    Structure(String),

    #[error("Section {index} times out of range: {start_ms}..{end_ms} (max {max_ms} ms)")]
    SectionOutOfRange {
        index: usize,
        start_ms: u64,
        end_ms: u64,
        max_ms: u64,
    },

    #[error("Section {index} has a negative stretch ratio for stem '{stem}'")]
    NegativeStretch { index: usize, stem: String },
}

/// Obtaining an analysis for a song failed
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid song id: {0:?}")]
    InvalidSong(String),

    /// The analysis service reported failure
    #[error("Analysis failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse analysis: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum AlignmentError {
    #[error("BPM must be positive and finite, got {0}")]
    InvalidBpm(f64),
}

/// Configuration loading or validation error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown key rule '{0}' (expected 'exact' or 'camelot')")]
    UnknownKeyRule(String),

    #[error("Weight '{name}' must be non-negative and finite, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
