//! Error types for profile decoding, assembly and display reduction
//!
//! Every failure in the core is fatal for the profile being processed: the
//! transform is deterministic, so nothing is retried and no partial graph is
//! handed out.

use thiserror::Error;

/// Errors raised while decoding, assembling or reducing a circuit profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Edge {from} -> {to} references unknown node {missing}")]
    UnknownEdgeEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error("Malformed measurement '{property}': {reason}")]
    MalformedMeasurement { property: String, reason: String },

    #[error("Cannot merge {left} value with {right} value")]
    ValueMismatch {
        left: &'static str,
        right: &'static str,
    },

    #[error("Cannot merge ratios with different denominators ({left} vs {right})")]
    DenominatorMismatch { left: f64, right: f64 },

    #[error("Mismatched measurement lengths for '{property}': {expected} vs {actual}")]
    LengthMismatch {
        property: String,
        expected: usize,
        actual: usize,
    },

    #[error("Split node {0} was already merged or never existed")]
    MissingSplitNode(String),

    #[error("Node {0} has no visible or hidden representative")]
    Unresolved(String),

    #[error("Invalid view configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
