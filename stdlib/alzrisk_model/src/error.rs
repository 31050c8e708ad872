use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an artifact from disk. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Contract violations raised by a loaded scaler or classifier at call time.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("X has {found} features, but the estimator is expecting {expected} features as input")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("Feature names do not match those seen at fit time: expected {expected:?}, got {found:?}")]
    FeatureNameMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Input contains a non-finite value in column {column}")]
    NonFinite { column: usize },
    #[error("Expected {expected} classes, got {found}")]
    ClassCount { expected: usize, found: usize },
    #[error("Expected classes [0, 1], got {found:?}")]
    UnexpectedClasses { found: Vec<i64> },
    #[error("Decision tree is malformed at node {node}")]
    MalformedTree { node: usize },
}
