// agrisense/core/models/src/error.rs

use crate::types::ModelId;
use std::path::PathBuf;

/// Startup-fatal failure to bring a model artifact into memory
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {} is corrupted: {source}", path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {} has format version {found}, supported version is {supported}", path.display())]
    IncompatibleVersion {
        path: PathBuf,
        found: u64,
        supported: u64,
    },

    #[error("artifact {} is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("artifact {} declares model '{declared}' but was loaded as {expected}", path.display())]
    WrongModel {
        path: PathBuf,
        declared: String,
        expected: ModelId,
    },

    #[error("{model} schema mismatch: expected {expected:?}, model declares {found:?}")]
    SchemaMismatch {
        model: ModelId,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Requested a model identifier that is not registered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModelError(pub String);

/// The estimator failed while computing a prediction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },

    #[error("numeric fault: {0}")]
    Numeric(String),
}
