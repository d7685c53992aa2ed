// agrisense/core/models/src/artifact.rs

// On-disk model artifact format and the in-memory model built from it
use crate::error::{ArtifactLoadError, InferenceError};
use crate::estimator::Estimator;
use crate::types::{ModelId, ModelInfo, Prediction, Predictor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Artifact format version this build understands
pub const FORMAT_VERSION: u64 = 1;

/// Serialized model as exported by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u64,
    /// Slot the artifact was exported for; checked at load when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Read and validate an artifact file
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArtifactLoadError::Missing {
                path: path.to_path_buf(),
            },
            _ => ArtifactLoadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Self::from_slice(&bytes, path)
    }

    /// Parse an artifact document. `path` is only used for error context.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, ArtifactLoadError> {
        let corrupted = |source| ArtifactLoadError::Corrupted {
            path: path.to_path_buf(),
            source,
        };

        // Version first, so a newer layout reports as incompatible rather than corrupt
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(corrupted)?;
        let version = value
            .get("format_version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ArtifactLoadError::Invalid {
                path: path.to_path_buf(),
                reason: "missing format_version".to_string(),
            })?;
        if version != FORMAT_VERSION {
            return Err(ArtifactLoadError::IncompatibleVersion {
                path: path.to_path_buf(),
                found: version,
                supported: FORMAT_VERSION,
            });
        }

        let artifact: ModelArtifact = serde_json::from_value(value).map_err(corrupted)?;
        artifact.validate().map_err(|reason| ArtifactLoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("no feature names declared".to_string());
        }
        if self.classes.is_empty() {
            return Err("no classes declared".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(format!("duplicate class label '{}'", dup));
        }
        self.estimator
            .validate(self.feature_names.len(), self.classes.len())
    }

    /// Check the declared slot, if any, against where the artifact is being loaded
    pub fn check_model_id(
        &self,
        expected: ModelId,
        path: &Path,
    ) -> Result<(), ArtifactLoadError> {
        match &self.model_id {
            Some(declared) if declared.parse::<ModelId>().ok() != Some(expected) => {
                Err(ArtifactLoadError::WrongModel {
                    path: path.to_path_buf(),
                    declared: declared.clone(),
                    expected,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: self.estimator.kind().to_string(),
            n_features: self.feature_names.len(),
            feature_names: Some(self.feature_names.clone()),
            classes: self.classes.clone(),
            description: self.description.clone(),
        }
    }
}

/// An artifact ready to serve predictions
#[derive(Debug, Clone)]
pub struct LoadedModel {
    info: ModelInfo,
    estimator: Estimator,
}

impl LoadedModel {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            info: artifact.info(),
            estimator: artifact.estimator,
        }
    }
}

impl Predictor for LoadedModel {
    fn predict(&self, features: &[f64]) -> Result<Prediction, InferenceError> {
        if features.len() != self.info.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.info.n_features,
                got: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|x| !x.is_finite()) {
            return Err(InferenceError::NonFiniteFeature { index });
        }

        let proba = self.estimator.predict_proba(features)?;
        Prediction::from_probabilities(&self.info.classes, &proba)
    }

    fn info(&self) -> &ModelInfo {
        &self.info
    }
}
