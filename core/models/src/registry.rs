// agrisense/core/models/src/registry.rs

// Process-wide registry of the served models
use crate::artifact::{LoadedModel, ModelArtifact};
use crate::error::{ArtifactLoadError, UnknownModelError};
use crate::types::{ModelId, Predictor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Where the registry finds its artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub classifier_path: PathBuf,
    pub fertilizer_path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            classifier_path: PathBuf::from("artifacts/crop_classifier.json"),
            fertilizer_path: PathBuf::from("artifacts/fertilizer_recommender.json"),
        }
    }
}

impl RegistryConfig {
    pub fn path_for(&self, model_id: ModelId) -> &Path {
        match model_id {
            ModelId::Classifier => &self.classifier_path,
            ModelId::Fertilizer => &self.fertilizer_path,
        }
    }
}

/// Immutable set of loaded models, shared by every request.
///
/// Built once before the server accepts traffic. There is no reload; a
/// restart is the only way to pick up new artifacts.
pub struct ModelRegistry {
    models: BTreeMap<ModelId, Arc<dyn Predictor>>,
}

impl ModelRegistry {
    /// Load every artifact named by `config`. Any failure is fatal.
    pub fn initialize(config: &RegistryConfig) -> Result<Self, ArtifactLoadError> {
        let mut models: BTreeMap<ModelId, Arc<dyn Predictor>> = BTreeMap::new();

        for model_id in ModelId::ALL {
            let path = config.path_for(model_id);
            let artifact = ModelArtifact::load(path)?;
            artifact.check_model_id(model_id, path)?;

            info!(
                model = %model_id,
                kind = artifact.estimator.kind(),
                features = artifact.feature_names.len(),
                classes = artifact.classes.len(),
                "Loaded model artifact from {}",
                path.display()
            );

            models.insert(model_id, Arc::new(LoadedModel::new(artifact)));
        }

        Ok(Self { models })
    }

    /// Build a registry from already constructed predictors
    pub fn from_models(models: impl IntoIterator<Item = (ModelId, Arc<dyn Predictor>)>) -> Self {
        Self {
            models: models.into_iter().collect(),
        }
    }

    pub fn get(&self, model_id: ModelId) -> Result<Arc<dyn Predictor>, UnknownModelError> {
        self.models
            .get(&model_id)
            .cloned()
            .ok_or_else(|| UnknownModelError(model_id.to_string()))
    }

    /// Look up by the wire name of a model
    pub fn get_by_name(&self, name: &str) -> Result<Arc<dyn Predictor>, UnknownModelError> {
        self.get(name.parse()?)
    }

    /// Registered models in identifier order
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &Arc<dyn Predictor>)> {
        self.models.iter().map(|(id, model)| (*id, model))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}
