// agrisense/core/models/src/lib.rs

// Model artifacts, estimators and the process-wide registry
pub mod artifact;
pub mod error;
pub mod estimator;
pub mod registry;
pub mod types;

pub use artifact::{ModelArtifact, LoadedModel, FORMAT_VERSION};
pub use error::{ArtifactLoadError, InferenceError, UnknownModelError};
pub use estimator::Estimator;
pub use registry::{ModelRegistry, RegistryConfig};
pub use types::{ClassScore, ModelId, ModelInfo, Prediction, Predictor};
