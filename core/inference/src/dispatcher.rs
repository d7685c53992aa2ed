// agrisense/core/inference/src/dispatcher.rs

use crate::error::DispatchError;
use crate::schema::{FeatureSchema, CROP_SCHEMA, FERTILIZER_SCHEMA};
use agrisense_models::{ArtifactLoadError, ClassScore, ModelId, ModelRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Ranked alternatives returned alongside a prediction
pub const MAX_ALTERNATIVES: usize = 3;

/// Payload returned for one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub model: ModelId,
    pub prediction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<ClassScore>,
}

/// Turns validated request fields into predictions from the registry's models
#[derive(Debug, Clone)]
pub struct InferenceDispatcher {
    registry: Arc<ModelRegistry>,
}

impl InferenceDispatcher {
    /// Bind to a registry after checking every registered model against its schema
    pub fn new(registry: Arc<ModelRegistry>) -> Result<Self, ArtifactLoadError> {
        for schema in [&CROP_SCHEMA, &FERTILIZER_SCHEMA] {
            let Ok(model) = registry.get(schema.model) else {
                warn!("No {} model registered; its endpoint will fail", schema.model);
                continue;
            };
            let info = model.info();
            let names_match = match &info.feature_names {
                Some(names) => {
                    names.len() == schema.len()
                        && names
                            .iter()
                            .zip(schema.fields)
                            .all(|(name, spec)| name.eq_ignore_ascii_case(spec.name))
                }
                None => info.n_features == schema.len(),
            };
            if !names_match || info.n_features != schema.len() {
                return Err(ArtifactLoadError::SchemaMismatch {
                    model: schema.model,
                    expected: schema.names(),
                    found: info
                        .feature_names
                        .clone()
                        .unwrap_or_else(|| {
                            (0..info.n_features).map(|i| format!("f{}", i)).collect()
                        }),
                });
            }
        }

        Ok(Self { registry })
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn predict_crop_suitability(
        &self,
        fields: &Value,
    ) -> Result<PredictionResponse, DispatchError> {
        self.dispatch(&CROP_SCHEMA, fields)
    }

    pub fn predict_fertilizer_recommendation(
        &self,
        fields: &Value,
    ) -> Result<PredictionResponse, DispatchError> {
        self.dispatch(&FERTILIZER_SCHEMA, fields)
    }

    /// Validate, look up, predict, format. Validation always runs before the model is touched.
    fn dispatch(
        &self,
        schema: &FeatureSchema,
        fields: &Value,
    ) -> Result<PredictionResponse, DispatchError> {
        let features = schema.build(fields)?;
        let model = self.registry.get(schema.model)?;

        let start = Instant::now();
        let prediction = model.predict(features.as_slice())?;

        debug!(
            model = %schema.model,
            features = %features,
            prediction = %prediction.label,
            confidence = ?prediction.confidence,
            latency_us = start.elapsed().as_micros() as u64,
            "Prediction served"
        );

        Ok(PredictionResponse {
            model: schema.model,
            alternatives: prediction.top(MAX_ALTERNATIVES).to_vec(),
            confidence: prediction.confidence,
            prediction: prediction.label,
        })
    }
}
