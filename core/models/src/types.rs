// agrisense/core/models/src/types.rs

use crate::error::{InferenceError, UnknownModelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a served model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    /// Crop suitability classifier
    Classifier,
    /// Fertilizer recommender
    Fertilizer,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::Classifier, ModelId::Fertilizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Classifier => "classifier",
            ModelId::Fertilizer => "fertilizer",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = UnknownModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classifier" => Ok(ModelId::Classifier),
            "fertilizer" => Ok(ModelId::Fertilizer),
            _ => Err(UnknownModelError(s.to_string())),
        }
    }
}

/// A class label paired with its probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub probability: f64,
}

/// Result of a single prediction call
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    /// Probability of the predicted class, when the estimator produces one
    pub confidence: Option<f64>,
    /// Every class ranked by descending probability. Empty for label-only models.
    pub ranking: Vec<ClassScore>,
}

impl Prediction {
    /// Label-only prediction without probabilities
    pub fn label_only(label: impl Into<String>, class_index: usize) -> Self {
        Self {
            label: label.into(),
            class_index,
            confidence: None,
            ranking: Vec::new(),
        }
    }

    /// Pick the most probable class. Ties resolve to the lowest class index.
    pub fn from_probabilities(
        classes: &[String],
        probabilities: &[f64],
    ) -> Result<Self, InferenceError> {
        if classes.len() != probabilities.len() {
            return Err(InferenceError::Numeric(format!(
                "{} probabilities for {} classes",
                probabilities.len(),
                classes.len()
            )));
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::Numeric(
                "non-finite class probability".to_string(),
            ));
        }

        let mut best = 0usize;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }

        let mut ranking: Vec<ClassScore> = classes
            .iter()
            .zip(probabilities)
            .map(|(label, p)| ClassScore {
                label: label.clone(),
                probability: *p,
            })
            .collect();
        // Stable sort keeps class order among equal probabilities
        ranking.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        Ok(Self {
            label: classes[best].clone(),
            class_index: best,
            confidence: Some(probabilities[best]),
            ranking,
        })
    }

    /// The top `limit` classes
    pub fn top(&self, limit: usize) -> &[ClassScore] {
        &self.ranking[..self.ranking.len().min(limit)]
    }
}

/// Static description of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Estimator kind, e.g. `random_forest`
    pub kind: String,
    pub n_features: usize,
    /// Ordered input names, when the artifact declares them
    pub feature_names: Option<Vec<String>>,
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Anything that can turn an ordered feature vector into a prediction.
///
/// Implementations must be immutable after construction; the registry shares
/// them across all in-flight requests without locking.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<Prediction, InferenceError>;

    fn info(&self) -> &ModelInfo;
}
