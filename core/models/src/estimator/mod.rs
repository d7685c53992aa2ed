// agrisense/core/models/src/estimator/mod.rs

// Estimator kinds that can appear in an artifact
pub mod naive_bayes;
pub mod tree;

pub use naive_bayes::GaussianNb;
pub use tree::{DecisionTree, RandomForest, TreeNode};

use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    GaussianNb(GaussianNb),
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::DecisionTree(_) => "decision_tree",
            Estimator::RandomForest(_) => "random_forest",
            Estimator::GaussianNb(_) => "gaussian_nb",
        }
    }

    /// Structural check against the declared input width and class count
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            Estimator::DecisionTree(tree) => tree.validate(n_features, n_classes),
            Estimator::RandomForest(forest) => forest.validate(n_features, n_classes),
            Estimator::GaussianNb(nb) => nb.validate(n_features, n_classes),
        }
    }

    /// Class probabilities for one sample. `x` must already have the validated width.
    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        match self {
            Estimator::DecisionTree(tree) => Ok(tree.predict_proba(x)),
            Estimator::RandomForest(forest) => Ok(forest.predict_proba(x)),
            Estimator::GaussianNb(nb) => nb.predict_proba(x),
        }
    }
}
