// agrisense/core/models/src/estimator/naive_bayes.rs

use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Gaussian naive Bayes with per-class feature means and variances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianNb {
    pub class_prior: Vec<f64>,
    /// `theta[class][feature]` means
    pub theta: Vec<Vec<f64>>,
    /// `var[class][feature]` variances
    pub var: Vec<Vec<f64>>,
}

impl GaussianNb {
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.class_prior.len() != n_classes {
            return Err(format!(
                "{} class priors for {} classes",
                self.class_prior.len(),
                n_classes
            ));
        }
        if self.class_prior.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err("class priors must be positive".to_string());
        }
        for (name, table) in [("theta", &self.theta), ("var", &self.var)] {
            if table.len() != n_classes {
                return Err(format!("{} has {} rows, expected {}", name, table.len(), n_classes));
            }
            if let Some(row) = table.iter().position(|r| r.len() != n_features) {
                return Err(format!("{} row {} does not have {} columns", name, row, n_features));
            }
        }
        if self.theta.iter().flatten().any(|t| !t.is_finite()) {
            return Err("theta contains non-finite values".to_string());
        }
        if self.var.iter().flatten().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err("variances must be positive".to_string());
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, x: &[f64]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (theta, var))| {
                let mut jll = prior.ln();
                for ((xi, mu), v) in x.iter().zip(theta).zip(var) {
                    jll -= 0.5 * (2.0 * PI * v).ln();
                    jll -= 0.5 * (xi - mu).powi(2) / v;
                }
                jll
            })
            .collect()
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let jll = self.joint_log_likelihood(x);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(InferenceError::Numeric(
                "joint log-likelihood is not finite".to_string(),
            ));
        }

        let exp: Vec<f64> = jll.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        Ok(exp.iter().map(|e| e / total).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class() -> GaussianNb {
        GaussianNb {
            class_prior: vec![0.5, 0.5],
            theta: vec![vec![0.0, 0.0], vec![10.0, 10.0]],
            var: vec![vec![1.0, 1.0], vec![1.0, 1.0]],
        }
    }

    #[test]
    fn test_closest_mean_wins() {
        let nb = two_class();
        let near_zero = nb.predict_proba(&[0.5, -0.2]).unwrap();
        assert!(near_zero[0] > 0.99);

        let near_ten = nb.predict_proba(&[9.0, 11.0]).unwrap();
        assert!(near_ten[1] > 0.99);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let p = two_class().predict_proba(&[5.0, 5.0]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_overflowing_input_is_numeric_fault() {
        let err = two_class().predict_proba(&[f64::MAX, f64::MAX]).unwrap_err();
        assert!(matches!(err, InferenceError::Numeric(_)));
    }

    #[test]
    fn test_validate_shapes() {
        let nb = two_class();
        assert!(nb.validate(2, 2).is_ok());
        assert!(nb.validate(3, 2).is_err());
        assert!(nb.validate(2, 3).is_err());

        let mut zero_var = two_class();
        zero_var.var[1][0] = 0.0;
        assert!(zero_var.validate(2, 2).unwrap_err().contains("variances"));
    }
}
