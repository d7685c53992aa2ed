// agrisense/core/inference/src/error.rs

use agrisense_models::{InferenceError, UnknownModelError};

/// Client supplied fields that do not fit a model's input schema
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("field '{field}' has unknown category '{value}'")]
    UnknownCategory { field: &'static str, value: String },
}

impl InvalidInputError {
    /// Offending field, when the error is about one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            InvalidInputError::NotAnObject => None,
            InvalidInputError::MissingField { field }
            | InvalidInputError::WrongType { field, .. }
            | InvalidInputError::OutOfRange { field, .. }
            | InvalidInputError::UnknownCategory { field, .. } => Some(*field),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            InvalidInputError::NotAnObject => "not_an_object",
            InvalidInputError::MissingField { .. } => "missing_field",
            InvalidInputError::WrongType { .. } => "wrong_type",
            InvalidInputError::OutOfRange { .. } => "out_of_range",
            InvalidInputError::UnknownCategory { .. } => "unknown_category",
        }
    }
}

/// Every way a prediction request can fail
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    UnknownModel(#[from] UnknownModelError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl DispatchError {
    /// Stable machine-readable error type
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidInput(_) => "invalid_input",
            DispatchError::UnknownModel(_) => "unknown_model",
            DispatchError::Inference(_) => "inference_error",
        }
    }
}
