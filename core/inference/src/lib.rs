// agrisense/core/inference/src/lib.rs

// Request validation, feature vector construction and prediction dispatch
pub mod dispatcher;
pub mod error;
pub mod schema;

pub use dispatcher::{InferenceDispatcher, PredictionResponse, MAX_ALTERNATIVES};
pub use error::{DispatchError, InvalidInputError};
pub use schema::{
    FeatureSchema, FeatureVector, FieldKind, FieldSpec, CROP_SCHEMA, FERTILIZER_SCHEMA,
};
