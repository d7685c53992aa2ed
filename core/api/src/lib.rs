// agrisense/core/api/src/lib.rs

// HTTP surface for predictions, model listing and soil lookups
pub mod error;
pub mod metrics;
pub mod server;

pub use error::{ApiError, ErrorDetail, ErrorResponse};
pub use server::{ApiServer, AppState};
