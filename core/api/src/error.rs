// agrisense/core/api/src/error.rs

use agrisense_inference::DispatchError;
use agrisense_soil::SoilError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
    /// Request field the error refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Soil(#[from] SoilError),

    /// Body or query string could not be decoded at all
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Dispatch(DispatchError::InvalidInput(_)) | ApiError::Soil(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (r#type, code, param) = match self {
            ApiError::Dispatch(DispatchError::InvalidInput(e)) => {
                ("invalid_input", Some(e.code()), e.field())
            }
            ApiError::Dispatch(e) => (e.kind(), None, None),
            ApiError::Soil(SoilError::InvalidLatitude(_)) => {
                ("invalid_input", Some("invalid_coordinates"), Some("lat"))
            }
            ApiError::Soil(SoilError::InvalidLongitude(_)) => {
                ("invalid_input", Some("invalid_coordinates"), Some("lon"))
            }
            ApiError::BadRequest(_) => ("invalid_request", None, None),
        };

        ErrorDetail {
            message: self.to_string(),
            r#type: r#type.to_string(),
            code: code.map(str::to_string),
            param: param.map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}
