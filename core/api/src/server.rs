// agrisense/core/api/src/server.rs

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::metrics;
use agrisense_inference::{DispatchError, InferenceDispatcher, PredictionResponse};
use agrisense_models::{ModelId, ModelInfo};
use agrisense_soil::{LocationInfo, SoilLookup, SoilReport};

/// REST API server for the prediction service
pub struct ApiServer {
    state: AppState,
    cors: bool,
}

/// Server state for Axum handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<InferenceDispatcher>,
    pub soil: Arc<dyn SoilLookup>,
}

/// Model list response
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelListResponse {
    pub object: String,
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: ModelId,
    #[serde(flatten)]
    pub info: ModelInfo,
}

#[derive(Debug, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl ApiServer {
    pub fn new(dispatcher: Arc<InferenceDispatcher>, soil: Arc<dyn SoilLookup>) -> Self {
        Self {
            state: AppState { dispatcher, soil },
            cors: true,
        }
    }

    /// Enable or disable the permissive CORS layer
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    /// Create the Axum router with all API endpoints
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            // Predictions
            .route("/predict/crop", post(predict_crop))
            .route("/predict/fertilizer", post(predict_fertilizer))
            .route("/models", get(list_models))
            // Soil and location
            .route("/soil", get(soil_report))
            .route("/location", get(location_info))
            // Health check
            .route("/health", get(health_check))
            .route("/metrics", get(metrics::metrics_handler))
            .route("/", get(root))
            .with_state(self.state.clone());

        if self.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Start the REST API server; returns after Ctrl-C
    pub async fn start(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let app = self.router();

        info!("Starting AgriSense API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }
}

/// Run a prediction and record its outcome
fn observed(
    model: ModelId,
    predict: impl FnOnce() -> Result<PredictionResponse, DispatchError>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let start = Instant::now();
    let result = predict();

    let status = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    metrics::record_prediction(model, status, start.elapsed().as_secs_f64());

    Ok(Json(result?))
}

/// POST /predict/crop
async fn predict_crop(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(fields) = body?;
    observed(ModelId::Classifier, || {
        state.dispatcher.predict_crop_suitability(&fields)
    })
}

/// POST /predict/fertilizer
async fn predict_fertilizer(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(fields) = body?;
    observed(ModelId::Fertilizer, || {
        state.dispatcher.predict_fertilizer_recommendation(&fields)
    })
}

/// GET /models
async fn list_models(State(state): State<AppState>) -> Json<ModelListResponse> {
    let data = state
        .dispatcher
        .registry()
        .models()
        .map(|(id, model)| ModelEntry {
            id,
            info: model.info().clone(),
        })
        .collect();

    Json(ModelListResponse {
        object: "list".to_string(),
        data,
    })
}

/// GET /soil?lat=..&lon=..
async fn soil_report(
    State(state): State<AppState>,
    query: Result<Query<Coordinates>, QueryRejection>,
) -> Result<Json<SoilReport>, ApiError> {
    let Query(at) = query?;
    Ok(Json(state.soil.soil_report(at.lat, at.lon).await?))
}

/// GET /location?lat=..&lon=..
async fn location_info(
    State(state): State<AppState>,
    query: Result<Query<Coordinates>, QueryRejection>,
) -> Result<Json<LocationInfo>, ApiError> {
    let Query(at) = query?;
    Ok(Json(state.soil.location_info(at.lat, at.lon).await?))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "models_loaded": state.dispatcher.registry().len(),
        "timestamp": chrono::Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /
async fn root() -> Json<Value> {
    Json(serde_json::json!({
        "name": "AgriSense API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "predict": ["/predict/crop", "/predict/fertilizer"],
            "models": "/models",
            "soil": "/soil?lat=&lon=",
            "location": "/location?lat=&lon=",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}
