// agrisense/core/api/src/metrics.rs

use agrisense_models::ModelId;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

// Prediction Metrics
pub static PREDICTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "agrisense_predictions_total",
        "Total number of prediction requests",
        &["model", "status"]
    )
    .expect("Failed to register prediction count metric")
});

pub static PREDICTION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "agrisense_prediction_duration_seconds",
        "Validation plus inference time in seconds",
        &["model"],
        vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    )
    .expect("Failed to register prediction duration metric")
});

/// Record one prediction request. `status` is "success" or an error kind.
pub fn record_prediction(model: ModelId, status: &str, duration: f64) {
    PREDICTION_DURATION
        .with_label_values(&[model.as_str()])
        .observe(duration);
    PREDICTIONS
        .with_label_values(&[model.as_str(), status])
        .inc();
}

/// Handler for /metrics endpoint
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error encoding metrics: {}", e),
        )
            .into_response(),
    }
}
