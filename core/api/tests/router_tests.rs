// End-to-end router behaviour through tower's oneshot

use agrisense_api::{ApiServer, ErrorResponse};
use agrisense_inference::{InferenceDispatcher, PredictionResponse};
use agrisense_models::{ModelRegistry, RegistryConfig};
use agrisense_soil::{LocationInfo, SoilError, SoilLookup, SoilReport};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

/// Answers every point with the same report
struct FixedSoil;

#[async_trait]
impl SoilLookup for FixedSoil {
    async fn soil_report(&self, latitude: f64, longitude: f64) -> Result<SoilReport, SoilError> {
        agrisense_soil::error::validate_coordinates(latitude, longitude)?;
        let mut report = SoilReport::fallback(latitude, longitude);
        report.soil_type = "Black".to_string();
        report.confidence = 0.85;
        report.success = true;
        Ok(report)
    }

    async fn location_info(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationInfo, SoilError> {
        agrisense_soil::error::validate_coordinates(latitude, longitude)?;
        Ok(LocationInfo {
            city: "Nagpur".to_string(),
            country: "India".to_string(),
            ..Default::default()
        })
    }
}

fn artifacts() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts")
}

fn router_with(registry: ModelRegistry) -> Router {
    let dispatcher = InferenceDispatcher::new(Arc::new(registry)).unwrap();
    ApiServer::new(Arc::new(dispatcher), Arc::new(FixedSoil)).router()
}

fn router() -> Router {
    let registry = ModelRegistry::initialize(&RegistryConfig {
        classifier_path: artifacts().join("crop_classifier.json"),
        fertilizer_path: artifacts().join("fertilizer_recommender.json"),
    })
    .unwrap();
    router_with(registry)
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn crop_body() -> Value {
    json!({"N": 90, "P": 42, "K": 43, "temperature": 20.8,
           "humidity": 82.0, "ph": 6.5, "rainfall": 202.9})
}

#[tokio::test]
async fn test_predict_crop() {
    let (status, body) = send(router(), post_json("/predict/crop", crop_body().to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let response: PredictionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.prediction, "rice");
    assert!(response.alternatives.len() <= 3);
    assert_eq!(response.alternatives[0].label, "rice");
}

#[tokio::test]
async fn test_predict_fertilizer_accepts_names_and_aliases() {
    let body = json!({"Nitrogen": 10, "Phosphorous": 10, "Potassium": 10,
                      "Soil Type": "clayey", "Crop Type": "Maize"});
    let (status, body) = send(router(), post_json("/predict/fertilizer", body.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["model"], "fertilizer");
    assert_eq!(response["prediction"], "Urea");
}

#[tokio::test]
async fn test_missing_field_is_422_with_param() {
    let mut body = crop_body();
    body.as_object_mut().unwrap().remove("humidity");

    let (status, body) = send(router(), post_json("/predict/crop", body.to_string())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.r#type, "invalid_input");
    assert_eq!(error.error.code.as_deref(), Some("missing_field"));
    assert_eq!(error.error.param.as_deref(), Some("humidity"));
}

#[tokio::test]
async fn test_non_object_body_is_422() {
    let (status, body) = send(router(), post_json("/predict/crop", "[1, 2, 3]".into())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.code.as_deref(), Some("not_an_object"));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (status, body) = send(router(), post_json("/predict/crop", "{\"N\": ".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.r#type, "invalid_request");
}

#[tokio::test]
async fn test_missing_model_is_500() {
    let registry = ModelRegistry::initialize(&RegistryConfig {
        classifier_path: artifacts().join("crop_classifier.json"),
        fertilizer_path: artifacts().join("fertilizer_recommender.json"),
    })
    .unwrap();
    let classifier = registry.get(agrisense_models::ModelId::Classifier).unwrap();
    let partial =
        ModelRegistry::from_models([(agrisense_models::ModelId::Classifier, classifier)]);

    let body = json!({"N": 10, "P": 10, "K": 10, "soil_type": 1, "crop_type": 3});
    let (status, body) = send(
        router_with(partial),
        post_json("/predict/fertilizer", body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.r#type, "unknown_model");
}

#[tokio::test]
async fn test_list_models_and_health() {
    let app = router();

    let (status, body) = send(app.clone(), get("/models")).await;
    assert_eq!(status, StatusCode::OK);
    let models: Value = serde_json::from_slice(&body).unwrap();
    let data = models["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], "classifier");
    assert_eq!(data[0]["n_features"], 7);
    assert_eq!(data[1]["feature_names"][3], "soil_type");

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["models_loaded"], 2);
}

#[tokio::test]
async fn test_soil_and_location_routes() {
    let app = router();

    let (status, body) = send(app.clone(), get("/soil?lat=21.15&lon=79.09")).await;
    assert_eq!(status, StatusCode::OK);
    let report: SoilReport = serde_json::from_slice(&body).unwrap();
    assert_eq!(report.soil_type, "Black");
    assert_eq!(report.location.latitude, 21.15);

    let (status, body) = send(app.clone(), get("/location?lat=21.15&lon=79.09")).await;
    assert_eq!(status, StatusCode::OK);
    let info: LocationInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(info.city, "Nagpur");

    let (status, body) = send(app.clone(), get("/soil?lat=95&lon=79.09")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error.param.as_deref(), Some("lat"));

    let (status, _) = send(app, get("/soil?lat=21.15")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_count_predictions() {
    let app = router();
    let (status, _) = send(app.clone(), post_json("/predict/crop", crop_body().to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("agrisense_predictions_total"));
    assert!(text.contains("model=\"classifier\""));
    assert!(text.contains("agrisense_prediction_duration_seconds"));
}
