//! Integration test: Server API endpoints

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use heartwise::features::{example_vector, FeatureVector, EXAMPLE_RECORD};
use heartwise::inference::{InferenceService, PredictionResult};
use heartwise::server::{create_router, AppState, ServerConfig};
use heartwise::training::{TrainingConfig, TrainingDataset, TrainingPipeline};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn service() -> Arc<InferenceService> {
    let rows: Vec<(FeatureVector, f64)> = (0..40)
        .map(|i| {
            let sick = i % 2 == 0;
            let mut row = EXAMPLE_RECORD;
            row[0] = 40.0 + (i % 15) as f64 + if sick { 10.0 } else { 0.0 };
            row[7] = 170.0 - (i % 11) as f64 - if sick { 25.0 } else { 0.0 };
            (FeatureVector::new(row), if sick { 1.0 } else { 0.0 })
        })
        .collect();
    let dir = tempfile::tempdir().unwrap();
    let outcome = TrainingPipeline::new(TrainingConfig::default().with_output_dir(dir.path()))
        .run_dataset(TrainingDataset::from_rows(&rows).unwrap())
        .unwrap();
    Arc::new(InferenceService::new(outcome.artifacts.scaler, outcome.artifacts.classifier).unwrap())
}

fn app_with_origin(service: Arc<InferenceService>, cors_origin: Option<&str>) -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: "model.json".into(),
        scaler_path: "scaler.json".into(),
        cors_origin: cors_origin.map(str::to_string),
    };
    create_router(Arc::new(AppState::with_shared(config, service)))
}

fn test_app(service: Arc<InferenceService>) -> axum::Router {
    app_with_origin(service, None)
}

fn post_predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn example_body() -> Value {
    json!({
        "age": 63, "sex": 1, "cp": 1, "trestbps": 145, "chol": 233, "fbs": 1,
        "restecg": 2, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 3,
        "ca": 0, "thal": 6
    })
}

#[tokio::test]
async fn test_predict_numeric_body() {
    let service = service();
    let expected = service.predict_vector(&example_vector()).unwrap();
    let response = test_app(service)
        .oneshot(post_predict(example_body().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let result: PredictionResult = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(result, expected);
    assert!(body["prediction"] == 0 || body["prediction"] == 1);
    assert!(body["probability"].as_f64().unwrap() <= 1.0);
}

#[tokio::test]
async fn test_predict_string_body() {
    let service = service();
    let expected = service.predict_vector(&example_vector()).unwrap();
    let body: Value = example_body()
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.to_string())))
        .collect::<serde_json::Map<_, _>>()
        .into();

    let response = test_app(service)
        .oneshot(post_predict(body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: PredictionResult = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_predict_missing_field_is_400() {
    let mut body = example_body();
    body.as_object_mut().unwrap().remove("thal");
    let response = test_app(service())
        .oneshot(post_predict(body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid input" }));
}

#[tokio::test]
async fn test_predict_non_numeric_is_400() {
    let mut body = example_body();
    body["age"] = json!("abc");
    let response = test_app(service())
        .oneshot(post_predict(body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid input" }));
}

#[tokio::test]
async fn test_predict_malformed_bodies_are_400() {
    let service = service();
    for body in ["{ not json", "[63, 1, 1]", "42", ""] {
        let response = test_app(Arc::clone(&service))
            .oneshot(post_predict(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(json_body(response).await, json!({ "error": "Invalid input" }));
    }
}

#[tokio::test]
async fn test_predict_without_content_type_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(example_body().to_string()))
        .unwrap();
    let response = test_app(service()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app(service())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_serves_form() {
    let response = test_app(service())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("name=\"thalach\""));
    assert!(html.contains("/predict"));
}

#[tokio::test]
async fn test_wrong_method_and_unknown_route() {
    let app = test_app(service());
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_origin_from_config() {
    let service = service();
    let request = || {
        Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://clinic.example")
            .body(Body::empty())
            .unwrap()
    };

    let response = app_with_origin(Arc::clone(&service), Some("http://clinic.example"))
        .oneshot(request())
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://clinic.example"
    );

    let response = test_app(service).oneshot(request()).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
