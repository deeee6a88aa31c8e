//! HTTP-level tests for the scoring service.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fraud_risk_scoring::{
    server::{create_router, AppState},
    Classifier, ClassifierAdapter, ExchangeRateTable, FeatureVector, RiskScorer,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Fixed fraud probability; records the vectors it was asked to score
struct StubClassifier {
    probability: f64,
    seen: Mutex<Vec<FeatureVector>>,
}

impl StubClassifier {
    fn new(probability: f64) -> Arc<Self> {
        Arc::new(Self {
            probability,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Classifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn predict_proba(&self, batch: &[FeatureVector]) -> anyhow::Result<Vec<Vec<f64>>> {
        self.seen.lock().unwrap().extend_from_slice(batch);
        Ok(batch
            .iter()
            .map(|_| vec![1.0 - self.probability, self.probability])
            .collect())
    }
}

fn app_with(adapter: ClassifierAdapter) -> Router {
    let scorer = RiskScorer::new(Arc::new(ExchangeRateTable::default()), adapter);
    create_router(AppState::new(scorer), None)
}

fn app(classifier: Arc<StubClassifier>) -> Router {
    app_with(ClassifierAdapter::new(classifier))
}

async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze-risk")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, payload: Value) -> (StatusCode, Value) {
    post_raw(app, payload.to_string()).await
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_scores_eur_transaction() {
    let classifier = StubClassifier::new(0.12);
    let (status, body) = post_json(
        app(classifier.clone()),
        json!({ "tx_id": "TXN-1001", "currency": "EUR", "amount": 100 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tx_id"], "TXN-1001");
    assert_eq!(body["original_amount"], 100.0);
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["normalized_usd"], 108.0);
    assert_eq!(body["fraud_probability"], 0.12);
    assert_eq!(body["status"], "Safe");
    assert_eq!(body["time"].as_str().unwrap().len(), 8);
    assert_eq!(body.as_object().unwrap().len(), 7);

    let seen = classifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].as_slice().len(), 30);
    assert_eq!(seen[0].as_slice()[29], 100.0 * 1.08);
}

#[tokio::test]
async fn test_high_risk_verdict() {
    let (status, body) = post_json(app(StubClassifier::new(0.91)), json!({ "amount": "2500" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tx_id"], "TXN-MANUAL");
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["original_amount"], 2500.0);
    assert_eq!(body["status"], "High Risk");
}

#[tokio::test]
async fn test_probability_at_threshold_is_safe() {
    let (_, body) = post_json(app(StubClassifier::new(0.5)), json!({ "amount": 10 })).await;
    assert_eq!(body["fraud_probability"], 0.5);
    assert_eq!(body["status"], "Safe");
}

#[tokio::test]
async fn test_zero_amount_short_circuits() {
    let classifier = StubClassifier::new(0.99);
    let (status, body) = post_json(app(classifier.clone()), json!({ "amount": 0, "currency": "INR" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Invalid Amount");
    assert_eq!(body["fraud_probability"], 0.0);
    assert_eq!(body["normalized_usd"], 0.0);
    assert_eq!(body["original_amount"], 0.0);
    assert_eq!(body["currency"], "INR");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_missing_amount_short_circuits() {
    let classifier = StubClassifier::new(0.99);
    let (status, body) = post_json(app(classifier.clone()), json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Invalid Amount");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_negative_amount_echoed() {
    let (_, body) = post_json(app(StubClassifier::new(0.99)), json!({ "amount": -42.5 })).await;
    assert_eq!(body["status"], "Invalid Amount");
    assert_eq!(body["original_amount"], -42.5);
}

#[tokio::test]
async fn test_unknown_currency_uses_fallback_rate() {
    let (status, body) =
        post_json(app(StubClassifier::new(0.3)), json!({ "amount": 50, "currency": "XYZ" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["normalized_usd"], 50.0);
}

#[tokio::test]
async fn test_huge_amount_stays_numeric() {
    let (status, body) = post_json(app(StubClassifier::new(0.2)), json!({ "amount": 1e307 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["normalized_usd"], 1e307);

    let (status, body) = post_json(
        app(StubClassifier::new(0.2)),
        json!({ "amount": 1.7e308, "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_non_numeric_amount_rejected() {
    let classifier = StubClassifier::new(0.3);
    let (status, body) = post_json(app(classifier.clone()), json!({ "amount": "abc" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("abc"));
    assert!(body.get("status").is_none());
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_malformed_bodies_rejected() {
    for raw in ["", "{\"amount\": ", "[1, 2, 3]", "\"100\""] {
        let (status, body) = post_raw(app(StubClassifier::new(0.3)), raw.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", raw);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_inference_failure_is_error_response() {
    struct Broken;

    impl Classifier for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict_proba(&self, _batch: &[FeatureVector]) -> anyhow::Result<Vec<Vec<f64>>> {
            anyhow::bail!("input shape mismatch")
        }
    }

    let (status, body) =
        post_json(app_with(ClassifierAdapter::new(Arc::new(Broken))), json!({ "amount": 10 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Inference failed: input shape mismatch");
}

#[tokio::test]
async fn test_without_classifier() {
    let app = app_with(ClassifierAdapter::unavailable());

    let (status, body) = post_json(app.clone(), json!({ "amount": 100000 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fraud_probability"], 0.0);
    assert_eq!(body["status"], "Safe");

    let (status, health) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["model_loaded"], false);
    assert!(health["model"].is_null());
}

#[tokio::test]
async fn test_health_reports_model() {
    let (status, health) = get_json(app(StubClassifier::new(0.1)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["model_loaded"], true);
    assert_eq!(health["model"], "stub");
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let app = app(StubClassifier::new(0.8));

    post_json(app.clone(), json!({ "amount": 10 })).await;
    post_json(app.clone(), json!({ "amount": 0 })).await;
    post_json(app.clone(), json!({ "amount": "abc" })).await;

    let (status, metrics) = get_json(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["requests_scored"], 1);
    assert_eq!(metrics["high_risk"], 1);
    assert_eq!(metrics["invalid_amounts"], 1);
    assert_eq!(metrics["requests_rejected"], 1);
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze-risk")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app(StubClassifier::new(0.1)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_landing_page_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Risk</h1>").unwrap();

    let scorer = RiskScorer::new(
        Arc::new(ExchangeRateTable::default()),
        ClassifierAdapter::unavailable(),
    );
    let app = create_router(AppState::new(scorer), Some(dir.path()));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>Risk</h1>");
}
