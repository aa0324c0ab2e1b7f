#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use meterwatch::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    inference::{AnomalyClassifier, ConstantClassifier},
    services::meters::CreateMeterRequest,
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness for spinning up the application against a fresh SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    /// Application whose classifier never flags anything.
    pub async fn new() -> Self {
        Self::with_classifier(Arc::new(ConstantClassifier(false))).await
    }

    pub async fn with_classifier(classifier: Arc<dyn AnomalyClassifier>) -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = db_dir.path().join("meterwatch_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // a single connection keeps sqlite writers serialized
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = EventSender::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender, classifier);
        let router = meterwatch::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Send a request against the router, with a JSON body when given.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Registers a meter directly through the service layer.
    pub async fn register_meter(&self, region: &str, district: &str) -> i32 {
        self.state
            .services
            .meters
            .register_meter(CreateMeterRequest {
                user_id: None,
                location_longitude: 24.94,
                location_latitude: 60.17,
                district: district.to_string(),
                region: region.to_string(),
            })
            .await
            .expect("seed meter for tests")
            .user_id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}

/// Remembers every window it is asked about and answers with a fixed verdict.
#[derive(Default)]
pub struct RecordingClassifier {
    pub verdict: bool,
    pub seen: Mutex<Vec<Vec<f64>>>,
}

impl RecordingClassifier {
    pub fn last_window(&self) -> Option<Vec<f64>> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl AnomalyClassifier for RecordingClassifier {
    fn classify(&self, values: &[f64]) -> bool {
        self.seen.lock().unwrap().push(values.to_vec());
        self.verdict
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
