mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use meterwatch::inference::AnomalyClassifier;
use serde_json::{json, Value};

/// Flags any window whose newest reading exceeds the threshold.
struct ThresholdClassifier(f64);

impl AnomalyClassifier for ThresholdClassifier {
    fn classify(&self, values: &[f64]) -> bool {
        values.last().map_or(false, |v| *v > self.0)
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

async fn post_reading(app: &TestApp, user_id: i32, power_value: f64, date: Option<&str>) {
    let mut body = json!({ "user_id": user_id, "power_value": power_value });
    if let Some(date) = date {
        body["date_logged"] = json!(date);
    }
    let response = app
        .request(Method::POST, "/add_power_value/", Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn get_data(app: &TestApp, uri: &str) -> Value {
    let response = app.request(Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    body["data"].clone()
}

#[tokio::test]
async fn power_history_is_ordered_by_date_then_insertion() {
    let app = TestApp::new().await;
    let meter = app.register_meter("Uusimaa", "Kallio").await;

    post_reading(&app, meter, 3.0, Some("2024-03-03")).await;
    post_reading(&app, meter, 1.0, Some("2024-03-01")).await;
    post_reading(&app, meter, 2.0, Some("2024-03-01")).await;

    let rows = get_data(&app, &format!("/api/v1/dashboard/power-values?user_id={meter}")).await;
    let values: Vec<f64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["power_value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
    assert_eq!(rows[0]["date_logged"], json!("2024-03-01"));
}

#[tokio::test]
async fn region_and_district_filters_narrow_history() {
    let app = TestApp::new().await;
    let kallio = app.register_meter("Uusimaa", "Kallio").await;
    let vallila = app.register_meter("Uusimaa", "Vallila").await;
    let hervanta = app.register_meter("Pirkanmaa", "Hervanta").await;

    post_reading(&app, kallio, 1.0, None).await;
    post_reading(&app, vallila, 2.0, None).await;
    post_reading(&app, hervanta, 3.0, None).await;

    let all = get_data(&app, "/api/v1/dashboard/power-values").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let region = get_data(&app, "/api/v1/dashboard/power-values?region=Uusimaa").await;
    assert_eq!(region.as_array().unwrap().len(), 2);

    let district = get_data(
        &app,
        "/api/v1/dashboard/power-values?region=Uusimaa&district=Vallila",
    )
    .await;
    assert_eq!(district.as_array().unwrap().len(), 1);
    assert_eq!(district[0]["user_id"], json!(vallila));
}

#[tokio::test]
async fn district_without_region_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/dashboard/power-values?district=Kallio",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_meter_selection_is_not_found() {
    let app = TestApp::new().await;

    for uri in [
        "/api/v1/dashboard/power-values?user_id=42",
        "/api/v1/dashboard/recent/42",
        "/api/v1/dashboard/anomaly-summary?user_id=42",
    ] {
        let response = app.request(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }
}

#[tokio::test]
async fn predictions_and_summary_track_flagged_readings() {
    let app = TestApp::with_classifier(Arc::new(ThresholdClassifier(10.0))).await;
    let noisy = app.register_meter("Uusimaa", "Kallio").await;
    let quiet = app.register_meter("Pirkanmaa", "Hervanta").await;

    for value in [1.0, 50.0, 2.0, 75.0] {
        post_reading(&app, noisy, value, None).await;
    }
    post_reading(&app, quiet, 1.5, None).await;

    let summary = get_data(&app, "/api/v1/dashboard/anomaly-summary").await;
    assert_eq!(summary, json!({ "anomalies": 2, "normal": 3 }));

    let summary = get_data(&app, "/api/v1/dashboard/anomaly-summary?region=Pirkanmaa").await;
    assert_eq!(summary, json!({ "anomalies": 0, "normal": 1 }));

    let all = get_data(&app, &format!("/api/v1/dashboard/predictions?user_id={noisy}")).await;
    assert_eq!(all.as_array().unwrap().len(), 4);

    let flagged = get_data(
        &app,
        &format!("/api/v1/dashboard/predictions?user_id={noisy}&anomalies_only=true"),
    )
    .await;
    let flagged = flagged.as_array().unwrap();
    assert_eq!(flagged.len(), 2);
    assert!(flagged.iter().all(|p| p["anomaly"] == json!(true)));
}

#[tokio::test]
async fn recent_window_lists_oldest_first() {
    let app = TestApp::new().await;
    let meter = app.register_meter("Uusimaa", "Kallio").await;

    for value in [4.0, 5.0, 6.0] {
        post_reading(&app, meter, value, None).await;
    }

    let window = get_data(&app, &format!("/api/v1/dashboard/recent/{meter}")).await;
    let values: Vec<f64> = window
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["power_value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![4.0, 5.0, 6.0]);
}

#[tokio::test]
async fn overview_returns_first_rows_of_each_table() {
    let app = TestApp::new().await;
    let meter = app.register_meter("Uusimaa", "Kallio").await;
    app.register_meter("Pirkanmaa", "Hervanta").await;
    for value in 1..=8 {
        post_reading(&app, meter, value as f64, None).await;
    }

    let overview = get_data(&app, "/api/v1/dashboard/overview").await;
    assert_eq!(overview["power_meters"].as_array().unwrap().len(), 2);
    assert_eq!(overview["power_values"].as_array().unwrap().len(), 5);
    assert_eq!(overview["recent_power_values"].as_array().unwrap().len(), 5);
    assert_eq!(overview["anomaly_predictions"].as_array().unwrap().len(), 5);
    assert_eq!(overview["power_values"][0]["power_value"], json!(1.0));

    let limited = get_data(&app, "/api/v1/dashboard/overview?limit=2").await;
    assert_eq!(limited["power_values"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["ready"], json!(true));
    assert_eq!(body["checks"]["database"], json!("up"));

    let response = app.request(Method::GET, "/health/version", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["service"], json!("meterwatch"));
}
