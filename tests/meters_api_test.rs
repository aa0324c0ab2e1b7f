mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use meterwatch::entities::{anomaly_prediction, power_value, recent_power_value};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

#[tokio::test]
async fn register_then_fetch_meter() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/meters",
            Some(json!({
                "location_longitude": 23.761,
                "location_latitude": 61.4978,
                "district": " Hervanta ",
                "region": "Pirkanmaa"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = response_json(response).await;
    let id = created["data"]["user_id"].as_i64().unwrap();
    assert_eq!(created["data"]["district"], json!("Hervanta"));

    let response = app
        .request(Method::GET, &format!("/api/v1/meters/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched["data"], created["data"]);
}

#[tokio::test]
async fn explicit_id_is_kept_and_duplicates_conflict() {
    let app = TestApp::new().await;
    let body = json!({
        "user_id": 501,
        "location_longitude": 24.9,
        "location_latitude": 60.1,
        "district": "Kallio",
        "region": "Uusimaa"
    });

    let response = app
        .request(Method::POST, "/api/v1/meters", Some(body.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["data"]["user_id"], json!(501));

    let response = app.request(Method::POST, "/api/v1/meters", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/meters",
            Some(json!({
                "location_longitude": 24.9,
                "location_latitude": 95.0,
                "district": "Kallio",
                "region": "Uusimaa"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_place_names_are_rejected() {
    let app = TestApp::new().await;

    for (district, region) in [("   ", "Uusimaa"), ("Kallio", "\t ")] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/meters",
                Some(json!({
                    "location_longitude": 24.9,
                    "location_latitude": 60.1,
                    "district": district,
                    "region": region
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let all = response_json(app.request(Method::GET, "/api/v1/meters", None).await).await;
    assert_eq!(all["data"], json!([]));
}

#[tokio::test]
async fn missing_meter_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/meters/77", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Not Found"));

    let response = app.request(Method::DELETE, "/api/v1/meters/77", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_region_and_district() {
    let app = TestApp::new().await;
    let kallio = app.register_meter("Uusimaa", "Kallio").await;
    let vallila = app.register_meter("Uusimaa", "Vallila").await;
    app.register_meter("Pirkanmaa", "Hervanta").await;

    let all = response_json(app.request(Method::GET, "/api/v1/meters", None).await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 3);

    let region = response_json(
        app.request(Method::GET, "/api/v1/meters?region=Uusimaa", None)
            .await,
    )
    .await;
    let ids: Vec<i64> = region["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["user_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![kallio as i64, vallila as i64]);

    let district = response_json(
        app.request(
            Method::GET,
            "/api/v1/meters?region=Uusimaa&district=Vallila",
            None,
        )
        .await,
    )
    .await;
    assert_eq!(district["data"].as_array().unwrap().len(), 1);
    assert_eq!(district["data"][0]["user_id"], json!(vallila));
}

#[tokio::test]
async fn locations_are_distinct_and_sorted() {
    let app = TestApp::new().await;
    app.register_meter("Uusimaa", "Vallila").await;
    app.register_meter("Pirkanmaa", "Hervanta").await;
    app.register_meter("Uusimaa", "Kallio").await;
    app.register_meter("Uusimaa", "Kallio").await;

    let response = app
        .request(Method::GET, "/api/v1/meters/locations", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body["data"],
        json!([
            { "region": "Pirkanmaa", "district": "Hervanta" },
            { "region": "Uusimaa", "district": "Kallio" },
            { "region": "Uusimaa", "district": "Vallila" }
        ])
    );
}

#[tokio::test]
async fn delete_removes_meter_history() {
    let app = TestApp::new().await;
    let doomed = app.register_meter("Uusimaa", "Kallio").await;
    let kept = app.register_meter("Uusimaa", "Kallio").await;

    for meter in [doomed, kept] {
        for value in [1.0, 2.0] {
            app.request(
                Method::POST,
                "/add_power_value/",
                Some(json!({ "user_id": meter, "power_value": value })),
            )
            .await;
        }
    }

    let response = app
        .request(Method::DELETE, &format!("/api/v1/meters/{doomed}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["data"]["deleted"], json!(true));

    let response = app
        .request(Method::GET, &format!("/api/v1/meters/{doomed}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let db = app.state.db.as_ref();
    assert_eq!(power_value::Entity::find().count(db).await.unwrap(), 2);
    assert_eq!(recent_power_value::Entity::find().count(db).await.unwrap(), 2);
    assert_eq!(anomaly_prediction::Entity::find().count(db).await.unwrap(), 2);
}

#[tokio::test]
async fn padded_filters_match_trimmed_names() {
    let app = TestApp::new().await;
    let kallio = app.register_meter("Uusimaa", "Kallio").await;
    app.register_meter("Pirkanmaa", "Hervanta").await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/meters?region=%20Uusimaa&district=Kallio%20",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["user_id"], json!(kallio));

    let response = app
        .request(
            Method::GET,
            "/api/v1/dashboard/anomaly-summary?region=%20Pirkanmaa%20",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
