//! meterwatch library
//!
//! Ingestion, rolling-window maintenance and anomaly flagging for
//! electricity power-meter readings, plus the query side that backs the
//! dashboard.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod inference;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod window;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires the services around an existing pool and classifier.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        classifier: Arc<dyn inference::AnomalyClassifier>,
    ) -> Self {
        let services =
            handlers::AppServices::new(db.clone(), Arc::new(event_sender.clone()), classifier);
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Versioned API, nested under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    let meters = Router::new()
        .route(
            "/",
            get(handlers::meters::list_meters).post(handlers::meters::create_meter),
        )
        .route("/locations", get(handlers::meters::list_locations))
        .route(
            "/:id",
            get(handlers::meters::get_meter).delete(handlers::meters::delete_meter),
        );

    let dashboard = Router::new()
        .route("/power-values", get(handlers::dashboard::power_history))
        .route("/recent/:id", get(handlers::dashboard::recent_window))
        .route("/predictions", get(handlers::dashboard::predictions))
        .route("/anomaly-summary", get(handlers::dashboard::anomaly_summary))
        .route("/overview", get(handlers::dashboard::overview));

    Router::new()
        .route("/status", get(api_status))
        .route(
            "/power-values",
            post(handlers::power_values::record_power_value),
        )
        .nest("/meters", meters)
        .nest("/dashboard", dashboard)
}

/// Full application router without CORS or compression, which the binary
/// adds from configuration.
pub fn app_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/", get(|| async { "meterwatch up" }))
        .route(
            "/add_power_value/",
            post(handlers::power_values::add_power_value),
        )
        .nest("/api/v1", api_v1_routes())
        .nest("/health", health::health_routes(state.db.clone()))
        .merge(openapi::swagger_ui())
        .layer(TimeoutLayer::new(request_timeout))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}
