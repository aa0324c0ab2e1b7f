use crate::{
    entities::{anomaly_prediction, power_value, recent_power_value},
    handlers::meters::MeterResponse,
    services::dashboard::{AnomalySummary, MeterSelection},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Meter filter shared by the dashboard endpoints.
#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Single meter; takes precedence over region/district
    pub user_id: Option<i32>,
    pub region: Option<String>,
    /// Only valid together with `region`
    pub district: Option<String>,
}

impl DashboardQuery {
    fn selection(self) -> Result<MeterSelection, crate::errors::ServiceError> {
        MeterSelection::from_parts(self.user_id, self.region, self.district)
    }
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PredictionQuery {
    pub user_id: Option<i32>,
    pub region: Option<String>,
    pub district: Option<String>,
    /// Only predictions that flagged an anomaly
    #[serde(default)]
    pub anomalies_only: bool,
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverviewQuery {
    /// Rows per table (default 5, max 100)
    pub limit: Option<u64>,
}

/// A stored reading, from either the full history or the recent window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PowerValueResponse {
    pub id: i32,
    pub user_id: i32,
    pub power_value: f64,
    pub date_logged: NaiveDate,
}

impl From<power_value::Model> for PowerValueResponse {
    fn from(model: power_value::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            power_value: model.power_value,
            date_logged: model.date_logged,
        }
    }
}

impl From<recent_power_value::Model> for PowerValueResponse {
    fn from(model: recent_power_value::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            power_value: model.power_value,
            date_logged: model.date_logged,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub id: i32,
    pub user_id: i32,
    pub anomaly: bool,
    pub date_predicted: NaiveDate,
}

impl From<anomaly_prediction::Model> for PredictionResponse {
    fn from(model: anomaly_prediction::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            anomaly: model.anomaly,
            date_predicted: model.date_predicted,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OverviewResponse {
    pub power_meters: Vec<MeterResponse>,
    pub power_values: Vec<PowerValueResponse>,
    pub recent_power_values: Vec<PowerValueResponse>,
    pub anomaly_predictions: Vec<PredictionResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/power-values",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Readings over time", body = ApiResponse<Vec<PowerValueResponse>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 404, description = "Meter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn power_history(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Vec<PowerValueResponse>> {
    let selection = query.selection()?;
    let rows = state.services.dashboard.power_history(&selection).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(PowerValueResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/recent/:id",
    params(
        ("id" = i32, Path, description = "Meter ID")
    ),
    responses(
        (status = 200, description = "Recent window, oldest first", body = ApiResponse<Vec<PowerValueResponse>>),
        (status = 404, description = "Meter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn recent_window(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<PowerValueResponse>> {
    let rows = state.services.dashboard.recent_window(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(PowerValueResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/predictions",
    params(PredictionQuery),
    responses(
        (status = 200, description = "Predictions over time", body = ApiResponse<Vec<PredictionResponse>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 404, description = "Meter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> ApiResult<Vec<PredictionResponse>> {
    let selection = MeterSelection::from_parts(query.user_id, query.region, query.district)?;
    let rows = state
        .services
        .dashboard
        .predictions(&selection, query.anomalies_only)
        .await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(PredictionResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/anomaly-summary",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Anomaly counts", body = ApiResponse<AnomalySummary>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 404, description = "Meter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn anomaly_summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<AnomalySummary> {
    let selection = query.selection()?;
    let summary = state.services.dashboard.anomaly_summary(&selection).await?;
    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/overview",
    params(OverviewQuery),
    responses(
        (status = 200, description = "First rows of every table", body = ApiResponse<OverviewResponse>)
    ),
    tag = "dashboard"
)]
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> ApiResult<OverviewResponse> {
    let overview = state.services.dashboard.overview(query.limit).await?;
    Ok(Json(ApiResponse::success(OverviewResponse {
        power_meters: overview
            .power_meters
            .into_iter()
            .map(MeterResponse::from)
            .collect(),
        power_values: overview
            .power_values
            .into_iter()
            .map(PowerValueResponse::from)
            .collect(),
        recent_power_values: overview
            .recent_power_values
            .into_iter()
            .map(PowerValueResponse::from)
            .collect(),
        anomaly_predictions: overview
            .anomaly_predictions
            .into_iter()
            .map(PredictionResponse::from)
            .collect(),
    })))
}
