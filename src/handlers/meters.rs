use crate::{
    entities::power_meter,
    services::meters::{CreateMeterRequest, Location},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MeterListQuery {
    pub region: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "user_id": 17,
    "location_longitude": 24.9384,
    "location_latitude": 60.1699,
    "district": "Kallio",
    "region": "Uusimaa"
}))]
pub struct MeterResponse {
    /// Meter identifier
    #[schema(example = 17)]
    pub user_id: i32,
    pub location_longitude: f64,
    pub location_latitude: f64,
    #[schema(example = "Kallio")]
    pub district: String,
    #[schema(example = "Uusimaa")]
    pub region: String,
}

impl From<power_meter::Model> for MeterResponse {
    fn from(model: power_meter::Model) -> Self {
        Self {
            user_id: model.user_id,
            location_longitude: model.location_longitude,
            location_latitude: model.location_latitude,
            district: model.district,
            region: model.region,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/meters",
    request_body = CreateMeterRequest,
    responses(
        (status = 200, description = "Meter registered", body = ApiResponse<MeterResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Meter id already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "meters"
)]
pub async fn create_meter(
    State(state): State<AppState>,
    Json(payload): Json<CreateMeterRequest>,
) -> ApiResult<MeterResponse> {
    let meter = state.services.meters.register_meter(payload).await?;
    Ok(Json(ApiResponse::success(MeterResponse::from(meter))))
}

#[utoipa::path(
    get,
    path = "/api/v1/meters",
    params(MeterListQuery),
    responses(
        (status = 200, description = "Meters listed", body = ApiResponse<Vec<MeterResponse>>)
    ),
    tag = "meters"
)]
pub async fn list_meters(
    State(state): State<AppState>,
    Query(query): Query<MeterListQuery>,
) -> ApiResult<Vec<MeterResponse>> {
    let meters = state
        .services
        .meters
        .list_meters(query.region.as_deref(), query.district.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        meters.into_iter().map(MeterResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/meters/:id",
    params(
        ("id" = i32, Path, description = "Meter ID")
    ),
    responses(
        (status = 200, description = "Meter fetched", body = ApiResponse<MeterResponse>),
        (status = 404, description = "Meter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "meters"
)]
pub async fn get_meter(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<MeterResponse> {
    let meter = state.services.meters.get_meter(id).await?;
    Ok(Json(ApiResponse::success(MeterResponse::from(meter))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/meters/:id",
    params(
        ("id" = i32, Path, description = "Meter ID")
    ),
    responses(
        (status = 200, description = "Meter and its history deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Meter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "meters"
)]
pub async fn delete_meter(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    state.services.meters.delete_meter(id).await?;
    Ok(Json(ApiResponse::success(
        json!({ "user_id": id, "deleted": true }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/meters/locations",
    responses(
        (status = 200, description = "Distinct region/district pairs", body = ApiResponse<Vec<Location>>)
    ),
    tag = "meters"
)]
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<Vec<Location>> {
    let locations = state.services.meters.list_locations().await?;
    Ok(Json(ApiResponse::success(locations)))
}
