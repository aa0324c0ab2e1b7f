use crate::{
    errors::ServiceError,
    services::ingestion::{PowerValueInput, PredictionOutput},
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::Json};

/// Ingestion endpoint in the shape existing meter clients post to: the
/// prediction comes back bare, without the API envelope.
#[utoipa::path(
    post,
    path = "/add_power_value/",
    request_body = PowerValueInput,
    responses(
        (status = 200, description = "Reading stored and classified", body = PredictionOutput),
        (status = 400, description = "Invalid reading", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown meter", body = crate::errors::ErrorResponse)
    ),
    tag = "power-values"
)]
pub async fn add_power_value(
    State(state): State<AppState>,
    Json(payload): Json<PowerValueInput>,
) -> Result<Json<PredictionOutput>, ServiceError> {
    let prediction = state.services.ingestion.add_power_value(payload).await?;
    Ok(Json(prediction))
}

#[utoipa::path(
    post,
    path = "/api/v1/power-values",
    request_body = PowerValueInput,
    responses(
        (status = 200, description = "Reading stored and classified", body = ApiResponse<PredictionOutput>),
        (status = 400, description = "Invalid reading", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown meter", body = crate::errors::ErrorResponse)
    ),
    tag = "power-values"
)]
pub async fn record_power_value(
    State(state): State<AppState>,
    Json(payload): Json<PowerValueInput>,
) -> ApiResult<PredictionOutput> {
    let prediction = state.services.ingestion.add_power_value(payload).await?;
    Ok(Json(ApiResponse::success(prediction)))
}
