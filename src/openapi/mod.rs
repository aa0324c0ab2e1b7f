use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "meterwatch API",
        version = "0.1.0",
        description = r#"
# meterwatch

Ingests electricity power-meter readings, keeps a rolling window of the 25
most recent readings per meter, flags anomalies and serves the stored data to
dashboards.

## Ingestion

Meters post to `/add_power_value/` and receive the prediction as a bare JSON
object. `/api/v1/power-values` accepts the same body and wraps the result in
the standard envelope.

## Error Handling

Errors share one format:

```json
{
  "error": "Not Found",
  "message": "Not found: power meter 42 not found",
  "request_id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "power-values", description = "Reading ingestion"),
        (name = "meters", description = "Meter registry"),
        (name = "dashboard", description = "Dashboard queries")
    ),
    paths(
        // Ingestion
        crate::handlers::power_values::add_power_value,
        crate::handlers::power_values::record_power_value,

        // Meters
        crate::handlers::meters::create_meter,
        crate::handlers::meters::list_meters,
        crate::handlers::meters::get_meter,
        crate::handlers::meters::delete_meter,
        crate::handlers::meters::list_locations,

        // Dashboard
        crate::handlers::dashboard::power_history,
        crate::handlers::dashboard::recent_window,
        crate::handlers::dashboard::predictions,
        crate::handlers::dashboard::anomaly_summary,
        crate::handlers::dashboard::overview,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,

            crate::services::ingestion::PowerValueInput,
            crate::services::ingestion::PredictionOutput,
            crate::window::WindowEntry,

            crate::services::meters::CreateMeterRequest,
            crate::services::meters::Location,
            crate::handlers::meters::MeterResponse,

            crate::services::dashboard::AnomalySummary,
            crate::handlers::dashboard::PowerValueResponse,
            crate::handlers::dashboard::PredictionResponse,
            crate::handlers::dashboard::OverviewResponse,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
