use axum::{body::Bytes, extract::State, response::Json};
use serde_json::Value;

use api_shared::{ErrorRes, HealthRes, HealthService};
use gateway_core::ConversionRequest;

use crate::error::{ApiError, ValidationErrorRes};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports liveness only. The converter is not invoked, so this stays healthy
/// even when the converter is missing or broken.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/convert-to-fhir",
    request_body = ConversionRequest,
    responses(
        (status = 200, description = "Converter result, returned unchanged", content_type = "application/json"),
        (status = 413, description = "Request body exceeds the configured limit"),
        (status = 422, description = "Request failed validation", body = ValidationErrorRes),
        (status = 500, description = "Converter result could not be read", body = ErrorRes),
        (status = 502, description = "Converter failed or could not be started", body = ErrorRes),
        (status = 504, description = "Converter timed out", body = ErrorRes)
    )
)]
/// Convert a clinical message to FHIR
///
/// Validates the body, runs the converter with the requested root template and
/// returns the converter's JSON result as-is.
///
/// # Errors
/// Returns `422 Unprocessable Entity` with an itemised `detail` list if the body is
/// invalid; the converter is not run in that case. Bodies over the configured limit
/// get `413`. Converter failures map to `502`, timeouts to `504`, and unreadable
/// results to `500`.
#[axum::debug_handler]
pub(crate) async fn convert_to_fhir(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let result = state.conversion_service.convert_json(&body).await?;
    Ok(Json(result.into_value()))
}
