use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use api_shared::ErrorRes;
use gateway_core::{ConverterError, GatewayError, ValidationIssue};

/// Body of a `422` response: every validation issue found in the request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ValidationErrorRes {
    pub detail: Vec<ValidationIssue>,
}

/// Failure of a REST request, mapped onto an HTTP status and JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// The request body failed validation; the converter was not invoked.
    Validation(Vec<ValidationIssue>),
    /// The request was valid but the conversion did not produce a result.
    Conversion(ConverterError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conversion(ConverterError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Conversion(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            ApiError::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Invalid(issues) => ApiError::Validation(issues),
            GatewayError::Converter(e) => ApiError::Conversion(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(detail) => {
                (status, Json(ValidationErrorRes { detail })).into_response()
            }
            ApiError::Conversion(e) if e.is_upstream() => {
                (status, Json(ErrorRes::new(e.to_string()))).into_response()
            }
            ApiError::Conversion(e) => {
                tracing::error!("Conversion result error: {:?}", e);
                (status, Json(ErrorRes::new("Internal error"))).into_response()
            }
        }
    }
}
