//! JSON bodies returned by the REST API that are not produced by the converter.

/// Liveness payload returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthRes {
    #[schema(example = "OK")]
    pub status: String,
}

/// Body returned when a valid request could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorRes {
    /// Human readable description of the failure
    pub detail: String,
}

impl ErrorRes {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
