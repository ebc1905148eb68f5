//! # API REST
//!
//! REST API implementation for the FHIR conversion gateway.
//!
//! Handles:
//! - HTTP endpoints with axum (`GET /`, `POST /convert-to-fhir`)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (status codes, JSON error bodies, CORS, access logs)
//!
//! Validation and conversion live in `gateway-core`; this crate only maps their
//! outcomes onto HTTP.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, HealthRes};
use gateway_core::constants::DEFAULT_MAX_BODY_BYTES;
use gateway_core::{
    ConversionRequest, ConversionService, InputType, IssueContext, RootTemplate, ValidationIssue,
};

pub use error::{ApiError, ValidationErrorRes};

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    conversion_service: Arc<ConversionService>,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(conversion_service: ConversionService) -> Self {
        Self {
            conversion_service: Arc::new(conversion_service),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Largest request body accepted; larger bodies get `413 Payload Too Large`.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::convert_to_fhir),
    components(schemas(
        HealthRes,
        ErrorRes,
        ConversionRequest,
        InputType,
        RootTemplate,
        ValidationIssue,
        IssueContext,
        ValidationErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with docs, CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/", get(handlers::health))
        .route("/convert-to-fhir", post(handlers::convert_to_fhir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
