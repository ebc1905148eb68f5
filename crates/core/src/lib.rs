//! # Gateway Core
//!
//! Core logic for the FHIR conversion gateway.
//!
//! This crate validates conversion requests and delegates the conversion itself to an
//! external converter process:
//! - Closed enumerations for input types and root templates
//! - Field-by-field request validation with itemised issues
//! - The [`Converter`] seam and the process-backed [`ProcessConverter`]
//! - Startup configuration resolved from the environment
//!
//! **No API concerns**: HTTP routing, status codes and OpenAPI docs belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod message;
pub mod request;
pub mod service;
pub mod template;
pub mod validation;

pub use config::{ConverterCommand, GatewayConfig};
pub use converter::{ConversionJob, ConversionResult, Converter, ProcessConverter};
pub use error::{
    ConfigError, ConfigResult, ConverterError, ConverterResult, GatewayError, GatewayResult,
};
pub use message::{ClinicalMessage, MessageError};
pub use request::ConversionRequest;
pub use service::ConversionService;
pub use template::{InputType, RootTemplate, UnknownVariant};
pub use validation::{IssueContext, ValidationIssue};
