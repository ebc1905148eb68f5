//! # API Shared
//!
//! Shared utilities and wire types for the gateway APIs.
//!
//! Contains:
//! - Response types that are not owned by the core crate (`wire` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `gateway-run` binary.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::{ErrorRes, HealthRes};
