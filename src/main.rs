use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use gateway_core::config::{max_body_bytes_from_env_value, rest_addr_from_env_values};
use gateway_core::{ConversionService, GatewayConfig, ProcessConverter};

/// Main entry point for the FHIR conversion gateway
///
/// Starts the REST server on the configured address (default: 0.0.0.0:8080).
///
/// # Environment Variables
/// - `GATEWAY_REST_ADDR`: REST server address (default: "0.0.0.0:$PORT")
/// - `PORT`: port used when `GATEWAY_REST_ADDR` is unset (default: 8080)
/// - `CONVERTER_COMMAND`: converter program and leading arguments
/// - `CONVERTER_TEMPLATES_DIR`: directory holding the `Hl7v2/` and `Ccda/` templates
/// - `CONVERTER_TIMEOUT_SECS`: per-conversion timeout (default: 60)
/// - `CONVERTER_WORK_DIR`: where scratch directories are created (default: system temp dir)
/// - `GATEWAY_MAX_BODY_BYTES`: largest accepted request body (default: 32 MiB)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gateway=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = rest_addr_from_env_values(
        std::env::var("GATEWAY_REST_ADDR").ok(),
        std::env::var("PORT").ok(),
    )?;
    let max_body_bytes =
        max_body_bytes_from_env_value(std::env::var("GATEWAY_MAX_BODY_BYTES").ok())?;
    let cfg = Arc::new(GatewayConfig::from_env().context("invalid converter configuration")?);

    tracing::info!(
        converter = cfg.converter().program(),
        templates = %cfg.templates_dir().display(),
        timeout_secs = cfg.timeout().as_secs(),
        "-- Converter configured"
    );

    let converter = Arc::new(ProcessConverter::new(cfg));
    let state =
        AppState::new(ConversionService::new(converter)).with_max_body_bytes(max_body_bytes);
    let app = api_rest::router(state);

    tracing::info!("++ Starting FHIR conversion gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Gateway stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix (sent by container runtimes).
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("SIGINT received, shutting down"),
        _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
