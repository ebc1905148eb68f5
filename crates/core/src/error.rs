use std::time::Duration;

use crate::validation::ValidationIssue;

/// Errors raised while running the external converter.
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    #[error("failed to prepare conversion workspace: {0}")]
    Workspace(std::io::Error),
    #[error("failed to start converter: {0}")]
    Spawn(std::io::Error),
    #[error("converter exited with {}", describe_exit(.code))]
    Failed { code: Option<i32> },
    #[error("converter did not finish within {}s", .0.as_secs_f64())]
    TimedOut(Duration),
    #[error("converter finished but wrote no result: {0}")]
    ArtifactMissing(std::io::Error),
    #[error("converter result is not valid JSON: {0}")]
    ArtifactParse(serde_json::Error),
}

impl ConverterError {
    /// True when the converter itself reported failure or could not run to completion,
    /// as opposed to a problem on the gateway side.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ConverterError::Spawn(_) | ConverterError::Failed { .. } | ConverterError::TimedOut(_)
        )
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type ConverterResult<T> = std::result::Result<T, ConverterError>;

/// Errors raised while resolving configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a directory: {}", path.display())]
    NotADirectory {
        name: &'static str,
        path: std::path::PathBuf,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Outcome of a conversion request that did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed validation ({} issue(s))", .0.len())]
    Invalid(Vec<ValidationIssue>),
    #[error(transparent)]
    Converter(#[from] ConverterError),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
