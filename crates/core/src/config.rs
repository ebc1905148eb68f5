//! Gateway runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into services as
//! `Arc<GatewayConfig>`. Request handling never reads environment variables.
//! The `*_from_env_value` helpers take the raw variable value so they can be
//! tested without touching the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_CONVERTER_COMMAND, DEFAULT_CONVERTER_TIMEOUT_SECS, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_REST_PORT, DEFAULT_TEMPLATES_DIR,
};
use crate::error::{ConfigError, ConfigResult};
use crate::template::InputType;

/// Program used to run the converter, with any arguments that precede the
/// `convert` sub-command (for example `dotnet Microsoft.Health.Fhir.Liquid.Converter.Tool.dll`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterCommand {
    program: String,
    leading_args: Vec<String>,
}

impl ConverterCommand {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> ConfigResult<Self> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "converter program cannot be empty".into(),
            ));
        }
        Ok(Self {
            program,
            leading_args,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn leading_args(&self) -> &[String] {
        &self.leading_args
    }
}

/// Gateway configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    converter: ConverterCommand,
    templates_dir: PathBuf,
    timeout: Duration,
    work_dir: Option<PathBuf>,
}

impl GatewayConfig {
    /// Create a new `GatewayConfig`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the timeout is zero or a directory does not exist.
    pub fn new(
        converter: ConverterCommand,
        templates_dir: PathBuf,
        timeout: Duration,
        work_dir: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        if timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "converter timeout must be greater than zero".into(),
            ));
        }

        ensure_dir("CONVERTER_TEMPLATES_DIR", &templates_dir)?;
        for input_type in InputType::ALL {
            let family_dir = templates_dir.join(input_type.template_folder());
            if !family_dir.is_dir() {
                tracing::warn!(
                    "no {} templates found at {}",
                    input_type,
                    family_dir.display()
                );
            }
        }

        if let Some(work_dir) = &work_dir {
            ensure_dir("CONVERTER_WORK_DIR", work_dir)?;
        }

        Ok(Self {
            converter,
            templates_dir,
            timeout,
            work_dir,
        })
    }

    /// Build the configuration from process environment variables.
    ///
    /// Intended to be called once from a binary's `main`.
    pub fn from_env() -> ConfigResult<Self> {
        let converter = converter_command_from_env_value(std::env::var("CONVERTER_COMMAND").ok())?;
        let templates_dir =
            templates_dir_from_env_value(std::env::var("CONVERTER_TEMPLATES_DIR").ok());
        let timeout = timeout_from_env_value(std::env::var("CONVERTER_TIMEOUT_SECS").ok())?;
        let work_dir = std::env::var("CONVERTER_WORK_DIR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self::new(converter, templates_dir, timeout, work_dir)
    }

    pub fn converter(&self) -> &ConverterCommand {
        &self.converter
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Template folder passed to the converter for `input_type`.
    pub fn template_dir_for(&self, input_type: InputType) -> PathBuf {
        self.templates_dir.join(input_type.template_folder())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Directory scratch directories are created in; the system temp dir when unset.
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn ensure_dir(name: &'static str, path: &Path) -> ConfigResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::NotADirectory {
            name,
            path: path.to_path_buf(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `CONVERTER_COMMAND`: whitespace-separated program and leading arguments.
pub fn converter_command_from_env_value(value: Option<String>) -> ConfigResult<ConverterCommand> {
    let value = non_blank(value).unwrap_or_else(|| DEFAULT_CONVERTER_COMMAND.to_string());
    let mut parts = value.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_default();

    ConverterCommand::new(program, parts.collect())
}

/// Parse `CONVERTER_TEMPLATES_DIR`.
pub fn templates_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_TEMPLATES_DIR.to_string()))
}

/// Parse `CONVERTER_TIMEOUT_SECS`.
pub fn timeout_from_env_value(value: Option<String>) -> ConfigResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_CONVERTER_TIMEOUT_SECS));
    };

    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidNumber {
            name: "CONVERTER_TIMEOUT_SECS",
            value: raw,
        }),
    }
}

/// Parse `GATEWAY_MAX_BODY_BYTES`: the largest request body the REST API accepts.
pub fn max_body_bytes_from_env_value(value: Option<String>) -> ConfigResult<usize> {
    let Some(raw) = non_blank(value) else {
        return Ok(DEFAULT_MAX_BODY_BYTES);
    };

    match raw.parse::<usize>() {
        Ok(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(ConfigError::InvalidNumber {
            name: "GATEWAY_MAX_BODY_BYTES",
            value: raw,
        }),
    }
}

/// Resolve the REST listen address from `GATEWAY_REST_ADDR` and `PORT`.
///
/// An explicit address wins; otherwise the server binds every interface on `PORT`
/// (as set by container platforms), falling back to the default port.
pub fn rest_addr_from_env_values(addr: Option<String>, port: Option<String>) -> ConfigResult<String> {
    if let Some(addr) = non_blank(addr) {
        return Ok(addr);
    }

    let port = match non_blank(port) {
        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            name: "PORT",
            value: raw,
        })?,
        None => DEFAULT_REST_PORT,
    };

    Ok(format!("0.0.0.0:{port}"))
}
