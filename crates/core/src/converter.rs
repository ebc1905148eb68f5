//! External converter invocation.
//!
//! The gateway never interprets clinical content itself. A [`Converter`] takes a
//! validated request and returns whatever JSON the conversion produced.
//! [`ProcessConverter`] runs the converter tool as a child process:
//!
//! ```text
//! <program> [leading args] convert -d <templates>/<Hl7v2|Ccda> -r <root template> \
//!     -n <scratch>/input.hl7 -f <scratch>/output.json
//! ```
//!
//! Each invocation gets its own scratch directory, removed when the conversion
//! completes. The child is killed if the timeout elapses or the calling future is
//! dropped.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::constants::{OUTPUT_FILENAME, SCRATCH_DIR_PREFIX, STDERR_CAPTURE_LIMIT};
use crate::error::{ConverterError, ConverterResult};
use crate::request::ConversionRequest;

/// Parsed result artifact, returned to the caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult(Value);

impl ConversionResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The converter's `Status` marker, if present.
    pub fn status(&self) -> Option<&str> {
        self.0.get("Status").and_then(Value::as_str)
    }

    /// The converted FHIR document, if present.
    pub fn fhir_resource(&self) -> Option<&Value> {
        self.0.get("FhirResource")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// One conversion handed to a [`Converter`].
#[derive(Debug, Clone, Copy)]
pub struct ConversionJob<'a> {
    pub id: Uuid,
    pub request: &'a ConversionRequest,
}

#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, job: &ConversionJob<'_>) -> ConverterResult<ConversionResult>;
}

/// Runs the converter tool as a child process.
#[derive(Clone, Debug)]
pub struct ProcessConverter {
    cfg: Arc<GatewayConfig>,
}

impl ProcessConverter {
    pub fn new(cfg: Arc<GatewayConfig>) -> Self {
        Self { cfg }
    }

    fn command(
        &self,
        request: &ConversionRequest,
        input: &Path,
        output: &Path,
    ) -> tokio::process::Command {
        let converter = self.cfg.converter();
        let mut command = tokio::process::Command::new(converter.program());
        command
            .args(converter.leading_args())
            .arg("convert")
            .arg("-d")
            .arg(self.cfg.template_dir_for(request.input_type))
            .arg("-r")
            .arg(request.root_template.as_str())
            .arg("-n")
            .arg(input)
            .arg("-f")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Converter for ProcessConverter {
    async fn convert(&self, job: &ConversionJob<'_>) -> ConverterResult<ConversionResult> {
        let request = job.request;

        let scratch = tempfile::Builder::new()
            .prefix(&format!("{SCRATCH_DIR_PREFIX}{}-", job.id.simple()))
            .tempdir_in(self.cfg.work_dir())
            .map_err(ConverterError::Workspace)?;

        let input_path = scratch.path().join(request.input_type.input_filename());
        let output_path = scratch.path().join(OUTPUT_FILENAME);

        tokio::fs::write(&input_path, request.input_data.as_str())
            .await
            .map_err(ConverterError::Workspace)?;

        let mut child = self
            .command(request, &input_path, &output_path)
            .spawn()
            .map_err(ConverterError::Spawn)?;
        let stderr = child.stderr.take();

        let finished = async {
            let (status, stderr) = tokio::join!(child.wait(), capture_stderr(stderr));
            status.map(|status| (status, stderr))
        };
        let waited = tokio::time::timeout(self.cfg.timeout(), finished).await;
        let (status, stderr) = match waited {
            Ok(result) => result.map_err(ConverterError::Spawn)?,
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    tracing::warn!("failed to kill converter after timeout: {}", e);
                }
                return Err(ConverterError::TimedOut(self.cfg.timeout()));
            }
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            tracing::debug!(stderr = %stderr.trim_end(), "converter stderr");
            return Err(ConverterError::Failed {
                code: status.code(),
            });
        }

        let artifact = tokio::fs::read(&output_path)
            .await
            .map_err(ConverterError::ArtifactMissing)?;
        let value: Value =
            serde_json::from_slice(&artifact).map_err(ConverterError::ArtifactParse)?;

        Ok(ConversionResult::new(value))
    }
}

/// Keep the first [`STDERR_CAPTURE_LIMIT`] bytes of `stderr` and drain the rest, so a
/// chatty converter never blocks on a full pipe.
async fn capture_stderr<R: AsyncRead + Unpin>(stderr: Option<R>) -> Vec<u8> {
    let mut captured = Vec::new();
    let Some(stderr) = stderr else {
        return captured;
    };

    let mut head = stderr.take(STDERR_CAPTURE_LIMIT as u64);
    if head.read_to_end(&mut captured).await.is_ok() {
        let _ = tokio::io::copy(&mut head.into_inner(), &mut tokio::io::sink()).await;
    }
    captured
}
