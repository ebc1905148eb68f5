use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::converter::{ConversionJob, ConversionResult, Converter};
use crate::error::{GatewayError, GatewayResult};
use crate::request::ConversionRequest;
use crate::validation::validate_conversion_body;

/// Validates conversion requests and hands them to a [`Converter`].
///
/// Shared by the REST API and the CLI. Holds no per-request state, so one
/// instance serves every request.
#[derive(Clone)]
pub struct ConversionService {
    converter: Arc<dyn Converter>,
}

impl ConversionService {
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self { converter }
    }

    /// Validate a raw request body and convert it.
    ///
    /// # Errors
    /// Returns `GatewayError::Invalid` without invoking the converter if the body
    /// fails validation, or `GatewayError::Converter` if the conversion fails.
    pub async fn convert_json(&self, body: &[u8]) -> GatewayResult<ConversionResult> {
        let request = validate_conversion_body(body).map_err(|issues| {
            tracing::debug!(issues = issues.len(), "conversion request rejected");
            GatewayError::Invalid(issues)
        })?;

        self.convert(&request).await
    }

    /// Convert a request that has already been validated.
    pub async fn convert(&self, request: &ConversionRequest) -> GatewayResult<ConversionResult> {
        let job = ConversionJob {
            id: Uuid::new_v4(),
            request,
        };

        let span = tracing::info_span!(
            "conversion",
            id = %job.id.simple(),
            input_type = %request.input_type,
            root_template = %request.root_template,
        );

        async move {
            if !request.template_matches_input_type() {
                tracing::warn!(
                    "root template {} is a {} template but input type is {}",
                    request.root_template,
                    request.root_template.family(),
                    request.input_type
                );
            }

            let started = Instant::now();
            match self.converter.convert(&job).await {
                Ok(result) => {
                    let resource_type = result
                        .fhir_resource()
                        .and_then(|r| r.get("resourceType"))
                        .and_then(|t| t.as_str());
                    tracing::info!(
                        status = result.status().unwrap_or("<none>"),
                        resource_type = resource_type.unwrap_or("<none>"),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        bytes = request.input_data.len(),
                        "conversion finished"
                    );
                    Ok(result)
                }
                Err(e) => {
                    tracing::error!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "conversion error: {}",
                        e
                    );
                    Err(GatewayError::Converter(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConverterError, ConverterResult};
    use crate::template::{InputType, RootTemplate};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every job and replies with a canned outcome.
    struct RecordingConverter {
        calls: AtomicUsize,
        seen: Mutex<Vec<(InputType, RootTemplate)>>,
        fail: bool,
    }

    impl RecordingConverter {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl Converter for RecordingConverter {
        async fn convert(&self, job: &ConversionJob<'_>) -> ConverterResult<ConversionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((job.request.input_type, job.request.root_template));
            if self.fail {
                return Err(ConverterError::Failed { code: Some(1) });
            }
            Ok(ConversionResult::new(json!({"Status": "OK", "FhirResource": {}})))
        }
    }

    #[tokio::test]
    async fn valid_body_reaches_the_converter() {
        let converter = RecordingConverter::new(false);
        let service = ConversionService::new(converter.clone());

        let result = service
            .convert_json(br#"{"input_data":"MSH|","input_type":"hl7v2","root_template":"VXU_V04"}"#)
            .await
            .unwrap();

        assert_eq!(result.status(), Some("OK"));
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *converter.seen.lock().unwrap(),
            vec![(InputType::Hl7v2, RootTemplate::VxuV04)]
        );
    }

    #[tokio::test]
    async fn invalid_body_never_reaches_the_converter() {
        let converter = RecordingConverter::new(false);
        let service = ConversionService::new(converter.clone());

        let err = service
            .convert_json(br#"{"input_type":"hl7v2","root_template":"NOPE"}"#)
            .await
            .unwrap_err();

        let issues = match err {
            GatewayError::Invalid(issues) => issues,
            other => panic!("expected validation failure, got {other:?}"),
        };
        assert_eq!(issues.len(), 2);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn converter_errors_are_passed_through() {
        let converter = RecordingConverter::new(true);
        let service = ConversionService::new(converter.clone());

        let err = service
            .convert_json(br#"{"input_data":"<x/>","input_type":"ccda","root_template":"ADT_A01"}"#)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Converter(ConverterError::Failed { code: Some(1) })
        ));
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
    }
}
