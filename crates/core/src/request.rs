use crate::message::ClinicalMessage;
use crate::template::{InputType, RootTemplate};

/// A conversion request that has passed validation.
///
/// Built by [`crate::validation::validate_conversion_body`] from the raw HTTP body, or
/// directly by callers that already hold typed values (the CLI).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ConversionRequest {
    /// HL7v2 message or C-CDA document, passed to the converter unchanged
    #[schema(value_type = String, min_length = 1)]
    pub input_data: ClinicalMessage,
    pub input_type: InputType,
    pub root_template: RootTemplate,
}

impl ConversionRequest {
    pub fn new(
        input_data: ClinicalMessage,
        input_type: InputType,
        root_template: RootTemplate,
    ) -> Self {
        Self {
            input_data,
            input_type,
            root_template,
        }
    }

    /// Whether the root template was written for the declared input type.
    ///
    /// The converter decides what to do with a mismatch; the gateway only logs it.
    pub fn template_matches_input_type(&self) -> bool {
        self.root_template.family() == self.input_type
    }
}
