//! Constants used throughout the gateway core crate.
//!
//! Defaults for configuration and the fixed filenames used inside each
//! conversion's scratch directory.

/// Converter program used when `CONVERTER_COMMAND` is not set.
pub const DEFAULT_CONVERTER_COMMAND: &str = "Microsoft.Health.Fhir.Liquid.Converter.Tool";

/// Templates root used when `CONVERTER_TEMPLATES_DIR` is not set.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Converter timeout in seconds used when `CONVERTER_TIMEOUT_SECS` is not set.
pub const DEFAULT_CONVERTER_TIMEOUT_SECS: u64 = 60;

/// Port used when neither `GATEWAY_REST_ADDR` nor `PORT` is set.
pub const DEFAULT_REST_PORT: u16 = 8080;

/// Template sub-folder for HL7v2 messages.
pub const HL7V2_TEMPLATE_FOLDER: &str = "Hl7v2";

/// Template sub-folder for C-CDA documents.
pub const CCDA_TEMPLATE_FOLDER: &str = "Ccda";

/// Scratch filename for HL7v2 input.
pub const HL7V2_INPUT_FILENAME: &str = "input.hl7";

/// Scratch filename for C-CDA input.
pub const CCDA_INPUT_FILENAME: &str = "input.xml";

/// Scratch filename the converter writes its result to.
pub const OUTPUT_FILENAME: &str = "output.json";

/// Prefix for per-conversion scratch directories.
pub const SCRATCH_DIR_PREFIX: &str = "fhir-conversion-";

/// Request body limit used when `GATEWAY_MAX_BODY_BYTES` is not set.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Most converter stderr kept for the debug log; the rest is drained and discarded.
pub const STDERR_CAPTURE_LIMIT: usize = 64 * 1024;
