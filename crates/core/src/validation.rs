//! Boundary validation for conversion requests.
//!
//! The body is inspected field by field so that every problem is reported in one
//! response, using the `{loc, msg, type, ctx}` item shape clients of the gateway
//! already parse. Nothing here touches the converter.

use serde_json::{Map, Value};

use crate::message::ClinicalMessage;
use crate::request::ConversionRequest;
use crate::template::{InputType, RootTemplate};

pub const BODY_LOCATION: &str = "body";
pub const INPUT_DATA_FIELD: &str = "input_data";
pub const INPUT_TYPE_FIELD: &str = "input_type";
pub const ROOT_TEMPLATE_FIELD: &str = "root_template";

pub const KIND_MISSING: &str = "value_error.missing";
pub const KIND_NONE_NOT_ALLOWED: &str = "type_error.none.not_allowed";
pub const KIND_STR: &str = "type_error.str";
pub const KIND_MIN_LENGTH: &str = "value_error.any_str.min_length";
pub const KIND_ENUM: &str = "type_error.enum";
pub const KIND_DICT: &str = "type_error.dict";
pub const KIND_JSON_DECODE: &str = "value_error.jsondecode";

/// One problem found in a request body.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
pub struct ValidationIssue {
    /// Path to the offending value, starting with `"body"`
    pub loc: Vec<String>,
    pub msg: String,
    /// Error category, e.g. `value_error.missing` or `type_error.enum`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx: Option<IssueContext>,
}

/// Extra detail attached to some issues.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(untagged)]
pub enum IssueContext {
    EnumValues { enum_values: Vec<String> },
    LimitValue { limit_value: usize },
    JsonPosition { lineno: usize, colno: usize },
}

impl ValidationIssue {
    fn new(loc: Vec<String>, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.to_string(),
            ctx: None,
        }
    }

    fn with_ctx(mut self, ctx: IssueContext) -> Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn missing(field: &str) -> Self {
        Self::new(field_loc(field), "field required", KIND_MISSING)
    }

    pub fn none_not_allowed(field: &str) -> Self {
        Self::new(
            field_loc(field),
            "none is not an allowed value",
            KIND_NONE_NOT_ALLOWED,
        )
    }

    pub fn not_a_string(field: &str) -> Self {
        Self::new(field_loc(field), "str type expected", KIND_STR)
    }

    pub fn too_short(field: &str, limit: usize) -> Self {
        Self::new(
            field_loc(field),
            format!("ensure this value has at least {limit} characters"),
            KIND_MIN_LENGTH,
        )
        .with_ctx(IssueContext::LimitValue { limit_value: limit })
    }

    /// Value outside a closed enumeration; `permitted` is listed in full, in order.
    pub fn not_in_enum(field: &str, permitted: &[&str]) -> Self {
        let listing = permitted
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(", ");

        Self::new(
            field_loc(field),
            format!("value is not a valid enumeration member; permitted: {listing}"),
            KIND_ENUM,
        )
        .with_ctx(IssueContext::EnumValues {
            enum_values: permitted.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn not_an_object() -> Self {
        Self::new(body_loc(), "value is not a valid dict", KIND_DICT)
    }

    pub fn body_missing() -> Self {
        Self::new(body_loc(), "field required", KIND_MISSING)
    }

    pub fn json_decode(err: &serde_json::Error) -> Self {
        Self::new(body_loc(), err.to_string(), KIND_JSON_DECODE).with_ctx(
            IssueContext::JsonPosition {
                lineno: err.line(),
                colno: err.column(),
            },
        )
    }

    /// The last element of `loc`, normally the field name.
    pub fn field(&self) -> Option<&str> {
        self.loc.last().map(String::as_str)
    }
}

fn body_loc() -> Vec<String> {
    vec![BODY_LOCATION.to_string()]
}

fn field_loc(field: &str) -> Vec<String> {
    vec![BODY_LOCATION.to_string(), field.to_string()]
}

/// Validates a raw request body.
///
/// # Errors
/// Returns every issue found. An undecodable or non-object body yields a single
/// issue located at `["body"]`.
pub fn validate_conversion_body(body: &[u8]) -> Result<ConversionRequest, Vec<ValidationIssue>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(vec![ValidationIssue::body_missing()]);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| vec![ValidationIssue::json_decode(&e)])?;

    validate_conversion_value(&value)
}

/// Validates an already-decoded JSON body.
///
/// Fields are checked in declaration order and unknown keys are ignored.
pub fn validate_conversion_value(value: &Value) -> Result<ConversionRequest, Vec<ValidationIssue>> {
    let Some(fields) = value.as_object() else {
        return Err(vec![ValidationIssue::not_an_object()]);
    };

    let mut issues = Vec::new();

    let input_data = check_field(fields, INPUT_DATA_FIELD, &mut issues, parse_input_data);
    let input_type = check_field(fields, INPUT_TYPE_FIELD, &mut issues, |v| {
        parse_enum::<InputType>(v, INPUT_TYPE_FIELD, &InputType::permitted_values())
    });
    let root_template = check_field(fields, ROOT_TEMPLATE_FIELD, &mut issues, |v| {
        parse_enum::<RootTemplate>(v, ROOT_TEMPLATE_FIELD, &RootTemplate::permitted_values())
    });

    match (input_data, input_type, root_template) {
        (Some(input_data), Some(input_type), Some(root_template)) if issues.is_empty() => Ok(
            ConversionRequest::new(input_data, input_type, root_template),
        ),
        _ => Err(issues),
    }
}

fn check_field<T>(
    fields: &Map<String, Value>,
    name: &str,
    issues: &mut Vec<ValidationIssue>,
    parse: impl FnOnce(&Value) -> Result<T, ValidationIssue>,
) -> Option<T> {
    let result = match fields.get(name) {
        None => Err(ValidationIssue::missing(name)),
        Some(Value::Null) => Err(ValidationIssue::none_not_allowed(name)),
        Some(value) => parse(value),
    };

    match result {
        Ok(parsed) => Some(parsed),
        Err(issue) => {
            issues.push(issue);
            None
        }
    }
}

fn parse_input_data(value: &Value) -> Result<ClinicalMessage, ValidationIssue> {
    let text = value
        .as_str()
        .ok_or_else(|| ValidationIssue::not_a_string(INPUT_DATA_FIELD))?;

    ClinicalMessage::new(text).map_err(|_| ValidationIssue::too_short(INPUT_DATA_FIELD, 1))
}

fn parse_enum<T: std::str::FromStr>(
    value: &Value,
    field: &str,
    permitted: &[&str],
) -> Result<T, ValidationIssue> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ValidationIssue::not_in_enum(field, permitted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues_for(body: Value) -> Vec<ValidationIssue> {
        validate_conversion_value(&body).expect_err("body should be rejected")
    }

    #[test]
    fn accepts_a_complete_request() {
        let request = validate_conversion_value(&json!({
            "input_data": "VALID_INPUT_DATA",
            "input_type": "hl7v2",
            "root_template": "ADT_A01",
        }))
        .unwrap();

        assert_eq!(request.input_data.as_str(), "VALID_INPUT_DATA");
        assert_eq!(request.input_type, InputType::Hl7v2);
        assert_eq!(request.root_template, RootTemplate::AdtA01);
    }

    #[test]
    fn ignores_unknown_keys() {
        let request = validate_conversion_value(&json!({
            "input_data": "<ClinicalDocument/>",
            "input_type": "ccda",
            "root_template": "CCD",
            "priority": "high",
        }));
        assert!(request.is_ok());
    }

    #[test]
    fn missing_input_data_matches_wire_shape() {
        let issues = issues_for(json!({"input_type": "hl7v2", "root_template": "ADT_A01"}));

        assert_eq!(
            serde_json::to_value(&issues).unwrap(),
            json!([{
                "loc": ["body", "input_data"],
                "msg": "field required",
                "type": "value_error.missing",
            }])
        );
    }

    #[test]
    fn invalid_input_type_lists_permitted_values() {
        let issues = issues_for(json!({
            "input_data": "VALID_INPUT_DATA",
            "input_type": "hl7v3",
            "root_template": "ADT_A01",
        }));

        assert_eq!(
            serde_json::to_value(&issues).unwrap(),
            json!([{
                "loc": ["body", "input_type"],
                "msg": "value is not a valid enumeration member; permitted: 'hl7v2', 'ccda'",
                "type": "type_error.enum",
                "ctx": {"enum_values": ["hl7v2", "ccda"]},
            }])
        );
    }

    #[test]
    fn invalid_root_template_lists_every_template_in_order() {
        let issues = issues_for(json!({
            "input_data": "VALID_INPUT_DATA",
            "input_type": "hl7v2",
            "root_template": "INVALID_ROOT_TEMPLATE",
        }));

        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.field(), Some(ROOT_TEMPLATE_FIELD));
        assert_eq!(issue.kind, KIND_ENUM);
        assert!(issue
            .msg
            .starts_with("value is not a valid enumeration member; permitted: 'ADT_A01', 'ADT_A02'"));
        assert!(issue.msg.ends_with("'ReferralNote', 'TransferSummary'"));

        let Some(IssueContext::EnumValues { enum_values }) = &issue.ctx else {
            panic!("expected enum context, got {:?}", issue.ctx);
        };
        assert_eq!(enum_values.len(), 67);
        assert_eq!(
            enum_values.iter().map(String::as_str).collect::<Vec<_>>(),
            RootTemplate::permitted_values()
        );
    }

    #[test]
    fn reports_every_problem_in_field_order() {
        let issues = issues_for(json!({"root_template": 7, "input_type": "fhir"}));

        let fields: Vec<_> = issues.iter().filter_map(|i| i.field()).collect();
        assert_eq!(fields, vec!["input_data", "input_type", "root_template"]);
        assert_eq!(issues[0].kind, KIND_MISSING);
        assert_eq!(issues[1].kind, KIND_ENUM);
        assert_eq!(issues[2].kind, KIND_ENUM);
    }

    #[test]
    fn empty_object_reports_all_three_fields() {
        let issues = issues_for(json!({}));
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.msg == "field required"));
    }

    #[test]
    fn null_and_wrong_types_are_rejected() {
        let issues = issues_for(json!({
            "input_data": 42,
            "input_type": null,
            "root_template": "ADT_A01",
        }));

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, KIND_STR);
        assert_eq!(issues[1].kind, KIND_NONE_NOT_ALLOWED);
        assert_eq!(issues[1].loc, vec!["body", "input_type"]);
    }

    #[test]
    fn blank_input_data_is_too_short() {
        let issues = issues_for(json!({
            "input_data": "  \r\n",
            "input_type": "hl7v2",
            "root_template": "ADT_A01",
        }));

        assert_eq!(
            serde_json::to_value(&issues).unwrap(),
            json!([{
                "loc": ["body", "input_data"],
                "msg": "ensure this value has at least 1 characters",
                "type": "value_error.any_str.min_length",
                "ctx": {"limit_value": 1},
            }])
        );
    }

    #[test]
    fn enum_values_are_case_sensitive() {
        let issues = issues_for(json!({
            "input_data": "MSH|",
            "input_type": "HL7V2",
            "root_template": "adt_a01",
        }));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn non_object_bodies_are_rejected_at_body_level() {
        for body in [json!([]), json!("text"), json!(3)] {
            let issues = issues_for(body);
            assert_eq!(issues, vec![ValidationIssue::not_an_object()]);
        }
    }

    #[test]
    fn undecodable_body_reports_position() {
        let issues = validate_conversion_body(b"{\"input_data\": ").unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].loc, vec!["body"]);
        assert_eq!(issues[0].kind, KIND_JSON_DECODE);
        assert!(matches!(
            issues[0].ctx,
            Some(IssueContext::JsonPosition { lineno: 1, .. })
        ));
    }

    #[test]
    fn empty_body_is_missing() {
        let issues = validate_conversion_body(b"  \n").unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::body_missing()]);
    }

    #[test]
    fn body_bytes_round_through_value_validation() {
        let body = br#"{"input_data":"MSH|^~\\&|A","input_type":"hl7v2","root_template":"ORU_R01"}"#;
        let request = validate_conversion_body(body).unwrap();
        assert_eq!(request.input_data.as_str(), "MSH|^~\\&|A");
        assert_eq!(request.root_template, RootTemplate::OruR01);
    }
}
