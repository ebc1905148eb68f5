/// Errors that can occur when accepting a clinical message payload.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageError {
    /// The payload was empty or contained only whitespace
    #[error("message cannot be empty")]
    Empty,
}

/// Raw clinical message text (an HL7v2 message or a C-CDA document).
///
/// The content is kept exactly as received. HL7v2 uses `\r` as its segment
/// terminator and trailing whitespace can be significant, so unlike most text
/// wrappers nothing is trimmed; a payload is only rejected when it has no
/// non-whitespace character at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalMessage(String);

impl ClinicalMessage {
    pub fn new(input: impl Into<String>) -> Result<Self, MessageError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(MessageError::Empty);
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed message.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ClinicalMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for ClinicalMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ClinicalMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ClinicalMessage::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_segment_terminators_and_padding() {
        let raw = "MSH|^~\\&|SENDER|FAC|||20240101||ADT^A01|MSG00001|P|2.5\rPID|1||123\r";
        let message = ClinicalMessage::new(raw).unwrap();
        assert_eq!(message.as_str(), raw);

        let padded = ClinicalMessage::new("  <ClinicalDocument/>\n").unwrap();
        assert_eq!(padded.as_str(), "  <ClinicalDocument/>\n");
    }

    #[test]
    fn rejects_blank_payloads() {
        assert_eq!(ClinicalMessage::new(""), Err(MessageError::Empty));
        assert_eq!(ClinicalMessage::new(" \r\n\t"), Err(MessageError::Empty));
    }

    #[test]
    fn deserialise_applies_the_same_rule() {
        let message: ClinicalMessage = serde_json::from_str(r#""MSH|^~\\&""#).unwrap();
        assert_eq!(message.as_str(), "MSH|^~\\&");
        assert!(serde_json::from_str::<ClinicalMessage>(r#""   ""#).is_err());
    }
}
