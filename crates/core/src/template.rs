//! Input types and root templates accepted by the converter.
//!
//! Both are closed sets. Parsing happens at the request boundary so nothing past
//! validation ever sees a free-form template string.

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    CCDA_INPUT_FILENAME, CCDA_TEMPLATE_FOLDER, HL7V2_INPUT_FILENAME, HL7V2_TEMPLATE_FOLDER,
};

/// Encoding of the inbound clinical message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Hl7v2,
    Ccda,
}

impl InputType {
    /// Permitted values in canonical order.
    pub const ALL: [InputType; 2] = [InputType::Hl7v2, InputType::Ccda];

    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Hl7v2 => "hl7v2",
            InputType::Ccda => "ccda",
        }
    }

    /// Sub-folder of the templates directory holding this family's templates.
    pub fn template_folder(self) -> &'static str {
        match self {
            InputType::Hl7v2 => HL7V2_TEMPLATE_FOLDER,
            InputType::Ccda => CCDA_TEMPLATE_FOLDER,
        }
    }

    /// Filename the message is written to inside the scratch directory.
    pub fn input_filename(self) -> &'static str {
        match self {
            InputType::Hl7v2 => HL7V2_INPUT_FILENAME,
            InputType::Ccda => CCDA_INPUT_FILENAME,
        }
    }

    pub fn permitted_values() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for InputType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "input type",
                value: s.to_string(),
            })
    }
}

macro_rules! root_templates {
    (
        hl7v2: [$($hl7_variant:ident => $hl7_name:literal),+ $(,)?],
        ccda: [$($ccda_variant:ident => $ccda_name:literal),+ $(,)?] $(,)?
    ) => {
        /// Mapping profile the converter applies to the message.
        ///
        /// HL7v2 templates are named after the trigger event (`ADT_A01`); C-CDA templates
        /// after the document kind (`DischargeSummary`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum RootTemplate {
            $($hl7_variant,)+
            $($ccda_variant,)+
        }

        impl RootTemplate {
            /// Permitted values in canonical order.
            pub const ALL: &'static [RootTemplate] = &[
                $(RootTemplate::$hl7_variant,)+
                $(RootTemplate::$ccda_variant,)+
            ];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(RootTemplate::$hl7_variant => $hl7_name,)+
                    $(RootTemplate::$ccda_variant => $ccda_name,)+
                }
            }

            /// The input type this template was written for.
            pub fn family(self) -> InputType {
                match self {
                    $(RootTemplate::$hl7_variant => InputType::Hl7v2,)+
                    $(RootTemplate::$ccda_variant => InputType::Ccda,)+
                }
            }
        }
    };
}

root_templates! {
    hl7v2: [
        AdtA01 => "ADT_A01",
        AdtA02 => "ADT_A02",
        AdtA03 => "ADT_A03",
        AdtA04 => "ADT_A04",
        AdtA05 => "ADT_A05",
        AdtA06 => "ADT_A06",
        AdtA07 => "ADT_A07",
        AdtA08 => "ADT_A08",
        AdtA09 => "ADT_A09",
        AdtA10 => "ADT_A10",
        AdtA11 => "ADT_A11",
        AdtA13 => "ADT_A13",
        AdtA14 => "ADT_A14",
        AdtA15 => "ADT_A15",
        AdtA16 => "ADT_A16",
        AdtA25 => "ADT_A25",
        AdtA26 => "ADT_A26",
        AdtA27 => "ADT_A27",
        AdtA28 => "ADT_A28",
        AdtA29 => "ADT_A29",
        AdtA31 => "ADT_A31",
        AdtA40 => "ADT_A40",
        AdtA41 => "ADT_A41",
        AdtA45 => "ADT_A45",
        AdtA47 => "ADT_A47",
        AdtA60 => "ADT_A60",
        BarP01 => "BAR_P01",
        BarP02 => "BAR_P02",
        BarP12 => "BAR_P12",
        DftP03 => "DFT_P03",
        DftP11 => "DFT_P11",
        MdmT01 => "MDM_T01",
        MdmT02 => "MDM_T02",
        MdmT05 => "MDM_T05",
        MdmT06 => "MDM_T06",
        MdmT09 => "MDM_T09",
        MdmT10 => "MDM_T10",
        OmgO19 => "OMG_O19",
        OmlO21 => "OML_O21",
        OrmO01 => "ORM_O01",
        OruR01 => "ORU_R01",
        OulR22 => "OUL_R22",
        OulR23 => "OUL_R23",
        OulR24 => "OUL_R24",
        RdeO11 => "RDE_O11",
        RdeO25 => "RDE_O25",
        RdsO13 => "RDS_O13",
        RefI12 => "REF_I12",
        RefI14 => "REF_I14",
        SiuS12 => "SIU_S12",
        SiuS13 => "SIU_S13",
        SiuS14 => "SIU_S14",
        SiuS15 => "SIU_S15",
        SiuS16 => "SIU_S16",
        SiuS17 => "SIU_S17",
        SiuS26 => "SIU_S26",
        VxuV04 => "VXU_V04",
    ],
    ccda: [
        Ccd => "CCD",
        ConsultationNote => "ConsultationNote",
        DischargeSummary => "DischargeSummary",
        Header => "Header",
        HistoryandPhysical => "HistoryandPhysical",
        OperativeNote => "OperativeNote",
        ProcedureNote => "ProcedureNote",
        ProgressNote => "ProgressNote",
        ReferralNote => "ReferralNote",
        TransferSummary => "TransferSummary",
    ],
}

impl RootTemplate {
    pub fn permitted_values() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }

    /// Templates written for `input_type`, in canonical order.
    pub fn for_input_type(input_type: InputType) -> impl Iterator<Item = RootTemplate> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |t| t.family() == input_type)
    }
}

impl fmt::Display for RootTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootTemplate {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "root template",
                value: s.to_string(),
            })
    }
}

impl serde::Serialize for RootTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for RootTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl<'s> utoipa::ToSchema<'s> for RootTemplate {
    fn schema() -> (
        &'s str,
        utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
    ) {
        let object = utoipa::openapi::schema::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::SchemaType::String)
            .description(Some("Root template applied by the converter"))
            .enum_values(Some(Self::permitted_values()))
            .build();

        (
            "RootTemplate",
            utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(object)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_templates_keep_canonical_order() {
        let values = RootTemplate::permitted_values();
        assert_eq!(values.len(), 67);
        assert_eq!(values.first(), Some(&"ADT_A01"));
        assert_eq!(values[56], "VXU_V04");
        assert_eq!(values[57], "CCD");
        assert_eq!(values.last(), Some(&"TransferSummary"));
    }

    #[test]
    fn root_template_names_are_unique() {
        let mut values = RootTemplate::permitted_values();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), RootTemplate::ALL.len());
    }

    #[test]
    fn parses_exact_names_only() {
        assert_eq!("ORU_R01".parse::<RootTemplate>(), Ok(RootTemplate::OruR01));
        assert_eq!(
            "HistoryandPhysical".parse::<RootTemplate>(),
            Ok(RootTemplate::HistoryandPhysical)
        );
        assert!("oru_r01".parse::<RootTemplate>().is_err());
        assert!("HistoryAndPhysical".parse::<RootTemplate>().is_err());
        assert!(" CCD".parse::<RootTemplate>().is_err());
    }

    #[test]
    fn input_type_parses_lowercase_names() {
        assert_eq!("hl7v2".parse::<InputType>(), Ok(InputType::Hl7v2));
        assert_eq!("ccda".parse::<InputType>(), Ok(InputType::Ccda));

        let err = "hl7v3".parse::<InputType>().unwrap_err();
        assert_eq!(err.value, "hl7v3");
        assert_eq!(err.to_string(), "unknown input type: hl7v3");
    }

    #[test]
    fn families_split_at_first_document_template() {
        let hl7: Vec<_> = RootTemplate::for_input_type(InputType::Hl7v2).collect();
        let ccda: Vec<_> = RootTemplate::for_input_type(InputType::Ccda).collect();

        assert_eq!(hl7.len(), 57);
        assert_eq!(ccda.len(), 10);
        assert_eq!(ccda[0], RootTemplate::Ccd);
        assert_eq!(RootTemplate::AdtA01.family(), InputType::Hl7v2);
        assert_eq!(RootTemplate::DischargeSummary.family(), InputType::Ccda);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&(InputType::Hl7v2, RootTemplate::AdtA01)).unwrap();
        assert_eq!(json, r#"["hl7v2","ADT_A01"]"#);

        let template: RootTemplate = serde_json::from_str(r#""ProgressNote""#).unwrap();
        assert_eq!(template, RootTemplate::ProgressNote);
        assert!(serde_json::from_str::<RootTemplate>(r#""Nope""#).is_err());
    }
}
