use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gateway_core::{
    ClinicalMessage, ConversionRequest, ConversionService, GatewayConfig, InputType,
    ProcessConverter, RootTemplate,
};

#[derive(Parser)]
#[command(name = "fhir-gateway")]
#[command(about = "FHIR conversion gateway CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the root templates the gateway accepts
    Templates {
        /// Only list templates written for this input type (hl7v2 or ccda)
        #[arg(long)]
        input_type: Option<InputType>,
    },
    /// Convert a local file with the configured converter
    Convert {
        /// File holding the HL7v2 message or C-CDA document
        file: PathBuf,
        /// Input type (hl7v2 or ccda)
        #[arg(long)]
        input_type: InputType,
        /// Root template, e.g. ADT_A01 or CCD
        #[arg(long)]
        root_template: RootTemplate,
        /// Write the result here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// One line per template: name and the input type it was written for.
fn template_listing(input_type: Option<InputType>) -> Vec<String> {
    let templates: Vec<RootTemplate> = match input_type {
        Some(input_type) => RootTemplate::for_input_type(input_type).collect(),
        None => RootTemplate::ALL.to_vec(),
    };
    templates
        .into_iter()
        .map(|t| format!("{}\t{}", t, t.family()))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Templates { input_type }) => {
            for line in template_listing(input_type) {
                println!("{line}");
            }
        }
        Some(Commands::Convert {
            file,
            input_type,
            root_template,
            output,
        }) => {
            let contents = std::fs::read_to_string(&file)
                .map_err(|e| format!("failed to read {}: {}", file.display(), e))?;
            let input_data = ClinicalMessage::new(contents)
                .map_err(|e| format!("{}: {}", file.display(), e))?;

            let cfg = Arc::new(GatewayConfig::from_env()?);
            let service = ConversionService::new(Arc::new(ProcessConverter::new(cfg)));
            let request = ConversionRequest::new(input_data, input_type, root_template);

            let result = service.convert(&request).await?;
            let rendered = serde_json::to_string_pretty(result.as_value())?;

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    eprintln!("Wrote {} result to {}", root_template, path.display());
                }
                None => println!("{rendered}"),
            }
        }
        None => {
            println!("Use 'fhir-gateway --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_template_in_canonical_order() {
        let lines = template_listing(None);
        assert_eq!(lines.len(), 67);
        assert_eq!(lines[0], "ADT_A01\thl7v2");
        assert_eq!(lines[66], "TransferSummary\tccda");
    }

    #[test]
    fn filters_by_input_type() {
        let lines = template_listing(Some(InputType::Ccda));
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "CCD\tccda");
        assert!(lines.iter().all(|l| l.ends_with("\tccda")));

        let lines = template_listing(Some(InputType::Hl7v2));
        assert_eq!(lines.len(), 57);
        assert_eq!(lines[56], "VXU_V04\thl7v2");
    }

    #[test]
    fn parses_convert_arguments() {
        let cli = Cli::try_parse_from([
            "fhir-gateway",
            "convert",
            "msg.hl7",
            "--input-type",
            "hl7v2",
            "--root-template",
            "ORU_R01",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Convert {
                file,
                input_type,
                root_template,
                output,
            }) => {
                assert_eq!(file, PathBuf::from("msg.hl7"));
                assert_eq!(input_type, InputType::Hl7v2);
                assert_eq!(root_template, RootTemplate::OruR01);
                assert!(output.is_none());
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn rejects_unknown_templates() {
        let parsed = Cli::try_parse_from([
            "fhir-gateway",
            "convert",
            "msg.hl7",
            "--input-type",
            "hl7v2",
            "--root-template",
            "ADT_A99",
        ]);
        assert!(parsed.is_err());
    }
}
