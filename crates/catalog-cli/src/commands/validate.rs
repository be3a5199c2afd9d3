//! `validate`: check a message against a schema's field catalog

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use catalog_validation::MessageValidator;

use super::load_schema;
use crate::config::CliConfig;

pub struct ValidateArgs {
    pub message: PathBuf,
    pub schema: PathBuf,
}

pub fn handle_validate(args: &ValidateArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    tracing::info!("Validating {} against {}", args.message.display(), args.schema.display());
    let fields = load_schema(&args.schema)?.flatten_from(config.root_element());

    println!("Schema: {}", args.schema.display());
    println!("Message: {}", args.message.display());
    println!();

    let result = MessageValidator::new(&fields)
        .validate_file(&args.message)
        .with_context(|| format!("Failed to validate {}", args.message.display()))?;

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    if result.is_valid {
        println!("Message is VALID");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Message is INVALID");
    println!();
    println!("Errors ({}):", result.errors.len());
    for (i, error) in result.errors.iter().enumerate() {
        println!("  {}. {}", i + 1, error);
    }
    Ok(ExitCode::FAILURE)
}
