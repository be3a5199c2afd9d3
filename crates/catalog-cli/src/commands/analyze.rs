//! `analyze`: flatten a schema and export its field catalog

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use catalog_export::{ExportFormat, export};
use catalog_schema::Catalog;

use super::load_schema;
use crate::config::CliConfig;

const SAMPLE_FIELDS: usize = 10;

pub struct AnalyzeArgs {
    pub schema: PathBuf,
    pub format: String,
    pub output: Option<PathBuf>,
    pub detailed: bool,
}

pub fn handle_analyze(args: &AnalyzeArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    let format: ExportFormat = args.format.parse()?;
    tracing::info!("Analyzing {} ({})", args.schema.display(), format);
    let document = load_schema(&args.schema)?;
    let catalog = Catalog::from_document_with_root(&document, config.root_element());

    println!("Schema: {}", args.schema.display());
    print_summary(&catalog);
    if args.detailed {
        print_details(&catalog);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("output").join(format!("fields.{}", format.extension())));
    export(format, &catalog.fields, &catalog.metadata(), &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!();
    println!("Results exported to: {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn print_summary(catalog: &Catalog) {
    let stats = catalog.stats();
    println!("Message type: {}", catalog.message_type);
    println!("Format: {}", catalog.format.as_str());
    println!("Total fields: {}", stats.total_fields);
    println!("Mandatory fields: {}", stats.mandatory_count);
    println!("Optional fields: {}", stats.optional_count);
    if stats.conditional_count > 0 {
        println!("Conditional fields: {}", stats.conditional_count);
    }
}

fn print_details(catalog: &Catalog) {
    let stats = catalog.stats();

    println!();
    println!("Constraints");
    println!("===========");
    println!("With code lists: {}", stats.fields_with_code_lists);
    println!("With patterns: {}", stats.fields_with_patterns);
    println!("With length limits: {}", stats.fields_with_length);
    println!("With digit limits: {}", stats.fields_with_digits);

    println!();
    println!("Multiplicity");
    println!("============");
    for (multiplicity, count) in &stats.multiplicity {
        println!("  {multiplicity:<16} {count}");
    }

    println!();
    println!("Depth (max {})", stats.max_depth);
    println!("=====");
    for (depth, count) in &stats.depth_distribution {
        println!("  {depth:<4} {count}");
    }

    println!();
    println!(
        "Unique names: {}, unique paths: {}",
        stats.unique_names, stats.unique_paths
    );

    println!();
    println!("Sample mandatory fields");
    println!("=======================");
    for field in catalog.mandatory().take(SAMPLE_FIELDS) {
        println!("  {} ({}) {}", field.name, field.path, field.multiplicity());
    }
    let remaining = stats.mandatory_count.saturating_sub(SAMPLE_FIELDS);
    if remaining > 0 {
        println!("  ... and {remaining} more");
    }
}
