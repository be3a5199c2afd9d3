//! # schemacat
//!
//! Command-line front end for the field catalog: analyze a schema, compare
//! two schemas, convert a tree schema, and validate a message against one.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{AnalyzeArgs, CompareArgs, ConvertArgs, ValidateArgs};
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "schemacat")]
#[command(about = "Extract, compare, convert and validate against schema field catalogs")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a schema into a field catalog and export it
    Analyze {
        /// Schema file (.xsd, .avsc)
        schema: PathBuf,

        /// Output format: csv, json or markdown
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (default: output/fields.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show statistics and sample fields
        #[arg(short, long)]
        detailed: bool,
    },

    /// Match the fields of two schemas
    Compare {
        /// Source schema file
        source: PathBuf,

        /// Target schema file
        target: PathBuf,

        /// Ask the language-model assistant for semantic matches
        #[arg(long)]
        semantic: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert an XML Schema to JSON Schema or Avro
    Convert {
        /// XML Schema file
        schema: PathBuf,

        /// Target vocabulary: json or avro
        #[arg(short, long)]
        to: String,

        /// Avro namespace (default: com.example)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ask the language-model assistant to review the result
        #[arg(long)]
        ai: bool,
    },

    /// Validate a message against a schema's field catalog
    Validate {
        /// Message file (.xml)
        message: PathBuf,

        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            schema,
            format,
            output,
            detailed,
        } => commands::handle_analyze(
            &AnalyzeArgs {
                schema,
                format,
                output,
                detailed,
            },
            &config,
        ),
        Commands::Compare {
            source,
            target,
            semantic,
            json,
        } => commands::handle_compare(
            &CompareArgs {
                source,
                target,
                semantic,
                json,
            },
            &config,
        ),
        Commands::Convert {
            schema,
            to,
            namespace,
            output,
            ai,
        } => commands::handle_convert(
            &ConvertArgs {
                schema,
                to,
                namespace,
                output,
                ai,
            },
            &config,
        ),
        Commands::Validate { message, schema } => {
            commands::handle_validate(&ValidateArgs { message, schema }, &config)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
