//! `convert`: translate an XML Schema into JSON Schema or Avro

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use catalog_assist::summarize_registry;
use catalog_mapping::{DEFAULT_NAMESPACE, SchemaConverter, TargetVocabulary};

use super::{load_schema, try_assistant};
use crate::config::CliConfig;

pub struct ConvertArgs {
    pub schema: PathBuf,
    pub to: String,
    pub namespace: Option<String>,
    pub output: Option<PathBuf>,
    pub ai: bool,
}

pub fn handle_convert(args: &ConvertArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    let target: TargetVocabulary = args.to.parse()?;
    tracing::info!("Converting {} to {}", args.schema.display(), target);
    let document = load_schema(&args.schema)?;
    let Some(registry) = document.as_tree() else {
        bail!(
            "{} is not an XML Schema; conversion reads .xsd sources only",
            args.schema.display()
        );
    };

    let namespace = args
        .namespace
        .as_deref()
        .or(config.avro_namespace.as_deref())
        .unwrap_or(DEFAULT_NAMESPACE);
    let converted = SchemaConverter::new(registry)
        .with_namespace(namespace)
        .convert(target);
    if converted.is_empty() {
        eprintln!("note: no complex types found; wrote a placeholder schema");
    }

    let mut schema = converted.into_value();
    if args.ai {
        if let Some(assistant) = try_assistant(config, "AI review") {
            let summary = summarize_registry(registry);
            match assistant.suggest(&summary, target) {
                Ok(lines) => {
                    eprintln!("Suggestions:");
                    for line in lines {
                        eprintln!("  {line}");
                    }
                }
                Err(err) => eprintln!("note: suggestions skipped: {err}"),
            }
            schema = assistant.enhance(&summary, target, &schema);
        }
    }

    let rendered = serde_json::to_string_pretty(&schema)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Converted {} to {} schema: {}", args.schema.display(), target, path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(ExitCode::SUCCESS)
}
