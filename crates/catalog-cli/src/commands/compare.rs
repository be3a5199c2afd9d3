//! `compare`: match the fields of two schemas

use std::path::PathBuf;
use std::process::ExitCode;

use catalog_mapping::{FieldMatcher, MatchReport, MatchStrategy};
use serde::Serialize;

use super::{load_schema, try_assistant};
use crate::config::CliConfig;

pub struct CompareArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    pub semantic: bool,
    pub json: bool,
}

pub fn handle_compare(args: &CompareArgs, config: &CliConfig) -> anyhow::Result<ExitCode> {
    tracing::info!("Comparing {} -> {}", args.source.display(), args.target.display());
    let root = config.root_element();
    let sources = load_schema(&args.source)?.flatten_from(root);
    let targets = load_schema(&args.target)?.flatten_from(root);

    let assistant = if args.semantic {
        try_assistant(config, "semantic matching")
    } else {
        None
    };

    let mut matcher = FieldMatcher::new().with_config(config.matcher_config());
    if let Some(assistant) = &assistant {
        matcher = matcher.with_ranker(assistant);
    }
    let report = matcher.match_fields(&sources, &targets);

    if report.semantic_failures > 0 {
        eprintln!(
            "note: semantic matching failed for {} batch(es); path and name matching used instead",
            report.semantic_failures
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::from(&report))?);
    } else {
        print_report(args, &report);
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMatch<'a> {
    source_path: &'a str,
    target_path: &'a str,
    confidence: f64,
    strategy: MatchStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    justification: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    matched: usize,
    source_only_count: usize,
    target_only_count: usize,
    semantic_used: bool,
    matches: Vec<JsonMatch<'a>>,
    source_only: Vec<&'a str>,
    target_only: Vec<&'a str>,
}

impl<'a> From<&'a MatchReport<'a>> for JsonReport<'a> {
    fn from(report: &'a MatchReport<'a>) -> Self {
        let summary = report.summary();
        Self {
            matched: summary.matched,
            source_only_count: summary.source_only,
            target_only_count: summary.target_only,
            semantic_used: report.semantic_used,
            matches: report
                .matches
                .iter()
                .map(|m| JsonMatch {
                    source_path: &m.source.path,
                    target_path: &m.target.path,
                    confidence: m.confidence,
                    strategy: m.strategy,
                    justification: Some(m.justification.as_str()).filter(|j| !j.is_empty()),
                })
                .collect(),
            source_only: report.source_only.iter().map(|f| f.path.as_str()).collect(),
            target_only: report.target_only.iter().map(|f| f.path.as_str()).collect(),
        }
    }
}

fn print_report(args: &CompareArgs, report: &MatchReport<'_>) {
    let summary = report.summary();

    println!("Source: {}", args.source.display());
    println!("Target: {}", args.target.display());
    println!();
    println!("Comparison Results");
    println!("==================");
    println!("Matched: {}", summary.matched);
    for strategy in [
        MatchStrategy::ExactPath,
        MatchStrategy::NormalizedName,
        MatchStrategy::Semantic,
    ] {
        let count = report.count_by_strategy(strategy);
        if count > 0 {
            println!("  {strategy}: {count}");
        }
    }
    println!("Source only: {}", summary.source_only);
    println!("Target only: {}", summary.target_only);

    if !report.matches.is_empty() {
        println!();
        println!("Matches:");
        for m in &report.matches {
            println!(
                "  {} -> {} ({:.0}%, {})",
                m.source.path,
                m.target.path,
                m.confidence * 100.0,
                m.strategy
            );
        }
    }

    if !report.source_only.is_empty() {
        println!();
        println!("Only in source:");
        for field in &report.source_only {
            println!("  - {}", field.path);
        }
    }

    if !report.target_only.is_empty() {
        println!();
        println!("Only in target:");
        for field in &report.target_only {
            println!("  + {}", field.path);
        }
    }
}
