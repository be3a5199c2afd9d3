//! Export formats and the writer seam

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use catalog_model::{CatalogMetadata, Field};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::csv_writer::CsvCatalogWriter;
use crate::json_writer::JsonCatalogWriter;
use crate::markdown_writer::MarkdownCatalogWriter;
use crate::{Error, Result};

const SUPPORTED: &str = "csv, json, markdown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }

    /// Guess the format from an output file's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(Error::UnsupportedFormat {
                found: s.to_string(),
                supported: SUPPORTED.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders a catalog and its metadata to a byte sink
pub trait CatalogWriter {
    fn format(&self) -> ExportFormat;

    fn write_to(
        &self,
        out: &mut dyn Write,
        fields: &[Field],
        metadata: &CatalogMetadata,
    ) -> Result<()>;
}

/// The stock writer for a format
pub fn writer_for(format: ExportFormat) -> Box<dyn CatalogWriter> {
    match format {
        ExportFormat::Csv => Box::new(CsvCatalogWriter::new()),
        ExportFormat::Json => Box::new(JsonCatalogWriter::new()),
        ExportFormat::Markdown => Box::new(MarkdownCatalogWriter::new()),
    }
}

/// Render a catalog to a string
pub fn render(format: ExportFormat, fields: &[Field], metadata: &CatalogMetadata) -> Result<String> {
    let mut buffer = Vec::new();
    writer_for(format).write_to(&mut buffer, fields, metadata)?;
    String::from_utf8(buffer).map_err(|e| Error::Write(e.to_string()))
}

/// Write a catalog to `path`, creating missing parent directories
pub fn export(
    format: ExportFormat,
    fields: &[Field],
    metadata: &CatalogMetadata,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    writer_for(format).write_to(&mut out, fields, metadata)?;
    out.flush()?;

    info!(
        format = %format,
        field_count = fields.len(),
        path = %path.display(),
        "Exported field catalog"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!(
            "markdown".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
    }

    #[test]
    fn test_unsupported_format_lists_choices() {
        let err = "xlsx".parse::<ExportFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported export format 'xlsx'. Supported: csv, json, markdown"
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/catalog.md")),
            Some(ExportFormat::Markdown)
        );
        assert_eq!(ExportFormat::from_path(Path::new("catalog")), None);
        assert_eq!(ExportFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_writer_for_reports_its_format() {
        for format in [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Markdown] {
            assert_eq!(writer_for(format).format(), format);
        }
    }
}
