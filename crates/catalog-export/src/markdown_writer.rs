//! Markdown catalog writer

use std::io::Write;

use catalog_model::{CatalogMetadata, Field};
use tracing::debug;

use crate::Result;
use crate::format::{CatalogWriter, ExportFormat};
use crate::summary::brief_constraints;

/// Definitions longer than this are cut in table cells
const DEFINITION_WIDTH: usize = 100;

/// Writes a metadata list and one table per requirement class
pub struct MarkdownCatalogWriter;

impl MarkdownCatalogWriter {
    pub fn new() -> Self {
        Self
    }

    fn write_table<'f>(
        out: &mut dyn Write,
        title: &str,
        fields: impl Iterator<Item = &'f Field>,
    ) -> Result<()> {
        writeln!(out, "## {title}")?;
        writeln!(out)?;
        writeln!(out, "| Field Name | Path | Multiplicity | Constraints | Definition |")?;
        writeln!(out, "|------------|------|--------------|-------------|------------|")?;
        for field in fields {
            writeln!(
                out,
                "| {} | `{}` | {} | {} | {} |",
                field.name,
                field.path,
                field.multiplicity(),
                brief_constraints(field),
                table_cell(&field.documentation)
            )?;
        }
        Ok(())
    }
}

impl Default for MarkdownCatalogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogWriter for MarkdownCatalogWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Markdown
    }

    fn write_to(
        &self,
        out: &mut dyn Write,
        fields: &[Field],
        metadata: &CatalogMetadata,
    ) -> Result<()> {
        writeln!(out, "# {} Field Catalog", metadata.message_type)?;
        writeln!(out)?;
        writeln!(out, "## Metadata")?;
        writeln!(out)?;
        writeln!(out, "- **Message Type:** {}", metadata.message_type)?;
        writeln!(out, "- **Total Fields:** {}", metadata.total_fields)?;
        writeln!(out, "- **Mandatory Fields:** {}", metadata.mandatory_count)?;
        writeln!(out, "- **Optional Fields:** {}", metadata.optional_count)?;
        writeln!(
            out,
            "- **Extraction Date:** {}",
            metadata.extraction_date_string()
        )?;
        writeln!(out)?;

        Self::write_table(
            out,
            "Mandatory Fields",
            fields.iter().filter(|f| f.is_mandatory()),
        )?;
        writeln!(out)?;
        Self::write_table(
            out,
            "Optional Fields",
            fields.iter().filter(|f| f.is_optional()),
        )?;

        if fields.iter().any(Field::is_conditional) {
            writeln!(out)?;
            Self::write_table(
                out,
                "Conditional Fields",
                fields.iter().filter(|f| f.is_conditional()),
            )?;
        }

        debug!(field_count = fields.len(), "Finished writing Markdown catalog");
        Ok(())
    }
}

/// Escape pipes, fold newlines and cut long text
fn table_cell(text: &str) -> String {
    let flat = text.replace('|', "\\|").replace(['\r', '\n'], " ");
    if flat.chars().count() > DEFINITION_WIDTH {
        let cut: String = flat.chars().take(DEFINITION_WIDTH).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
